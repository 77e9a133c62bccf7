//! Cross-rate composition through intermediate currencies.
//!
//! Currencies are nodes and every raw series `A -> B` is an edge. When inverse
//! edges are allowed, `B -> A` is walkable too, resolved as the reciprocal of
//! the raw series. A direct series always wins over an inverted one for the
//! same hop.
//!
//! Path search is breadth-first and bounded by `max_hops`. Neighbours are
//! expanded in code order, so among equally short paths the one with the
//! lexicographically smallest sequence of currencies is found first.
//!
//! ```text
//! EUR ──> USD ──> JPY        rate(EUR->JPY, d) = rate(EUR->USD, d) × rate(USD->JPY, d)
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use petgraph::graphmap::DiGraphMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use fxrate_config::EngineConfig;
use fxrate_core::{CurrencyCode, CurrencyPair, Date, ExchangeRate, FxError, FxResult};

use crate::series::RateSeries;

// =============================================================================
// PATH
// =============================================================================

/// How a leg uses its underlying raw series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LegDirection {
    /// The raw series is used as quoted.
    Forward,
    /// The raw series is walked backwards (reciprocal factors).
    Inverted,
}

/// One hop of a conversion path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Leg {
    /// Key of the raw series backing this hop.
    series: CurrencyPair,
    /// Direction the raw series is walked in.
    direction: LegDirection,
}

impl Leg {
    /// Creates a leg that uses `series` as quoted.
    #[must_use]
    pub fn forward(series: CurrencyPair) -> Self {
        Self {
            series,
            direction: LegDirection::Forward,
        }
    }

    /// Creates a leg that walks `series` backwards.
    #[must_use]
    pub fn inverted(series: CurrencyPair) -> Self {
        Self {
            series,
            direction: LegDirection::Inverted,
        }
    }

    /// Returns the key of the raw series backing this hop.
    #[must_use]
    pub fn series_pair(&self) -> &CurrencyPair {
        &self.series
    }

    /// Returns the direction.
    #[must_use]
    pub fn direction(&self) -> LegDirection {
        self.direction
    }

    /// Currency this hop converts from.
    #[must_use]
    pub fn from_currency(&self) -> &CurrencyCode {
        match self.direction {
            LegDirection::Forward => &self.series.source,
            LegDirection::Inverted => &self.series.term,
        }
    }

    /// Currency this hop converts to.
    #[must_use]
    pub fn to_currency(&self) -> &CurrencyCode {
        match self.direction {
            LegDirection::Forward => &self.series.term,
            LegDirection::Inverted => &self.series.source,
        }
    }

    /// Resolves this hop on `date` against its raw series.
    pub fn resolve(&self, series: &RateSeries, date: Date) -> FxResult<Option<ExchangeRate>> {
        match (series.lookup_rate(date), self.direction) {
            (None, _) => Ok(None),
            (Some(rate), LegDirection::Forward) => Ok(Some(rate)),
            (Some(rate), LegDirection::Inverted) => rate.inverse().map(Some),
        }
    }
}

/// A chain of hops from a source to a term currency.
///
/// Never empty, and each leg starts where the previous one ends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ConversionPath {
    legs: Vec<Leg>,
}

impl ConversionPath {
    /// Creates a path from consecutive legs.
    ///
    /// # Errors
    ///
    /// Returns `FxError::PairMismatch` if the path is empty or a leg does not
    /// start where the previous one ended.
    pub fn new(legs: Vec<Leg>) -> FxResult<Self> {
        if legs.is_empty() {
            return Err(FxError::PairMismatch {
                expected: "at least one leg".to_string(),
                actual: "empty path".to_string(),
            });
        }
        for window in legs.windows(2) {
            if window[0].to_currency() != window[1].from_currency() {
                return Err(FxError::PairMismatch {
                    expected: window[0].to_currency().to_string(),
                    actual: window[1].from_currency().to_string(),
                });
            }
        }
        Ok(Self { legs })
    }

    /// Returns the legs in order.
    #[must_use]
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// Returns the number of hops.
    #[must_use]
    pub fn hops(&self) -> usize {
        self.legs.len()
    }

    /// Returns the starting currency.
    #[must_use]
    pub fn source(&self) -> &CurrencyCode {
        self.legs[0].from_currency()
    }

    /// Returns the final currency.
    #[must_use]
    pub fn term(&self) -> &CurrencyCode {
        self.legs[self.legs.len() - 1].to_currency()
    }

    /// Returns the composed pair.
    #[must_use]
    pub fn pair(&self) -> CurrencyPair {
        CurrencyPair::new(self.source().clone(), self.term().clone())
    }

    /// Returns the raw series keys this path reads.
    pub fn dependencies(&self) -> impl Iterator<Item = &CurrencyPair> {
        self.legs.iter().map(Leg::series_pair)
    }

    /// Returns true if the path reads the raw series `pair`.
    #[must_use]
    pub fn depends_on(&self, pair: &CurrencyPair) -> bool {
        self.dependencies().any(|dep| dep == pair)
    }
}

impl fmt::Display for ConversionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source())?;
        for leg in &self.legs {
            match leg.direction {
                LegDirection::Forward => write!(f, " -> {}", leg.to_currency())?,
                LegDirection::Inverted => write!(f, " ~> {}", leg.to_currency())?,
            }
        }
        Ok(())
    }
}

// =============================================================================
// COMPOSER
// =============================================================================

/// Finds conversion paths and synthesizes derived series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossRateComposer {
    max_hops: usize,
    allow_inverse: bool,
}

impl Default for CrossRateComposer {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl CrossRateComposer {
    /// Creates a composer.
    #[must_use]
    pub fn new(max_hops: usize, allow_inverse: bool) -> Self {
        Self {
            max_hops,
            allow_inverse,
        }
    }

    /// Creates a composer from engine configuration.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.max_hops as usize, config.allow_inverse)
    }

    /// Returns the maximum number of hops searched.
    #[must_use]
    pub fn max_hops(&self) -> usize {
        self.max_hops
    }

    /// Finds the shortest path from `source` to `term` over the raw pairs.
    ///
    /// Returns `None` when no path of at most `max_hops` legs exists, or when
    /// `source == term`.
    pub fn find_path<'a, I>(
        &self,
        raw_pairs: I,
        source: &CurrencyCode,
        term: &CurrencyCode,
    ) -> Option<ConversionPath>
    where
        I: IntoIterator<Item = &'a CurrencyPair>,
    {
        if source == term {
            return None;
        }

        let graph = self.build_graph(raw_pairs);
        let (start, goal) = (source.as_str(), term.as_str());
        if !graph.contains_node(start) || !graph.contains_node(goal) {
            return None;
        }

        let mut predecessors: HashMap<&str, &str> = HashMap::new();
        let mut visited: HashSet<&str> = HashSet::from([start]);
        let mut frontier = vec![start];

        for _ in 0..self.max_hops {
            let mut next = Vec::new();
            for node in frontier {
                let mut neighbors: Vec<&str> = graph.neighbors(node).collect();
                neighbors.sort_unstable();

                for neighbor in neighbors {
                    if !visited.insert(neighbor) {
                        continue;
                    }
                    predecessors.insert(neighbor, node);
                    if neighbor == goal {
                        let path = Self::trace_path(&graph, &predecessors, start, goal);
                        if let Some(ref found) = path {
                            debug!(path = %found, "conversion path found");
                        }
                        return path;
                    }
                    next.push(neighbor);
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        debug!(%source, %term, max_hops = self.max_hops, "no conversion path");
        None
    }

    /// Materializes the derived series for `path`.
    ///
    /// The result holds one observation per date on which any leg has an
    /// observation and every leg resolves. Carried-forward lookup on it gives
    /// the same answer as composing the legs on the query date directly.
    ///
    /// # Errors
    ///
    /// Returns `FxError::SeriesNotFound` if `series_for` has no series for a
    /// leg, and `FxError::MathError` on decimal overflow.
    pub fn compose<F>(&self, path: &ConversionPath, series_for: F) -> FxResult<RateSeries>
    where
        F: Fn(&CurrencyPair) -> Option<Arc<RateSeries>>,
    {
        let legs = Self::bind_legs(path, &series_for)?;

        let dates: BTreeSet<Date> = legs
            .iter()
            .flat_map(|(_, series)| series.dates())
            .collect();

        let mut observations = Vec::with_capacity(dates.len());
        for date in dates {
            if let Some(value) = Self::product_on(&legs, date)? {
                observations.push(ExchangeRate::new(date, value));
            }
        }

        debug!(
            path = %path,
            observations = observations.len(),
            "composed derived series"
        );
        Ok(RateSeries::derived(path.pair(), observations))
    }

    /// Composes the rate for `path` on a single date without materializing.
    ///
    /// # Errors
    ///
    /// Same as [`CrossRateComposer::compose`].
    pub fn rate_on<F>(
        &self,
        path: &ConversionPath,
        series_for: F,
        date: Date,
    ) -> FxResult<Option<ExchangeRate>>
    where
        F: Fn(&CurrencyPair) -> Option<Arc<RateSeries>>,
    {
        let legs = Self::bind_legs(path, &series_for)?;
        Ok(Self::product_on(&legs, date)?.map(|value| ExchangeRate::new(date, value)))
    }

    fn build_graph<'a, I>(&self, raw_pairs: I) -> DiGraphMap<&'a str, LegDirection>
    where
        I: IntoIterator<Item = &'a CurrencyPair>,
    {
        let pairs: Vec<&CurrencyPair> = raw_pairs
            .into_iter()
            .filter(|pair| !pair.is_identity())
            .collect();

        let mut graph = DiGraphMap::new();
        for pair in &pairs {
            graph.add_edge(pair.source.as_str(), pair.term.as_str(), LegDirection::Forward);
        }
        if self.allow_inverse {
            for pair in &pairs {
                let (from, to) = (pair.term.as_str(), pair.source.as_str());
                if !graph.contains_edge(from, to) {
                    graph.add_edge(from, to, LegDirection::Inverted);
                }
            }
        }
        graph
    }

    fn trace_path<'a>(
        graph: &DiGraphMap<&'a str, LegDirection>,
        predecessors: &HashMap<&'a str, &'a str>,
        start: &'a str,
        goal: &'a str,
    ) -> Option<ConversionPath> {
        let mut nodes = vec![goal];
        let mut current = goal;
        while current != start {
            current = *predecessors.get(current)?;
            nodes.push(current);
        }
        nodes.reverse();

        let legs = nodes
            .windows(2)
            .map(|hop| {
                let (from, to) = (hop[0], hop[1]);
                graph.edge_weight(from, to).map(|direction| match direction {
                    LegDirection::Forward => Leg::forward(CurrencyPair::new(from, to)),
                    LegDirection::Inverted => Leg::inverted(CurrencyPair::new(to, from)),
                })
            })
            .collect::<Option<Vec<_>>>()?;

        ConversionPath::new(legs).ok()
    }

    fn bind_legs<'p, F>(
        path: &'p ConversionPath,
        series_for: &F,
    ) -> FxResult<Vec<(&'p Leg, Arc<RateSeries>)>>
    where
        F: Fn(&CurrencyPair) -> Option<Arc<RateSeries>>,
    {
        path.legs()
            .iter()
            .map(|leg| {
                let pair = leg.series_pair();
                series_for(pair)
                    .map(|series| (leg, series))
                    .ok_or_else(|| {
                        FxError::series_not_found(pair.source.as_str(), pair.term.as_str())
                    })
            })
            .collect()
    }

    fn product_on(legs: &[(&Leg, Arc<RateSeries>)], date: Date) -> FxResult<Option<Decimal>> {
        let mut value = Decimal::ONE;
        for (leg, series) in legs {
            let Some(rate) = leg.resolve(series, date)? else {
                return Ok(None);
            };
            value = value.checked_mul(rate.value()).ok_or_else(|| {
                FxError::math_error(format!("cross rate overflow on {date}"))
            })?;
        }
        Ok(Some(value))
    }
}
