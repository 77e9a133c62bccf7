//! In-memory catalogue of raw and derived exchange rate series.
//!
//! Raw series are immutable `Arc` snapshots behind a `parking_lot::RwLock`.
//! Writers build the replacement snapshot while holding an upgradable read
//! (readers keep going) and take the write lock only for the swap.
//!
//! Derived series live in a `DashMap`. Each entry remembers the revisions of
//! the raw series it was composed from and the topology revision of the
//! catalogue at the time, and is checked against both on every read. A stale
//! entry is never served, whether or not eviction has caught up with it.
//!
//! Lock order is raw store first, derived cache second.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use fxrate_config::EngineConfig;
use fxrate_core::{CurrencyCode, CurrencyPair, ExchangeRate, FxResult};

use crate::composer::{ConversionPath, CrossRateComposer};
use crate::feed::{RateFeed, RateObservation};
use crate::provider::ExchangeRateProvider;
use crate::series::RateSeries;

// =============================================================================
// REVISION TRACKING
// =============================================================================

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

/// Revision number for cache invalidation tracking.
///
/// Revisions are drawn from one process-wide counter, so a value is never
/// handed out twice.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Revision(u64);

impl Revision {
    /// Wraps a raw revision number.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw revision number.
    pub fn value(&self) -> u64 {
        self.0
    }

    fn fresh() -> Self {
        Self(NEXT_REVISION.fetch_add(1, Ordering::SeqCst))
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rev:{}", self.0)
    }
}

// =============================================================================
// ENTRIES
// =============================================================================

#[derive(Debug, Clone)]
struct RawEntry {
    series: Arc<RateSeries>,
    revision: Revision,
}

#[derive(Debug, Default)]
struct RawStore {
    entries: HashMap<CurrencyPair, RawEntry>,
    topology: Revision,
}

impl RawStore {
    fn snapshot(&self, pair: &CurrencyPair) -> Option<Arc<RateSeries>> {
        self.entries.get(pair).map(|entry| Arc::clone(&entry.series))
    }

    fn revision(&self, pair: &CurrencyPair) -> Option<Revision> {
        self.entries.get(pair).map(|entry| entry.revision)
    }
}

#[derive(Debug, Clone)]
struct DerivedEntry {
    series: Arc<RateSeries>,
    inputs: Vec<(CurrencyPair, Revision)>,
    topology: Revision,
}

impl DerivedEntry {
    fn is_current(&self, store: &RawStore) -> bool {
        self.topology == store.topology
            && self
                .inputs
                .iter()
                .all(|(pair, revision)| store.revision(pair) == Some(*revision))
    }

    fn depends_on(&self, pair: &CurrencyPair) -> bool {
        self.inputs.iter().any(|(input, _)| input == pair)
    }
}

// =============================================================================
// REPOSITORY
// =============================================================================

/// Catalogue of exchange rate series keyed by ordered currency pair.
///
/// `get_series` never comes back empty-handed: a registered raw series wins,
/// then a still-valid cached composition, then a fresh composition, and
/// finally an empty series when nothing can be derived.
#[derive(Debug)]
pub struct SeriesRepository {
    config: EngineConfig,
    composer: CrossRateComposer,
    raw: RwLock<RawStore>,
    derived: DashMap<CurrencyPair, DerivedEntry>,
}

impl Default for SeriesRepository {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl SeriesRepository {
    /// Creates an empty repository.
    ///
    /// The configuration is taken as given; validate it first with
    /// `fxrate_config::Validate` when it comes from outside.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            composer: CrossRateComposer::from_config(&config),
            config,
            raw: RwLock::new(RawStore::default()),
            derived: DashMap::new(),
        }
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the series converting `source` into `term`.
    pub fn get_series(&self, source: &CurrencyCode, term: &CurrencyCode) -> Arc<RateSeries> {
        let pair = CurrencyPair::new(source.clone(), term.clone());
        let store = self.raw.read();

        if let Some(series) = store.snapshot(&pair) {
            return series;
        }

        if self.config.cache_derived {
            if let Some(series) = self.cached(&pair, &store) {
                debug!(%pair, "derived cache hit");
                return series;
            }
        }

        let entry = self.compose(&pair, &store);
        let series = Arc::clone(&entry.series);
        if self.config.cache_derived {
            debug!(%pair, inputs = entry.inputs.len(), "derived cache store");
            self.derived.insert(pair, entry);
        }
        series
    }

    /// Returns the path the composer would use for `source -> term`.
    pub fn conversion_path(
        &self,
        source: &CurrencyCode,
        term: &CurrencyCode,
    ) -> Option<ConversionPath> {
        let store = self.raw.read();
        self.composer.find_path(store.entries.keys(), source, term)
    }

    /// Installs or replaces the raw series for its pair.
    ///
    /// Returns the revision assigned to the new snapshot.
    pub fn register_series(&self, series: RateSeries) -> Revision {
        let pair = series.pair().clone();
        let snapshot = Arc::new(series.into_raw());

        let mut store = self.raw.write();
        self.install(&mut store, pair, snapshot)
    }

    /// Adds one observation to the raw series for `source -> term`, creating
    /// the series if needed.
    ///
    /// # Errors
    ///
    /// Returns `FxError::InvalidRate` if the factor is not positive; the
    /// repository is left unchanged.
    pub fn add_observation(
        &self,
        source: impl Into<CurrencyCode>,
        term: impl Into<CurrencyCode>,
        rate: ExchangeRate,
    ) -> FxResult<Revision> {
        let pair = CurrencyPair::new(source, term);

        let store = self.raw.upgradable_read();
        let mut series = match store.snapshot(&pair) {
            Some(current) => (*current).clone(),
            None => RateSeries::new(pair.clone()),
        };
        series.add_observation(rate)?;

        let mut store = RwLockUpgradableReadGuard::upgrade(store);
        Ok(self.install(&mut store, pair, Arc::new(series)))
    }

    /// Ingests a batch of feed observations.
    ///
    /// Every observation is validated before anything is installed, so a bad
    /// batch changes nothing. Each touched pair is copied once.
    ///
    /// # Errors
    ///
    /// Returns `FxError::InvalidRate` for the first non-positive factor.
    pub fn apply_observations<I>(&self, observations: I) -> FxResult<usize>
    where
        I: IntoIterator<Item = RateObservation>,
    {
        let mut by_pair: BTreeMap<CurrencyPair, Vec<ExchangeRate>> = BTreeMap::new();
        let mut count = 0;
        for observation in observations {
            let rate = observation.rate();
            rate.validate()?;
            by_pair.entry(observation.pair).or_default().push(rate);
            count += 1;
        }
        if by_pair.is_empty() {
            return Ok(0);
        }

        let store = self.raw.upgradable_read();
        let mut updates = Vec::with_capacity(by_pair.len());
        for (pair, rates) in by_pair {
            let mut series = match store.snapshot(&pair) {
                Some(current) => (*current).clone(),
                None => RateSeries::new(pair.clone()),
            };
            for rate in rates {
                series.add_observation(rate)?;
            }
            updates.push((pair, Arc::new(series)));
        }

        let mut store = RwLockUpgradableReadGuard::upgrade(store);
        for (pair, series) in updates {
            self.install(&mut store, pair, series);
        }
        Ok(count)
    }

    /// Pulls every observation from `feed` into the repository.
    ///
    /// # Errors
    ///
    /// Propagates feed errors and invalid observations.
    pub fn load(&self, feed: &dyn RateFeed) -> FxResult<usize> {
        let observations = feed.observations()?;
        let count = self.apply_observations(observations)?;
        info!(feed = feed.name(), observations = count, "loaded rate feed");
        Ok(count)
    }

    /// Returns true if a raw series is registered for `pair`.
    pub fn contains_raw(&self, pair: &CurrencyPair) -> bool {
        self.raw.read().entries.contains_key(pair)
    }

    /// Returns the raw series for `pair`, if registered.
    pub fn raw_series(&self, pair: &CurrencyPair) -> Option<Arc<RateSeries>> {
        self.raw.read().snapshot(pair)
    }

    /// Returns the current revision of the raw series for `pair`.
    pub fn revision(&self, pair: &CurrencyPair) -> Option<Revision> {
        self.raw.read().revision(pair)
    }

    /// Returns the revision of the set of registered pairs.
    pub fn topology_revision(&self) -> Revision {
        self.raw.read().topology
    }

    /// Returns every registered raw pair, sorted.
    pub fn raw_pairs(&self) -> Vec<CurrencyPair> {
        let mut pairs: Vec<CurrencyPair> = self.raw.read().entries.keys().cloned().collect();
        pairs.sort();
        pairs
    }

    /// Returns every currency appearing in a raw pair.
    pub fn currencies(&self) -> BTreeSet<CurrencyCode> {
        self.raw
            .read()
            .entries
            .keys()
            .flat_map(|pair| [pair.source.clone(), pair.term.clone()])
            .collect()
    }

    /// Returns the number of raw series.
    pub fn len(&self) -> usize {
        self.raw.read().entries.len()
    }

    /// Returns true if no raw series is registered.
    pub fn is_empty(&self) -> bool {
        self.raw.read().entries.is_empty()
    }

    /// Returns the number of cached derived entries, misses included.
    pub fn derived_count(&self) -> usize {
        self.derived.len()
    }

    /// Drops every cached derived entry.
    pub fn clear_derived(&self) {
        self.derived.clear();
    }

    fn cached(&self, pair: &CurrencyPair, store: &RawStore) -> Option<Arc<RateSeries>> {
        let entry = self.derived.get(pair)?;
        entry
            .is_current(store)
            .then(|| Arc::clone(&entry.series))
    }

    fn compose(&self, pair: &CurrencyPair, store: &RawStore) -> DerivedEntry {
        let Some(path) = self
            .composer
            .find_path(store.entries.keys(), &pair.source, &pair.term)
        else {
            return DerivedEntry {
                series: Arc::new(RateSeries::empty(pair.clone())),
                inputs: Vec::new(),
                topology: store.topology,
            };
        };

        let inputs = path
            .dependencies()
            .filter_map(|dep| store.revision(dep).map(|revision| (dep.clone(), revision)))
            .collect();

        let series = match self.composer.compose(&path, |dep| store.snapshot(dep)) {
            Ok(series) => series,
            Err(err) => {
                warn!(%pair, path = %path, error = %err, "composition failed");
                RateSeries::empty(pair.clone())
            }
        };

        DerivedEntry {
            series: Arc::new(series),
            inputs,
            topology: store.topology,
        }
    }

    fn install(
        &self,
        store: &mut RawStore,
        pair: CurrencyPair,
        series: Arc<RateSeries>,
    ) -> Revision {
        let revision = Revision::fresh();
        let replaced = store
            .entries
            .insert(pair.clone(), RawEntry { series, revision })
            .is_some();

        if replaced {
            let before = self.derived.len();
            self.derived.retain(|_, entry| !entry.depends_on(&pair));
            debug!(
                %pair,
                %revision,
                evicted = before.saturating_sub(self.derived.len()),
                "raw series replaced"
            );
        } else {
            store.topology = Revision::fresh();
            self.derived.clear();
            debug!(%pair, %revision, topology = %store.topology, "raw pair added");
        }
        revision
    }
}

impl ExchangeRateProvider for SeriesRepository {
    fn time_series(&self, source: &CurrencyCode, term: &CurrencyCode) -> Option<Arc<RateSeries>> {
        Some(self.get_series(source, term))
    }
}
