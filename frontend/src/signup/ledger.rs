use chrono::{DateTime, Utc};
use log::info;
use rand::Rng;

use super::events::CounterUpdate;
use super::growth::draw_growth;
use super::models::LedgerSnapshot;
use super::store::{JsonStore, KeyValueStore};
use crate::config::SignupConfig;

/// Registered count and remaining slots, written back after every change.
#[derive(Clone, Debug)]
pub struct CounterLedger {
    key: &'static str,
    snapshot: LedgerSnapshot,
}

impl CounterLedger {
    /// Loads the stored ledger, or seeds a plausible-looking one on first visit
    /// and stores it right away.
    pub fn load_or_seed<S, R>(
        store: &mut JsonStore<S>,
        config: &SignupConfig,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Self
    where
        S: KeyValueStore,
        R: Rng + ?Sized,
    {
        if let Some(snapshot) = store.get::<LedgerSnapshot>(config.ledger_key) {
            return Self::from_snapshot(config.ledger_key, snapshot);
        }

        let snapshot = LedgerSnapshot {
            registered_count: rng.gen_range(config.initial_seed_range.clone()),
            remaining_slots: config.initial_remaining_slots,
            last_update: now,
        };
        info!(
            "Seeding counters: {} registered, {} slots left",
            snapshot.registered_count, snapshot.remaining_slots
        );
        let ledger = Self::from_snapshot(config.ledger_key, snapshot);
        ledger.persist(store);
        ledger
    }

    pub fn from_snapshot(key: &'static str, snapshot: LedgerSnapshot) -> Self {
        Self { key, snapshot }
    }

    pub fn snapshot(&self) -> &LedgerSnapshot {
        &self.snapshot
    }

    pub fn counters(&self) -> CounterUpdate {
        CounterUpdate::from(&self.snapshot)
    }

    pub fn record_registration<S: KeyValueStore>(
        &mut self,
        store: &mut JsonStore<S>,
        now: DateTime<Utc>,
    ) -> CounterUpdate {
        self.advance(1, now);
        self.persist(store);
        self.counters()
    }

    /// Returns how many members were "added", if the tick fired.
    pub fn apply_simulated_growth<S, R>(
        &mut self,
        store: &mut JsonStore<S>,
        config: &SignupConfig,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Option<u64>
    where
        S: KeyValueStore,
        R: Rng + ?Sized,
    {
        let n = draw_growth(config, rng)?;
        self.advance(n, now);
        self.persist(store);
        info!("Simulated growth: +{} ({} total)", n, self.snapshot.registered_count);
        Some(n)
    }

    fn advance(&mut self, n: u64, now: DateTime<Utc>) {
        self.snapshot.registered_count = self.snapshot.registered_count.saturating_add(n);
        self.snapshot.remaining_slots = self.snapshot.remaining_slots.saturating_sub(n);
        self.snapshot.last_update = now;
    }

    fn persist<S: KeyValueStore>(&self, store: &mut JsonStore<S>) -> bool {
        store.set(self.key, &self.snapshot)
    }
}
