use chrono::{DateTime, Duration, Utc};
use log::info;
use serde::Serialize;

use super::error::SignupError;
use super::models::{LedgerSnapshot, MemberRecord};
use super::store::{JsonStore, KeyValueStore};

pub const DEFAULT_RETENTION_DAYS: i64 = 30;

/// Everyone who actually completed the wizard, in registration order.
/// Identifiers are unique and compared exactly as typed.
#[derive(Clone, Debug)]
pub struct MembershipRegistry {
    key: &'static str,
    members: Vec<MemberRecord>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistryStats {
    pub total: usize,
    pub active: usize,
    pub registered_today: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryExport<'a> {
    pub users: &'a [MemberRecord],
    pub stats: &'a LedgerSnapshot,
    pub export_date: DateTime<Utc>,
}

impl MembershipRegistry {
    pub fn load<S: KeyValueStore>(store: &JsonStore<S>, key: &'static str) -> Self {
        Self {
            key,
            members: store.get_or(key, Vec::new()),
        }
    }

    pub fn exists(&self, identifier: &str) -> bool {
        self.members.iter().any(|m| m.identifier == identifier)
    }

    pub fn count(&self) -> usize {
        self.members.len()
    }

    #[cfg(test)]
    pub fn members(&self) -> &[MemberRecord] {
        &self.members
    }

    pub fn insert<S: KeyValueStore>(
        &mut self,
        record: MemberRecord,
        store: &mut JsonStore<S>,
    ) -> Result<MemberRecord, SignupError> {
        if self.exists(&record.identifier) {
            return Err(SignupError::DuplicateIdentifier);
        }
        self.members.push(record.clone());
        store.set(self.key, &self.members);
        Ok(record)
    }

    /// Records a login for `identifier`. Unknown identifiers get `None`.
    pub fn touch_login<S: KeyValueStore>(
        &mut self,
        identifier: &str,
        store: &mut JsonStore<S>,
        now: DateTime<Utc>,
    ) -> Option<MemberRecord> {
        let member = self.members.iter_mut().find(|m| m.identifier == identifier)?;
        member.last_login = Some(now);
        let member = member.clone();
        store.set(self.key, &self.members);
        Some(member)
    }

    /// Drops inactive members whose last login is older than `retention`.
    /// Returns how many were removed.
    pub fn cleanup<S: KeyValueStore>(
        &mut self,
        retention: Duration,
        store: &mut JsonStore<S>,
        now: DateTime<Utc>,
    ) -> usize {
        let cutoff = now - retention;
        let before = self.members.len();
        self.members
            .retain(|m| m.is_active || m.last_login.unwrap_or(m.created_at) > cutoff);
        let removed = before - self.members.len();
        if removed > 0 {
            info!("Removed {} inactive members", removed);
            if self.members.is_empty() {
                store.remove(self.key);
            } else {
                store.set(self.key, &self.members);
            }
        }
        removed
    }

    /// "Today" is the UTC calendar day of `now`.
    pub fn stats(&self, now: DateTime<Utc>) -> RegistryStats {
        let today = now.date_naive();
        RegistryStats {
            total: self.members.len(),
            active: self.members.iter().filter(|m| m.is_active).count(),
            registered_today: self
                .members
                .iter()
                .filter(|m| m.created_at.date_naive() == today)
                .count(),
        }
    }

    pub fn export<'a>(&'a self, ledger: &'a LedgerSnapshot, now: DateTime<Utc>) -> RegistryExport<'a> {
        RegistryExport {
            users: &self.members,
            stats: ledger,
            export_date: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signup::models::MemberStatus;
    use crate::signup::store::MemoryStore;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const KEY: &str = "members";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 18, 30, 0).unwrap()
    }

    fn record(email: &str, created_at: DateTime<Utc>) -> MemberRecord {
        let mut rng = StdRng::seed_from_u64(created_at.timestamp() as u64);
        MemberRecord::new(email.to_string(), None, MemberStatus::Active, &mut rng, created_at)
    }

    #[test]
    fn insert_persists_and_rejects_duplicates() {
        let mut store = JsonStore::new(MemoryStore::new());
        let mut registry = MembershipRegistry::load(&store, KEY);

        registry.insert(record("a@b.com", now()), &mut store).unwrap();
        let err = registry.insert(record("a@b.com", now()), &mut store).unwrap_err();

        assert_eq!(err, SignupError::DuplicateIdentifier);
        assert_eq!(registry.count(), 1);
        let reloaded = MembershipRegistry::load(&store, KEY);
        assert_eq!(reloaded.count(), 1);
        assert!(reloaded.exists("a@b.com"));
    }

    #[test]
    fn identifiers_are_case_sensitive() {
        let mut store = JsonStore::new(MemoryStore::new());
        let mut registry = MembershipRegistry::load(&store, KEY);

        registry.insert(record("Player@Mail.com", now()), &mut store).unwrap();

        assert!(!registry.exists("player@mail.com"));
        assert!(registry.insert(record("player@mail.com", now()), &mut store).is_ok());
        assert_eq!(registry.count(), 2);
    }

    #[test]
    fn corrupt_registry_loads_empty() {
        let store = JsonStore::new(MemoryStore::new().with_item(KEY, "[{\"email\":"));
        let registry = MembershipRegistry::load(&store, KEY);
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn cleanup_keeps_active_and_recent_members() {
        let mut store = JsonStore::new(MemoryStore::new());
        let mut registry = MembershipRegistry::load(&store, KEY);
        let long_ago = now() - Duration::days(45);

        registry.insert(record("active@old.com", long_ago), &mut store).unwrap();
        let mut stale = record("stale@old.com", long_ago);
        stale.is_active = false;
        registry.insert(stale, &mut store).unwrap();
        let mut recent = record("recent@new.com", now() - Duration::days(2));
        recent.is_active = false;
        registry.insert(recent, &mut store).unwrap();

        let removed = registry.cleanup(Duration::days(DEFAULT_RETENTION_DAYS), &mut store, now());

        assert_eq!(removed, 1);
        assert!(!registry.exists("stale@old.com"));
        assert!(registry.exists("active@old.com"));
        assert!(registry.exists("recent@new.com"));
        assert_eq!(MembershipRegistry::load(&store, KEY).count(), 2);
    }

    #[test]
    fn login_keeps_inactive_member_through_cleanup() {
        let mut store = JsonStore::new(MemoryStore::new());
        let mut registry = MembershipRegistry::load(&store, KEY);
        let mut member = record("returning@old.com", now() - Duration::days(60));
        member.is_active = false;
        registry.insert(member, &mut store).unwrap();

        let touched = registry
            .touch_login("returning@old.com", &mut store, now() - Duration::days(1))
            .unwrap();
        assert_eq!(touched.last_login, Some(now() - Duration::days(1)));

        let removed = registry.cleanup(Duration::days(DEFAULT_RETENTION_DAYS), &mut store, now());
        assert_eq!(removed, 0);
        let reloaded = MembershipRegistry::load(&store, KEY);
        assert_eq!(
            reloaded.members()[0].last_login,
            Some(now() - Duration::days(1))
        );
    }

    #[test]
    fn login_for_unknown_identifier_changes_nothing() {
        let mut store = JsonStore::new(MemoryStore::new());
        let mut registry = MembershipRegistry::load(&store, KEY);
        registry.insert(record("a@b.com", now()), &mut store).unwrap();

        assert_eq!(registry.touch_login("A@b.com", &mut store, now()), None);
        assert_eq!(registry.members()[0].last_login, Some(now()));
    }

    #[test]
    fn cleanup_of_last_member_removes_the_key() {
        let mut store = JsonStore::new(MemoryStore::new());
        let mut registry = MembershipRegistry::load(&store, KEY);
        let mut stale = record("stale@old.com", now() - Duration::days(90));
        stale.is_active = false;
        registry.insert(stale, &mut store).unwrap();

        assert_eq!(registry.cleanup(Duration::days(DEFAULT_RETENTION_DAYS), &mut store, now()), 1);
        assert_eq!(store.backend().raw(KEY), None);
    }

    #[test]
    fn stats_count_todays_registrations() {
        let mut store = JsonStore::new(MemoryStore::new());
        let mut registry = MembershipRegistry::load(&store, KEY);

        registry.insert(record("one@today.com", now() - Duration::hours(3)), &mut store).unwrap();
        registry.insert(record("two@yesterday.com", now() - Duration::days(1)), &mut store).unwrap();
        let mut inactive = record("three@today.com", now());
        inactive.is_active = false;
        registry.insert(inactive, &mut store).unwrap();

        assert_eq!(
            registry.stats(now()),
            RegistryStats { total: 3, active: 2, registered_today: 2 }
        );
    }

    #[test]
    fn export_bundles_members_and_counters() {
        let mut store = JsonStore::new(MemoryStore::new());
        let mut registry = MembershipRegistry::load(&store, KEY);
        registry.insert(record("a@b.com", now()), &mut store).unwrap();
        let ledger = LedgerSnapshot {
            registered_count: 201,
            remaining_slots: 46,
            last_update: now(),
        };

        let value = serde_json::to_value(registry.export(&ledger, now())).unwrap();

        assert_eq!(value["users"][0]["email"], "a@b.com");
        assert_eq!(value["stats"]["registeredCount"], 201);
        assert!(value.get("exportDate").is_some());
    }
}
