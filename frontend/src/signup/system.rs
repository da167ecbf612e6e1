use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::error::{ErrorKind, SignupError};
use super::events::{CounterUpdate, Notification, SignupEvent};
use super::ledger::CounterLedger;
use super::models::MemberRecord;
use super::registry::{MembershipRegistry, DEFAULT_RETENTION_DAYS};
use super::store::{JsonStore, KeyValueStore};
use super::verification::{
    generate_code, validate_form, DeliveryTicket, Step, VerificationSession,
};
use crate::config::{SignupConfig, DEMO_CODE_VISIBLE};

/// Owns everything the signup flow touches: the store, both persisted
/// records, the wizard session and the events the page still has to show.
///
/// Each public operation finishes its read-modify-write before returning,
/// so the growth timer and the wizard can never interleave halfway.
pub struct SignupSystem<S> {
    config: SignupConfig,
    store: JsonStore<S>,
    ledger: CounterLedger,
    registry: MembershipRegistry,
    session: VerificationSession,
    rng: StdRng,
    events: Vec<SignupEvent>,
}

impl<S: KeyValueStore> SignupSystem<S> {
    pub fn load(backend: S, config: SignupConfig, now: DateTime<Utc>) -> Self {
        Self::load_with_rng(backend, config, StdRng::from_entropy(), now)
    }

    pub fn load_with_rng(
        backend: S,
        config: SignupConfig,
        mut rng: StdRng,
        now: DateTime<Utc>,
    ) -> Self {
        let mut store = JsonStore::new(backend);
        let ledger = CounterLedger::load_or_seed(&mut store, &config, &mut rng, now);
        let mut registry = MembershipRegistry::load(&store, config.members_key);
        registry.cleanup(Duration::days(DEFAULT_RETENTION_DAYS), &mut store, now);
        info!(
            "Signup state loaded: {} members on record, {} shown",
            registry.count(),
            ledger.snapshot().registered_count
        );
        Self {
            config,
            store,
            ledger,
            registry,
            session: VerificationSession::new(),
            rng,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &SignupConfig {
        &self.config
    }

    pub fn ledger(&self) -> &CounterLedger {
        &self.ledger
    }

    pub fn counters(&self) -> CounterUpdate {
        self.ledger.counters()
    }

    pub fn registry(&self) -> &MembershipRegistry {
        &self.registry
    }

    pub fn session(&self) -> &VerificationSession {
        &self.session
    }

    pub fn step(&self) -> Step {
        self.session.step()
    }

    pub fn export_json(&self, now: DateTime<Utc>) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.registry.export(self.ledger.snapshot(), now))
    }

    #[cfg(test)]
    pub fn into_backend(self) -> S {
        self.store.into_backend()
    }

    pub fn drain_events(&mut self) -> Vec<SignupEvent> {
        std::mem::take(&mut self.events)
    }

    /// Back to the first step, discarding any code in flight. Used both when
    /// the wizard opens and when it is dismissed.
    pub fn reset(&mut self) {
        self.session.reset();
        self.events.push(SignupEvent::StepChanged(Step::CollectingIdentifier));
    }

    pub fn request_code(
        &mut self,
        email: &str,
        display_name: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<DeliveryTicket, SignupError> {
        let result = self.try_request_code(email, display_name, now);
        self.report(result)
    }

    /// Runs once the simulated mail delay is over. Returns false, and does
    /// nothing, when the wizard moved on in the meantime.
    pub fn deliver_code(&mut self, ticket: DeliveryTicket) -> bool {
        if !self.session.is_current(ticket) {
            debug!("Dropping delivery for a code that is no longer current");
            return false;
        }
        let (Some(pending), Some(code)) = (self.session.pending(), self.session.issued_code()) else {
            return false;
        };
        self.events.push(SignupEvent::Notify(Notification::success(format!(
            "Verification code sent to {}",
            pending.identifier
        ))));
        if DEMO_CODE_VISIBLE {
            self.events.push(SignupEvent::Notify(Notification::info(format!(
                "Demo code: {}",
                code
            ))));
        }
        true
    }

    pub fn resend_code(&mut self, now: DateTime<Utc>) -> Result<DeliveryTicket, SignupError> {
        let code = generate_code(&mut self.rng);
        let result = self.session.reissue(code, self.cooldown(), now);
        if result.is_ok() {
            debug!("Reissued verification code {:?}", self.session.issued_code());
        }
        self.report(result)
    }

    pub fn submit_code(
        &mut self,
        entered: &str,
        now: DateTime<Utc>,
    ) -> Result<MemberRecord, SignupError> {
        let result = self.try_submit_code(entered, now);
        self.report(result)
    }

    /// Looks a member up by email and records the login. There is no
    /// password: knowing a registered address is enough.
    pub fn log_in(&mut self, email: &str, now: DateTime<Utc>) -> Result<MemberRecord, SignupError> {
        let result = self.try_log_in(email, now);
        self.report(result)
    }

    /// One growth tick. Only the counters move.
    pub fn tick_growth(&mut self, now: DateTime<Utc>) -> Option<u64> {
        let n = self
            .ledger
            .apply_simulated_growth(&mut self.store, &self.config, &mut self.rng, now)?;
        self.events.push(SignupEvent::CountersChanged(self.ledger.counters()));
        self.events.push(SignupEvent::Notify(Notification::info(format!(
            "+{} new {} joined!",
            n, self.config.member_noun
        ))));
        Some(n)
    }

    fn try_request_code(
        &mut self,
        email: &str,
        display_name: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<DeliveryTicket, SignupError> {
        if self.session.step() != Step::CollectingIdentifier {
            return Err(SignupError::WrongStep {
                expected: Step::CollectingIdentifier,
                actual: self.session.step(),
            });
        }
        let pending = validate_form(email, display_name, self.config.requires_display_name)?;
        if self.registry.exists(&pending.identifier) {
            return Err(SignupError::DuplicateIdentifier);
        }

        let code = generate_code(&mut self.rng);
        debug!("Issued verification code {} for {}", code, pending.identifier);
        info!("Verification code requested for {}", pending.identifier);
        let ticket = self.session.issue(pending, code, self.cooldown(), now)?;
        self.events.push(SignupEvent::StepChanged(Step::AwaitingCode));
        Ok(ticket)
    }

    fn try_log_in(&mut self, email: &str, now: DateTime<Utc>) -> Result<MemberRecord, SignupError> {
        let identifier = validate_form(email, None, false)?.identifier;
        let member = self
            .registry
            .touch_login(&identifier, &mut self.store, now)
            .ok_or(SignupError::UnknownMember)?;
        info!("{} logged in", member.identifier);
        let name = member.display_name.as_deref().unwrap_or(&member.identifier);
        self.events.push(SignupEvent::Notify(Notification::success(format!(
            "Welcome back, {}!",
            name
        ))));
        Ok(member)
    }

    fn try_submit_code(
        &mut self,
        entered: &str,
        now: DateTime<Utc>,
    ) -> Result<MemberRecord, SignupError> {
        let pending = self.session.check_code(entered)?;
        let record = MemberRecord::new(
            pending.identifier,
            pending.display_name,
            self.config.member_status,
            &mut self.rng,
            now,
        );
        let record = self.registry.insert(record, &mut self.store)?;
        let counters = self.ledger.record_registration(&mut self.store, now);
        self.session.complete()?;

        info!("Registered {} ({} total)", record.identifier, counters.registered_count);
        self.events.push(SignupEvent::CountersChanged(counters));
        self.events.push(SignupEvent::StepChanged(Step::Completed));
        self.events.push(SignupEvent::Notify(Notification::success(
            "Registration complete!",
        )));
        Ok(record)
    }

    fn cooldown(&self) -> Duration {
        Duration::seconds(self.config.resend_cooldown_secs)
    }

    fn report<T>(&mut self, result: Result<T, SignupError>) -> Result<T, SignupError> {
        if let Err(e) = &result {
            match e.kind() {
                ErrorKind::InvalidTransition => warn!("Signup operation out of order: {:?}", e),
                kind => debug!("Signup operation refused ({:?}): {:?}", kind, e),
            }
            self.events.push(SignupEvent::Notify(Notification::error(e.to_string())));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signup::events::NotificationKind;
    use crate::signup::models::{LedgerSnapshot, MemberStatus};
    use crate::signup::store::MemoryStore;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 20, 20, 0, 0).unwrap()
    }

    fn ledger_json(registered: u64, remaining: u64) -> String {
        serde_json::to_string(&LedgerSnapshot {
            registered_count: registered,
            remaining_slots: remaining,
            last_update: now(),
        })
        .unwrap()
    }

    fn system_with(
        config: SignupConfig,
        registered: u64,
        remaining: u64,
    ) -> SignupSystem<MemoryStore> {
        let backend = MemoryStore::new().with_item(config.ledger_key, &ledger_json(registered, remaining));
        SignupSystem::load_with_rng(backend, config, StdRng::seed_from_u64(2024), now())
    }

    fn subscription(registered: u64, remaining: u64) -> SignupSystem<MemoryStore> {
        system_with(SignupConfig::subscription(), registered, remaining)
    }

    fn errors(events: &[SignupEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                SignupEvent::Notify(n) if n.kind == NotificationKind::Error => Some(n.message.clone()),
                _ => None,
            })
            .collect()
    }

    fn issued(system: &SignupSystem<MemoryStore>) -> String {
        system.session().issued_code().unwrap().to_string()
    }

    #[test]
    fn full_registration_updates_ledger_and_registry() {
        let mut system = subscription(200, 47);

        system.request_code("a@b.com", None, now()).unwrap();
        assert_eq!(system.step(), Step::AwaitingCode);
        let code = issued(&system);
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));

        let record = system.submit_code(&code, now()).unwrap();

        assert_eq!(system.step(), Step::Completed);
        assert_eq!(system.counters(), CounterUpdate { registered_count: 201, remaining_slots: 46 });
        assert_eq!(system.registry().count(), 1);
        assert_eq!(record.identifier, "a@b.com");
        assert_eq!(record.status, MemberStatus::Active);
        assert_eq!(system.session().issued_code(), None);
        assert_eq!(system.session().resend_available_at(), None);

        let events = system.drain_events();
        assert!(errors(&events).is_empty());
        assert!(events.contains(&SignupEvent::StepChanged(Step::Completed)));
        assert!(events.contains(&SignupEvent::CountersChanged(CounterUpdate {
            registered_count: 201,
            remaining_slots: 46,
        })));
    }

    #[test]
    fn registration_survives_reload() {
        let mut system = subscription(200, 47);
        system.request_code("a@b.com", None, now()).unwrap();
        let code = issued(&system);
        system.submit_code(&code, now()).unwrap();

        let config = system.config().clone();
        let reloaded = SignupSystem::load_with_rng(
            system.into_backend(),
            config,
            StdRng::seed_from_u64(1),
            now(),
        );

        assert!(reloaded.registry().exists("a@b.com"));
        assert_eq!(reloaded.counters().registered_count, 201);
        assert_eq!(reloaded.step(), Step::CollectingIdentifier);
    }

    #[test]
    fn duplicate_email_is_refused_up_front() {
        let mut system = subscription(200, 47);
        system.request_code("a@b.com", None, now()).unwrap();
        let code = issued(&system);
        system.submit_code(&code, now()).unwrap();
        system.reset();
        system.drain_events();

        let err = system.request_code("a@b.com", None, now()).unwrap_err();

        assert_eq!(err, SignupError::DuplicateIdentifier);
        assert_eq!(err.kind(), ErrorKind::Duplicate);
        assert_eq!(system.step(), Step::CollectingIdentifier);
        assert_eq!(errors(&system.drain_events()), vec!["This email is already registered"]);
    }

    #[test]
    fn malformed_email_changes_nothing() {
        let mut system = subscription(200, 47);

        let err = system.request_code("not-an-email", None, now()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(system.step(), Step::CollectingIdentifier);
        assert_eq!(system.session().issued_code(), None);
        assert_eq!(errors(&system.drain_events()).len(), 1);
    }

    #[test]
    fn beta_variant_needs_a_username() {
        let mut system = system_with(SignupConfig::beta(), 180, 47);

        assert!(matches!(
            system.request_code("a@b.com", None, now()),
            Err(SignupError::MissingField(_))
        ));
        system.request_code("a@b.com", Some("s1mple_fan"), now()).unwrap();
        let code = issued(&system);
        let record = system.submit_code(&code, now()).unwrap();

        assert_eq!(record.display_name.as_deref(), Some("s1mple_fan"));
        assert_eq!(record.status, MemberStatus::BetaTester);
    }

    #[test]
    fn wrong_code_keeps_waiting_without_lockout() {
        let mut system = subscription(200, 47);
        system.request_code("a@b.com", None, now()).unwrap();
        let code = issued(&system);
        let wrong = if code == "000000" { "111111" } else { "000000" };
        system.drain_events();

        for _ in 0..20 {
            assert_eq!(system.submit_code(wrong, now()), Err(SignupError::CodeMismatch));
        }

        assert_eq!(system.step(), Step::AwaitingCode);
        assert_eq!(system.registry().count(), 0);
        assert_eq!(system.counters().registered_count, 200);
        assert_eq!(errors(&system.drain_events()).len(), 20);
        assert!(system.submit_code(&code, now()).is_ok());
    }

    #[test]
    fn requesting_twice_never_registers_twice() {
        let mut system = subscription(200, 47);
        system.request_code("a@b.com", None, now()).unwrap();

        assert!(matches!(
            system.request_code("a@b.com", None, now()),
            Err(SignupError::WrongStep { .. })
        ));
        system.reset();
        system.request_code("a@b.com", None, now()).unwrap();
        let code = issued(&system);
        system.submit_code(&code, now()).unwrap();

        let matching = system
            .registry()
            .members()
            .iter()
            .filter(|m| m.identifier == "a@b.com")
            .count();
        assert_eq!(matching, 1);
        assert_eq!(system.counters().registered_count, 201);
    }

    #[test]
    fn resend_respects_cooldown() {
        let mut system = subscription(200, 47);
        system.request_code("a@b.com", None, now()).unwrap();
        let code = issued(&system);

        let err = system.resend_code(now() + Duration::seconds(30)).unwrap_err();
        assert_eq!(err, SignupError::ResendCooldown { remaining_secs: 30 });
        assert_eq!(issued(&system), code);

        system.resend_code(now() + Duration::seconds(60)).unwrap();
        assert_eq!(system.step(), Step::AwaitingCode);
        assert_eq!(system.session().pending().unwrap().identifier, "a@b.com");
    }

    #[test]
    fn resend_outside_code_step_is_refused() {
        let mut system = subscription(200, 47);
        assert!(matches!(
            system.resend_code(now()),
            Err(SignupError::WrongStep { .. })
        ));
    }

    #[test]
    fn delivery_after_reset_is_ignored() {
        let mut system = subscription(200, 47);
        let ticket = system.request_code("a@b.com", None, now()).unwrap();
        system.reset();
        system.drain_events();

        assert!(!system.deliver_code(ticket));
        assert!(system.drain_events().is_empty());
        assert_eq!(system.step(), Step::CollectingIdentifier);
    }

    #[test]
    fn delivery_announces_the_code() {
        let mut system = subscription(200, 47);
        let ticket = system.request_code("a@b.com", None, now()).unwrap();
        let code = issued(&system);
        system.drain_events();

        assert!(system.deliver_code(ticket));

        let events = system.drain_events();
        assert_eq!(
            events[0],
            SignupEvent::Notify(Notification::success("Verification code sent to a@b.com"))
        );
        assert!(events.contains(&SignupEvent::Notify(Notification::info(format!("Demo code: {}", code)))));
    }

    #[test]
    fn delivery_of_replaced_code_is_ignored() {
        let mut system = subscription(200, 47);
        let first = system.request_code("a@b.com", None, now()).unwrap();
        let second = system.resend_code(now() + Duration::seconds(61)).unwrap();

        assert!(!system.deliver_code(first));
        assert!(system.deliver_code(second));
    }

    #[test]
    fn no_slots_left_still_counts_registrations() {
        let mut system = subscription(500, 0);
        system.request_code("late@comer.com", None, now()).unwrap();
        let code = issued(&system);
        system.submit_code(&code, now()).unwrap();

        assert_eq!(system.counters(), CounterUpdate { registered_count: 501, remaining_slots: 0 });
    }

    #[test]
    fn growth_moves_counters_but_not_registry() {
        let config = SignupConfig {
            growth_probability: 1.0,
            ..SignupConfig::beta()
        };
        let mut system = system_with(config, 200, 47);

        let n = system.tick_growth(now()).unwrap();

        assert!((1..=3).contains(&n));
        assert_eq!(system.counters().registered_count, 200 + n);
        assert_eq!(system.counters().remaining_slots, 47 - n);
        assert_eq!(system.registry().count(), 0);
        let events = system.drain_events();
        assert!(events.contains(&SignupEvent::Notify(Notification::info(format!(
            "+{} new members joined!",
            n
        )))));
    }

    #[test]
    fn wizard_works_without_storage() {
        let mut system = SignupSystem::load_with_rng(
            MemoryStore::unavailable(),
            SignupConfig::subscription(),
            StdRng::seed_from_u64(9),
            now(),
        );
        let before = system.counters();

        system.request_code("a@b.com", None, now()).unwrap();
        let code = issued(&system);
        system.submit_code(&code, now()).unwrap();

        assert_eq!(system.step(), Step::Completed);
        assert_eq!(system.counters().registered_count, before.registered_count + 1);
        assert!(system.registry().exists("a@b.com"));
    }

    #[test]
    fn seven_digit_entry_does_not_register() {
        let mut system = subscription(200, 47);
        system.request_code("a@b.com", None, now()).unwrap();
        let code = issued(&system);
        system.drain_events();

        let err = system.submit_code(&format!("{}7", code), now()).unwrap_err();

        assert_eq!(err, SignupError::IncompleteCode);
        assert_eq!(system.step(), Step::AwaitingCode);
        assert_eq!(system.registry().count(), 0);
        assert_eq!(errors(&system.drain_events()).len(), 1);
    }

    #[test]
    fn login_refreshes_last_login() {
        let mut system = system_with(SignupConfig::beta(), 180, 47);
        system.request_code("a@b.com", Some("s1mple_fan"), now()).unwrap();
        let code = issued(&system);
        system.submit_code(&code, now()).unwrap();
        system.drain_events();
        let later = now() + Duration::days(3);

        let member = system.log_in("a@b.com", later).unwrap();

        assert_eq!(member.last_login, Some(later));
        assert_eq!(system.registry().members()[0].last_login, Some(later));
        assert_eq!(
            system.drain_events(),
            vec![SignupEvent::Notify(Notification::success("Welcome back, s1mple_fan!"))]
        );
        assert_eq!(system.counters().registered_count, 181);
    }

    #[test]
    fn login_with_unknown_email_is_refused() {
        let mut system = subscription(200, 47);

        let err = system.log_in("nobody@b.com", now()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(errors(&system.drain_events()), vec!["No account found for this email"]);
        assert_eq!(
            system.log_in("nobody", now()).unwrap_err(),
            SignupError::InvalidEmail
        );
    }

    #[test]
    fn export_contains_registered_member() {
        let mut system = subscription(200, 47);
        system.request_code("a@b.com", None, now()).unwrap();
        let code = issued(&system);
        system.submit_code(&code, now()).unwrap();

        let json = system.export_json(now()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["users"][0]["email"], "a@b.com");
        assert_eq!(value["stats"]["registeredCount"], 201);
        assert_eq!(system.registry().stats(now()).registered_today, 1);
    }
}
