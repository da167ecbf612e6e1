use std::ops::RangeInclusive;

use crate::signup::models::MemberStatus;

pub const PAYMENT_URL: &str = "https://example.com/payment";
pub const PREFERENCES_KEY: &str = "userPreferences";
pub const NOTIFICATION_TTL_MS: u32 = 5_000;
pub const LOW_SLOTS_THRESHOLD: u64 = 10;
pub const PURCHASE_REDIRECT_DELAY_MS: u32 = 2_000;

// Nothing is mailed anywhere, so the issued code has to reach the visitor somehow.
pub const DEMO_CODE_VISIBLE: bool = true;

/// Knobs that distinguish the beta registration page from the newsletter page.
#[derive(Clone, Debug, PartialEq)]
pub struct SignupConfig {
    pub members_key: &'static str,
    pub ledger_key: &'static str,
    pub growth_interval_ms: u32,
    pub growth_probability: f64,
    pub growth_range: RangeInclusive<u64>,
    pub initial_seed_range: RangeInclusive<u64>,
    pub initial_remaining_slots: u64,
    pub requires_display_name: bool,
    pub member_status: MemberStatus,
    pub resend_cooldown_secs: i64,
    pub code_delivery_delay_ms: u32,
    pub contact_delay_ms: u32,
    pub member_noun: &'static str,
    pub call_to_action: &'static str,
}

impl SignupConfig {
    pub fn beta() -> Self {
        Self {
            members_key: "cs2external_users",
            ledger_key: "cs2external_stats",
            growth_interval_ms: 30_000,
            growth_probability: 0.30,
            growth_range: 1..=3,
            initial_seed_range: 150..=199,
            initial_remaining_slots: 47,
            requires_display_name: true,
            member_status: MemberStatus::BetaTester,
            resend_cooldown_secs: 60,
            code_delivery_delay_ms: 1_000,
            contact_delay_ms: 2_000,
            member_noun: "members",
            call_to_action: "Join the beta",
        }
    }

    pub fn subscription() -> Self {
        Self {
            members_key: "cs2external_subscribers",
            ledger_key: "cs2external_subscriber_stats",
            growth_interval_ms: 45_000,
            growth_probability: 0.15,
            growth_range: 1..=2,
            initial_seed_range: 250..=350,
            initial_remaining_slots: 47,
            requires_display_name: false,
            member_status: MemberStatus::Active,
            resend_cooldown_secs: 60,
            code_delivery_delay_ms: 1_000,
            contact_delay_ms: 2_000,
            member_noun: "subscribers",
            call_to_action: "Subscribe",
        }
    }
}

#[cfg(not(feature = "newsletter"))]
pub fn get_signup_config() -> SignupConfig {
    SignupConfig::beta()
}

#[cfg(feature = "newsletter")]
pub fn get_signup_config() -> SignupConfig {
    SignupConfig::subscription()
}
