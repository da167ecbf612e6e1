use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::LOW_SLOTS_THRESHOLD;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Active,
    BetaTester,
}

/// One entry of the membership registry.
///
/// Field names on disk are the ones the first version of the page wrote, so
/// visitors who registered back then keep their records.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRecord {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(rename = "email")]
    pub identifier: String,
    #[serde(rename = "username", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "registrationDate")]
    pub created_at: DateTime<Utc>,
    pub status: MemberStatus,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

impl MemberRecord {
    pub fn new<R: Rng + ?Sized>(
        identifier: String,
        display_name: Option<String>,
        status: MemberStatus,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: generate_member_id(rng, now),
            identifier,
            display_name,
            created_at: now,
            status,
            last_login: Some(now),
            is_active: true,
        }
    }
}

fn default_is_active() -> bool {
    true
}

// Early records used the bare millisecond timestamp as a numeric id.
fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Number(id) => id.to_string(),
    })
}

/// `user_<millis>_<9 lowercase alphanumerics>`
pub fn generate_member_id<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> String {
    let suffix: String = (0..9)
        .map(|_| char::from(rng.sample(Alphanumeric)).to_ascii_lowercase())
        .collect();
    format!("user_{}_{}", now.timestamp_millis(), suffix)
}

/// The persisted counter pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    #[serde(alias = "registeredUsers")]
    pub registered_count: u64,
    #[serde(alias = "betaSlots")]
    pub remaining_slots: u64,
    pub last_update: DateTime<Utc>,
}

impl LedgerSnapshot {
    pub fn slots_running_low(&self) -> bool {
        self.remaining_slots < LOW_SLOTS_THRESHOLD
    }
}
