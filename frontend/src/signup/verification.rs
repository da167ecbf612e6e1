//! The three-step signup wizard: collect an email, confirm a code, done.

use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

use super::error::{Field, SignupError};

pub const CODE_LENGTH: usize = 6;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Step {
    #[default]
    CollectingIdentifier,
    AwaitingCode,
    Completed,
}

/// Identifies one issued code. Deferred work holding an older ticket must
/// not touch the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeliveryTicket {
    epoch: u64,
    issue: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingSignup {
    pub identifier: String,
    pub display_name: Option<String>,
}

/// What is left of a code entry after cleaning it up.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeInput {
    pub digits: String,
    pub complete: bool,
}

/// Keeps digits only, at most `CODE_LENGTH` of them. Works the same for
/// typed and pasted text.
pub fn sanitize_code_input(raw: &str) -> CodeInput {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(CODE_LENGTH)
        .collect();
    let complete = digits.len() == CODE_LENGTH;
    CodeInput { digits, complete }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Uniform over 100000..=999999.
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    rng.gen_range(100_000..=999_999u32).to_string()
}

/// Field checks that need nothing but the form itself. The email is kept
/// exactly as typed.
pub fn validate_form(
    email: &str,
    display_name: Option<&str>,
    requires_display_name: bool,
) -> Result<PendingSignup, SignupError> {
    if email.trim().is_empty() {
        return Err(SignupError::MissingField(Field::Email));
    }
    let display_name = display_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);
    if requires_display_name && display_name.is_none() {
        return Err(SignupError::MissingField(Field::DisplayName));
    }
    if !is_valid_email(email) {
        return Err(SignupError::InvalidEmail);
    }
    Ok(PendingSignup {
        identifier: email.to_string(),
        display_name,
    })
}

/// Wizard state for one visit of the signup modal. Never persisted.
#[derive(Debug, Default)]
pub struct VerificationSession {
    step: Step,
    pending: Option<PendingSignup>,
    issued_code: Option<String>,
    resend_available_at: Option<DateTime<Utc>>,
    epoch: u64,
    issue: u64,
}

impl VerificationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn pending(&self) -> Option<&PendingSignup> {
        self.pending.as_ref()
    }

    pub fn issued_code(&self) -> Option<&str> {
        self.issued_code.as_deref()
    }

    #[cfg(test)]
    pub fn resend_available_at(&self) -> Option<DateTime<Utc>> {
        self.resend_available_at
    }

    /// Whole seconds until a new code may be requested, rounded up.
    pub fn resend_remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        match self.resend_available_at {
            Some(at) if at > now => ((at - now).num_milliseconds() + 999) / 1000,
            _ => 0,
        }
    }

    pub fn is_current(&self, ticket: DeliveryTicket) -> bool {
        self.step == Step::AwaitingCode && ticket == self.ticket()
    }

    pub fn issue(
        &mut self,
        pending: PendingSignup,
        code: String,
        cooldown: Duration,
        now: DateTime<Utc>,
    ) -> Result<DeliveryTicket, SignupError> {
        self.expect_step(Step::CollectingIdentifier)?;
        self.pending = Some(pending);
        self.step = Step::AwaitingCode;
        Ok(self.store_code(code, cooldown, now))
    }

    pub fn reissue(
        &mut self,
        code: String,
        cooldown: Duration,
        now: DateTime<Utc>,
    ) -> Result<DeliveryTicket, SignupError> {
        self.expect_step(Step::AwaitingCode)?;
        let remaining_secs = self.resend_remaining_secs(now);
        if remaining_secs > 0 {
            return Err(SignupError::ResendCooldown { remaining_secs });
        }
        Ok(self.store_code(code, cooldown, now))
    }

    /// Checks an entered code against the issued one without changing state.
    /// Non-digits are ignored, but the digits left must number exactly
    /// `CODE_LENGTH`: nothing is truncated here.
    pub fn check_code(&self, entered: &str) -> Result<PendingSignup, SignupError> {
        self.expect_step(Step::AwaitingCode)?;
        let digits: String = entered.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return Err(SignupError::EmptyCode);
        }
        if digits.len() != CODE_LENGTH {
            return Err(SignupError::IncompleteCode);
        }
        if self.issued_code.as_deref() != Some(digits.as_str()) {
            return Err(SignupError::CodeMismatch);
        }
        self.pending.clone().ok_or(SignupError::WrongStep {
            expected: Step::AwaitingCode,
            actual: self.step,
        })
    }

    /// Finishes the wizard. The pending signup stays readable for the
    /// confirmation screen.
    pub fn complete(&mut self) -> Result<(), SignupError> {
        self.expect_step(Step::AwaitingCode)?;
        self.issued_code = None;
        self.resend_available_at = None;
        self.step = Step::Completed;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.step = Step::CollectingIdentifier;
        self.pending = None;
        self.issued_code = None;
        self.resend_available_at = None;
        self.epoch += 1;
    }

    fn store_code(&mut self, code: String, cooldown: Duration, now: DateTime<Utc>) -> DeliveryTicket {
        self.issued_code = Some(code);
        self.resend_available_at = Some(now + cooldown);
        self.issue += 1;
        self.ticket()
    }

    fn ticket(&self) -> DeliveryTicket {
        DeliveryTicket {
            epoch: self.epoch,
            issue: self.issue,
        }
    }

    fn expect_step(&self, expected: Step) -> Result<(), SignupError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(SignupError::WrongStep {
                expected,
                actual: self.step,
            })
        }
    }
}
