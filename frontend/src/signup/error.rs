use std::fmt;

use thiserror::Error;

use super::verification::Step;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Email,
    DisplayName,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Email => write!(f, "email"),
            Field::DisplayName => write!(f, "username"),
        }
    }
}

/// Every way a wizard operation can be refused. The display text is what the
/// visitor sees in the error notification.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SignupError {
    #[error("Please fill in all fields (missing {0})")]
    MissingField(Field),
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("This email is already registered")]
    DuplicateIdentifier,
    #[error("Please enter the verification code")]
    EmptyCode,
    #[error("The verification code has exactly 6 digits")]
    IncompleteCode,
    #[error("Invalid verification code")]
    CodeMismatch,
    #[error("You can request a new code in {remaining_secs} s")]
    ResendCooldown { remaining_secs: i64 },
    #[error("No account found for this email")]
    UnknownMember,
    #[error("This step is not available right now")]
    WrongStep { expected: Step, actual: Step },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Duplicate,
    NotFound,
    Mismatch,
    Cooldown,
    InvalidTransition,
}

impl SignupError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SignupError::MissingField(_)
            | SignupError::InvalidEmail
            | SignupError::EmptyCode
            | SignupError::IncompleteCode => ErrorKind::Validation,
            SignupError::DuplicateIdentifier => ErrorKind::Duplicate,
            SignupError::UnknownMember => ErrorKind::NotFound,
            SignupError::CodeMismatch => ErrorKind::Mismatch,
            SignupError::ResendCooldown { .. } => ErrorKind::Cooldown,
            SignupError::WrongStep { .. } => ErrorKind::InvalidTransition,
        }
    }
}
