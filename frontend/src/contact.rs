//! Contact form. There is no endpoint behind it: a submission waits out a
//! fixed delay and then reports success.

use log::info;
use thiserror::Error;

use crate::signup::verification::is_valid_email;
use crate::signup::Notification;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ContactError {
    #[error("Please fill in the {0} field")]
    MissingField(&'static str),
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Your message is still being sent")]
    AlreadySending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContactTicket(u64);

/// At most one submission in flight.
#[derive(Debug, Default)]
pub struct ContactForm {
    in_flight: Option<ContactTicket>,
    submitted: u64,
}

impl ContactForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_sending(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn submit(&mut self, message: &ContactMessage) -> Result<ContactTicket, ContactError> {
        if self.in_flight.is_some() {
            return Err(ContactError::AlreadySending);
        }
        for (label, value) in [
            ("name", &message.name),
            ("email", &message.email),
            ("message", &message.message),
        ] {
            if value.trim().is_empty() {
                return Err(ContactError::MissingField(label));
            }
        }
        if !is_valid_email(&message.email) {
            return Err(ContactError::InvalidEmail);
        }

        self.submitted += 1;
        let ticket = ContactTicket(self.submitted);
        self.in_flight = Some(ticket);
        info!("Sending contact message from {}", message.email);
        Ok(ticket)
    }

    /// Finishes the submission `ticket` belongs to. Stale tickets get `None`.
    pub fn complete(&mut self, ticket: ContactTicket) -> Option<Notification> {
        if self.in_flight != Some(ticket) {
            return None;
        }
        self.in_flight = None;
        Some(Notification::success("Message sent successfully!"))
    }

    pub fn cancel(&mut self) {
        self.in_flight = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signup::events::NotificationKind;

    fn message() -> ContactMessage {
        ContactMessage {
            name: "Dev".to_string(),
            email: "dev@example.com".to_string(),
            message: "Does it work on FACEIT?".to_string(),
        }
    }

    #[test]
    fn submission_completes_once() {
        let mut form = ContactForm::new();
        let ticket = form.submit(&message()).unwrap();
        assert!(form.is_sending());

        let notice = form.complete(ticket).unwrap();
        assert_eq!(notice.kind, NotificationKind::Success);
        assert!(!form.is_sending());
        assert_eq!(form.complete(ticket), None);
    }

    #[test]
    fn second_submission_waits_for_first() {
        let mut form = ContactForm::new();
        form.submit(&message()).unwrap();
        assert_eq!(form.submit(&message()), Err(ContactError::AlreadySending));
    }

    #[test]
    fn validation() {
        let mut form = ContactForm::new();
        let blank_name = ContactMessage { name: " ".to_string(), ..message() };
        assert_eq!(form.submit(&blank_name), Err(ContactError::MissingField("name")));

        let bad_email = ContactMessage { email: "dev@localhost".to_string(), ..message() };
        assert_eq!(form.submit(&bad_email), Err(ContactError::InvalidEmail));
        assert!(!form.is_sending());
    }

    #[test]
    fn cancelled_submission_ignores_late_completion() {
        let mut form = ContactForm::new();
        let old = form.submit(&message()).unwrap();
        form.cancel();
        let new = form.submit(&message()).unwrap();

        assert_eq!(form.complete(old), None);
        assert!(form.is_sending());
        assert!(form.complete(new).is_some());
    }
}
