//! Beta registration / newsletter signup: the wizard, the public counters
//! and the member list, all kept in browser local storage.

pub mod error;
pub mod events;
pub mod growth;
pub mod ledger;
pub mod models;
pub mod registry;
pub mod store;
pub mod system;
pub mod verification;

pub use events::{Notification, SignupEvent};
pub use store::LocalStorage;
pub use system::SignupSystem;
pub use verification::Step;
