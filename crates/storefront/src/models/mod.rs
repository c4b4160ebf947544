//! Storefront-side models. Domain records live in `bloomway_core::models`.

pub mod session;

pub use session::{CurrentUser, Flash, FlashKind, PendingRegistration, keys as session_keys};
