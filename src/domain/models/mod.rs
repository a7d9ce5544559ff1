pub mod analytics;
pub mod auth;
pub mod booking;
pub mod category;
pub mod event;
pub mod notification;
pub mod payment;
pub mod review;
pub mod settings;
pub mod user;

use thiserror::Error;

/// Raised when a stored or submitted enum label is not recognised.
#[derive(Debug, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}
