//! fOS Security
//!
//! Security primitives for the fOS browser engine.
//!
//! Features:
//! - Web origins
//! - Same-origin access checks

pub mod origin;

pub use origin::SecurityOrigin;

/// Security error
#[derive(Debug, thiserror::Error)]
pub enum SecurityError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
