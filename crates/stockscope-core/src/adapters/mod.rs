//! # Source Adapters
//!
//! Implementations of [`crate::AnalysisSource`].
//!
//! | Adapter | Description |
//! |---------|-------------|
//! | [`RestSource`] | JSON-over-HTTP client for the analysis backend |
//! | [`FixtureSource`] | Deterministic offline data derived from the security id |

mod fixture;
mod rest;

pub use fixture::FixtureSource;
pub use rest::RestSource;

use crate::data_source::SourceError;
use crate::ValidationError;

/// Payloads that fail domain construction are reported as internal source errors.
pub(crate) fn validation_to_error(error: ValidationError) -> SourceError {
    SourceError::internal(error.to_string())
}
