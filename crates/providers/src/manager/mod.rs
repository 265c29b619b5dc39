//! Provider manager module.
//!
//! This module coordinates the enabled providers:
//! - Per-country source preference ordering
//! - Fallback to the next source when one has no data or fails
//! - Per-source attempt diagnostics
//! - Aggregated indicator and country listings

mod diagnostics;
mod preference;
mod provider_manager;

pub use diagnostics::{AttemptOutcome, FetchDiagnostics, SkipReason, SourceAttempt};
pub use preference::preference_order;
pub use provider_manager::ProviderManager;
