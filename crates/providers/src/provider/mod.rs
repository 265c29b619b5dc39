//! Indicator provider abstractions and implementations.
//!
//! This module contains:
//! - The `IndicatorProvider` trait that every upstream adapter implements
//! - Shared normalization helpers (code resolution, value and date cleanup)
//! - Concrete adapters for FRED, World Bank and OECD
//!
//! # Adapter contract
//!
//! Adapters own the knowledge of their upstream's identifiers and response
//! shapes. Upstream failures (timeouts, non-200s, garbled payloads, empty
//! observation sets) are logged with the source name and reported as
//! `Ok(None)`, so the manager can treat every source uniformly when falling
//! back. `Err` is reserved for failures the adapter could not classify.
//!
//! Every adapter clips its points to the query's range with
//! [`clip_to_range`], whatever filtering the upstream applied.

mod normalize;
mod traits;

pub mod fred;
pub mod oecd;
pub mod world_bank;

pub use normalize::{clip_to_range, collect_points, parse_value, resolve_native_code, MappingTable};
pub use traits::IndicatorProvider;
