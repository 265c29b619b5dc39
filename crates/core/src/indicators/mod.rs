//! Indicator query module - request models, the service and its trait.

mod catalog;
mod indicators_model;
mod indicators_service;
mod indicators_traits;

pub use catalog::{categories, regions};
pub use indicators_model::*;
pub use indicators_service::IndicatorService;
pub use indicators_traits::IndicatorServiceTrait;
