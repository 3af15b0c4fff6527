//! Carrier adapters. Each composes a payload builder and a response
//! normalizer with its own status table.

pub mod dhl;
pub mod ups;

pub use dhl::{DhlCarrier, DhlConfig};
pub use ups::{UpsCarrier, UpsConfig};
