//! CLI command implementations
//!
//! This module re-exports all CLI command functions.

mod apply_statuses;
mod backfill;
mod broadcast_stats;
mod config_gen;
mod refresh;
mod unique_contacts;

pub use apply_statuses::*;
pub use backfill::*;
pub use broadcast_stats::*;
pub use config_gen::*;
pub use refresh::*;
pub use unique_contacts::*;
