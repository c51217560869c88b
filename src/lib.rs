//! msgstats - statistics jobs for a multi-tenant messaging platform
//!
//! Maintains two derived tables over the platform's message store:
//! per-organization daily unique inbound contact counts (batch backfill and
//! daily refresh) and per-broadcast delivery counters (kept current by a
//! database trigger on message status changes).
//!
//! # Architecture
//! - `stats`: backfill runner, status model and collaborator traits
//! - `storage`: SeaORM backend implementing those traits
//! - `interfaces`: command-line commands
//! - `config`: configuration management
//! - `runtime`: process startup
//! - `system`: logging and interrupt handling

pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod stats;
pub mod storage;
pub mod system;
