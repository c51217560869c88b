//! Application lifecycle

pub mod startup;
