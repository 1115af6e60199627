// ReconLog - core/mod.rs
//
// Core business logic layer: scanning, extraction, aggregation, tables.
// Dependencies: regex, csv, serde, toml, serde_json, tracing.
// Must NOT depend on: app or platform, and never opens files itself.

pub mod aggregate;
pub mod classifier;
pub mod export;
pub mod extract;
pub mod model;
pub mod record;
pub mod registry;
pub mod scanner;
pub mod series;
