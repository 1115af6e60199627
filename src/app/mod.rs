// ReconLog - app/mod.rs
//
// Application layer: stage orchestration and registry loading.
// Dependencies: core layer, platform::fs for reading inputs and creating
// outputs.

pub mod pipeline;
pub mod registry_mgr;
