//! Integration tests for the Strata scene graph

mod config_integration;
mod layout_conflicts;
mod persistence_round_trip;
mod scene_resolution;
mod store_integration;
mod test_utils;
