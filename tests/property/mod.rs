//! Property tests for resolution, re-parenting and document round trips

mod resolution;
mod round_trip;
