//! Progressive Monte Carlo path tracer for scenes of analytic spheres.
//!
//! Every frame traces one jittered sample per pixel and folds it into a
//! running average that converges while the camera stays still.

pub mod raytracing;
