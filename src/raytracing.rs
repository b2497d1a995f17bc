pub mod accumulation;
pub mod camera;
pub mod core;
pub mod error;
pub mod frame;
pub mod integrator;
pub mod material;
pub mod math;
pub mod parser;
pub mod sampler;

pub use error::{Error, Result};
pub use math::*;
