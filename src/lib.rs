pub mod constants;
pub mod elroy;
pub mod engine;
pub mod error;
pub mod ghost;
pub mod hunting;
pub mod level;
pub mod navigation;
pub mod rng;
pub mod steering;
pub mod types;
pub mod world;
