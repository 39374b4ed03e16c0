// src/config/mod.rs
pub mod consts;
pub mod options;
pub mod profile;

pub use options::{FetchPolicy, RunOptions};
pub use profile::CityProfile;
