//! Configuration types shared by the cdc crates.

mod environment;
pub mod shared;

pub use environment::{APP_ENVIRONMENT_ENV_NAME, Environment, EnvironmentError};
