pub mod config;
mod error;
pub mod network;
pub mod prober;
pub mod registry;
pub mod runtime;
pub mod snapshot;
pub mod tracker;
pub mod util;

pub use error::{HealthError, HealthResult};
