pub mod config;
pub mod driver;

pub use config::WatchConfig;
pub use driver::{CycleDriver, RunMode};
