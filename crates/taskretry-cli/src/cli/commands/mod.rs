//! CLI command handlers. Each command is in its own file.

mod config;
mod explain;
mod interval;
mod simulate;

pub use config::run_config;
pub use explain::run_explain;
pub use interval::run_interval;
pub use simulate::run_simulate;
