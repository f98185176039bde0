pub mod config;
pub mod logging;

pub mod failure;
pub mod retry;
