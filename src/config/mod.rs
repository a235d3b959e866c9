//! Configuration for distribution runs.
//!
//! `EnvConfig` locates the config file and the funding keypair;
//! `DistributionConfig` holds batching, confirmation and fee settings.

mod config_file;
pub use config_file::*;

mod env_config;
pub use env_config::*;
