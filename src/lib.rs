//! # soldrop
//!
//! Batch distribution of SPL tokens to many recipients. See
//! [`domain::DistributionEngine`] for the entry point.

pub mod config;
pub mod constants;
pub mod domain;
pub mod logging;
pub mod models;
pub mod services;
pub mod utils;
