//! Native runtime support: configuration, blocking data access, logging.

pub mod config;
pub mod data;
pub mod logging;
