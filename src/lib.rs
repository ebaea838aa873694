//! sheet-search library: shared application core for native and web runtimes.

pub mod app_core;
pub mod export;
pub mod highlight;
pub mod matcher;
pub mod model;
pub mod runtime;
pub mod source;
pub mod table;
pub mod theme;
pub mod ui;
