//! Platform glue, split by target: terminal on native, browser on wasm32.

#[cfg(not(target_arch = "wasm32"))]
pub mod native;

#[cfg(target_arch = "wasm32")]
pub mod web;
