//! Shared application core: state, input types, reducer, and web mouse mapping.

pub mod input;
pub mod reducer;
pub mod state;
pub mod web_mouse;
