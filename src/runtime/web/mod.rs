//! Browser runtime support: async fetch and file downloads.

pub mod data;
pub mod download;
