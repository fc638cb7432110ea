//! CDR corpus acquisition library
//!
//! This library provides the download, extraction and placement pipeline
//! behind the `cdrfetch` CLI.

pub mod commands;
pub mod core;
pub mod error;
pub mod utils;
