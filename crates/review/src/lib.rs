//! `sanad-review` library crate.
//!
//! Loads a review input document, resolves the site climate, runs the
//! compliance engine and writes the report. The binary entrypoint lives in
//! `main.rs`.

pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod review;
pub mod weather;
