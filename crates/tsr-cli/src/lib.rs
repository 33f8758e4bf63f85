//! Time study recorder CLI library.
//!
//! This crate provides the interactive terminal front-end for the recorder.

pub mod app;
mod cli;
mod config;
pub mod ticker;

pub use cli::{Cli, Commands};
pub use config::Config;
