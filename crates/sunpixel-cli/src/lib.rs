//! SunPixel CLI library.
//!
//! This crate provides the command implementations behind the `sunpixel`
//! binary, along with palette location and logging setup.

pub mod commands;
pub mod config;
pub mod logging;
