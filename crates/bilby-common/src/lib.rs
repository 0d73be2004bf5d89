//! Common utilities for the Bilby layout engine.
//!
//! This crate provides shared infrastructure used by the engine crates:
//! - **Warning System** - colored terminal output for unsupported features
//! - **Units** - fixed-point subpixel geometry used by layout
//! - **Images** - decoded image data handed to the engine by the host

pub mod image;
pub mod units;
pub mod warning;
