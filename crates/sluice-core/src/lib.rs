/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Core routines shared by the sluice adapters
//!
//! This crate provides the pieces the image and JSON adapters
//! have in common
//!
//! - Blocking byte sources engines read their input from
//! - Conversion of typed quirks into engine key/value pairs
//! - A trait mapping result error strings to typed error vocabularies
//! - Logging macros that optionally forward to the `log` crate
//!
//! # Features
//!  - `log`: Forward [`log`] macros to the `log` crate.
//!
//!  - `serde`: Enables serializing of some of the data structures
//!     present in the crate
#![macro_use]

pub mod errors;
pub mod input;
pub mod quirks;
#[cfg(feature = "serde")]
mod serde;

#[cfg(not(feature = "log"))]
pub mod log;

#[cfg(feature = "log")]
pub use ::log;
