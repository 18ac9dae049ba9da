// This is free and unencumbered software released into the public domain.

//! Camera capture over the Android NDK camera framework.
//!
//! The [`shared`] module holds the portable front end ([`shared::Camera`],
//! configuration, frames, the single-slot image holder) and the drivers.
//! The [`ffi`] module exposes the same lifecycle through a C ABI.

#[macro_use]
mod log;

pub mod cli;
pub mod ffi;
pub mod shared;
