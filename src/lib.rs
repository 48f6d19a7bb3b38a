//! ofsextract - 3D-Plane extraction from MVC streams
//!
//! This library crate exposes the run pipeline for integration testing.

pub mod config;
pub mod extract;
pub mod report;
