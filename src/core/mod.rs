//! core
//!
//! Domain types shared by every stage of the pipeline.
//!
//! # Modules
//!
//! - [`value`] - Dynamic values passed into and out of command functions
//! - [`signature`] - Declarative parameter lists
//! - [`callable`] - Functions, extension chains and chain inspection
//! - [`config`] - Read-only config files supplying defaults

pub mod callable;
pub mod config;
pub mod signature;
pub mod value;
