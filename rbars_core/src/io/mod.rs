//! Module for reading and writing models
pub mod json;
