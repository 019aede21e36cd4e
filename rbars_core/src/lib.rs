//! Core rust implementation of rbars, a crate for resource balance analysis of cell models.

pub mod cell_model;
mod configuration;
pub mod io;
pub mod optimize;
pub mod report;
pub mod sweep;

pub use configuration::{Configuration, CONFIGURATION};
