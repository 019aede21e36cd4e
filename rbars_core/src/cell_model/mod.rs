//! Module providing the cell model, its entities, and solved results
pub mod enzyme;
pub mod metabolite;
pub mod model;
pub mod process;
pub mod reaction;
pub mod result;
