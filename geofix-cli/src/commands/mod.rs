//! CLI command implementations.

pub mod categories;
pub mod common;
pub mod edit;
pub mod fit;
pub mod list;
pub mod locate;
pub mod tag;
