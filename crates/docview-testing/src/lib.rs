//! Testing infrastructure for docview.
//!
//! - `DocTree`: declarative builder for temporary document directories
//! - `TestWorld`: isolated environment for running the `docview` binary

pub mod tree;
pub mod world;

pub use tree::{DocFixture, DocTree};
pub use world::{CliResult, TestWorld};
