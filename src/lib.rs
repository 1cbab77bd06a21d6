pub mod accumulator;
pub mod cli;
pub mod config;
pub mod matcher;
pub mod metadata;
pub mod model;
pub mod mutation;
pub mod redundant;
pub mod selector;
pub mod version;

mod api;

pub use api::{DependencyModel, DependencyModelBuilder};
