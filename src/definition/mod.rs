//! The simulation definition model and its construction pipeline.

mod builder;
mod derive;
mod include;
mod model;
mod parser;
mod sampling;
mod writer;

pub use builder::DefinitionBuilder;
pub use model::Definition;
