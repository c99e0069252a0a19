//! Reading, transforming, and writing simulation definition files.
//!
//! A definition file is a nested set of named dictionaries holding
//! whitespace-separated key/value pairs:
//!
//! ```text
//! SimControl {
//!     timeDiscretization  RK45Adaptive
//!     timeStep            0.01        # comments run to end of line
//! }
//!
//! Rocket {
//!     position    (0 0 10)
//! }
//! ```
//!
//! Parsing flattens this into dotted keys (`SimControl.timeStep` -> `0.01`);
//! every value is an opaque string. On top of the flat table the crate
//! provides:
//!
//! - `!include` of other definition files, with cycle detection
//! - `!create <Name> from <Source> { ... }` derived dictionaries: templated
//!   copies transformed by `!replace` and `!removeKeysContaining` directives
//! - layered default values, including class-based defaults resolved through
//!   `.class` keys (see [`Definition::get_value`])
//! - Monte-Carlo resampling of parameters declared with a paired `_stdDev`
//!   key, seeded via `MonteCarlo.randomSeed`
//! - serialization back to nested text ([`Definition::write_to_file`])
//!
//! ```no_run
//! use simdef::Definition;
//!
//! let mut def = Definition::from_file("cases/landing.simdef")?;
//! let time_step = def.get_value("SimControl.timeStep")?.to_string();
//! def.resample_probabilistic_values()?;
//! # Ok::<(), simdef::Error>(())
//! ```

pub mod defaults;
mod definition;
mod error;
pub mod key;
pub mod paths;
pub mod report;
pub mod vector;

pub use defaults::DefaultTable;
pub use definition::{Definition, DefinitionBuilder};
pub use error::Error;
pub use vector::{ParseVec3Error, Vec3};
