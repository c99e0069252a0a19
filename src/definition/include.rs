//! Loading other definition files into the one being parsed.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::Error;
use crate::paths;

use super::builder::{self, DefinitionBuilder};
use super::model::Definition;

/// Files currently being parsed, outermost first.
///
/// Shared down the include graph so that a file reached twice on one path
/// fails with [`Error::CircularInclude`] instead of looping. Discarded once
/// the top-level parse returns.
#[derive(Debug, Default)]
pub(super) struct IncludeStack {
    entries: Vec<PathBuf>,
}

impl IncludeStack {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn push(&mut self, path: PathBuf) {
        self.entries.push(path);
    }

    pub(super) fn pop(&mut self) {
        self.entries.pop();
    }

    fn contains(&self, path: &Path) -> bool {
        self.entries.iter().any(|entry| entry == path)
    }
}

/// Builds a brand-new definition from another file, for `!include` lines and
/// the `source:file` form of `!create`.
///
/// The sub-definition gets the parent's build options but its own parser and
/// its own RNG. Stack identity uses the canonicalized path where available,
/// so the same file reached through different relative spellings still trips
/// cycle detection.
pub(super) fn load_sub_definition(
    target: &str,
    file: &str,
    base_dir: Option<&Path>,
    options: &DefinitionBuilder,
    stack: &mut IncludeStack,
) -> Result<Definition, Error> {
    let resolved = match paths::resolve_file(target, base_dir, options.root_dir()) {
        Some(path) => path,
        None => {
            warn!(target, file, "could not resolve referenced definition file");
            PathBuf::from(target)
        }
    };
    let identity = fs::canonicalize(&resolved).unwrap_or_else(|_| resolved.clone());

    if stack.contains(&identity) {
        return Err(Error::CircularInclude {
            file: file.to_string(),
            target: identity,
            stack: stack.entries.clone(),
        });
    }

    stack.push(identity);
    let result = builder::load_definition(&resolved, options, stack);
    stack.pop();
    result
}
