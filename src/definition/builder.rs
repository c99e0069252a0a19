//! Construction of definitions from files and in-memory tables.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use crate::defaults::{self, DefaultTable};
use crate::error::Error;
use crate::paths;

use super::include::IncludeStack;
use super::model::Definition;
use super::parser::Parser;

/// Builder for loading a [`Definition`] with non-default options.
///
/// ```no_run
/// use simdef::{DefaultTable, Definition};
///
/// let defaults: DefaultTable = [("Craft.maxSpeed", "300")].into_iter().collect();
/// let def = Definition::builder()
///     .with_defaults(defaults)
///     .with_sampling(false)
///     .load("cases/hover.simdef")?;
/// # Ok::<(), simdef::Error>(())
/// ```
#[derive(Debug, Clone)]
#[must_use = "builders do nothing until .load() or .from_table() is called"]
pub struct DefinitionBuilder {
    defaults: Arc<DefaultTable>,
    sampling: bool,
    root_dir: Option<PathBuf>,
}

impl Default for DefinitionBuilder {
    fn default() -> Self {
        Self {
            defaults: defaults::builtin(),
            sampling: true,
            root_dir: None,
        }
    }
}

impl DefinitionBuilder {
    /// Replaces the built-in default table.
    ///
    /// The same options, including this table, govern every file reached
    /// through `!include` from the loaded file.
    pub fn with_defaults(mut self, defaults: impl Into<Arc<DefaultTable>>) -> Self {
        self.defaults = defaults.into();
        self
    }

    /// Enables or disables probabilistic sampling (enabled by default).
    ///
    /// With sampling disabled, `_stdDev`-tagged parameters keep their
    /// declared values and resampling calls are no-ops. Used for convergence
    /// studies, where random draws must not perturb parameters between runs.
    pub fn with_sampling(mut self, sampling: bool) -> Self {
        self.sampling = sampling;
        self
    }

    /// Sets a root directory searched for referenced files after the current
    /// file's own directory.
    pub fn with_root_dir(mut self, root: impl AsRef<Path>) -> Self {
        self.root_dir = Some(root.as_ref().to_path_buf());
        self
    }

    pub(super) fn root_dir(&self) -> Option<&Path> {
        self.root_dir.as_deref()
    }

    /// Parses the given file into a definition.
    pub fn load(self, path: impl AsRef<Path>) -> Result<Definition, Error> {
        let path = path.as_ref();
        let mut stack = IncludeStack::new();
        stack.push(fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf()));
        load_definition(path, &self, &mut stack)
    }

    /// Builds a definition from an already-flat table, bypassing parsing.
    pub fn from_table(self, table: BTreeMap<String, String>) -> Result<Definition, Error> {
        finish(table, "<in-memory>".to_string(), &self)
    }
}

impl Definition {
    pub fn builder() -> DefinitionBuilder {
        DefinitionBuilder::default()
    }

    /// Parses a definition file with the default options: the built-in
    /// default table, sampling enabled, no extra search root.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Definition, Error> {
        DefinitionBuilder::default().load(path)
    }

    /// Builds a definition from an already-flat table with the default
    /// options.
    pub fn from_table(table: BTreeMap<String, String>) -> Result<Definition, Error> {
        DefinitionBuilder::default().from_table(table)
    }
}

/// Reads and parses one file. Shared by the top-level entry points and the
/// include resolver, which pushes the target onto `stack` first.
pub(super) fn load_definition(
    path: &Path,
    options: &DefinitionBuilder,
    stack: &mut IncludeStack,
) -> Result<Definition, Error> {
    let text = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file = path.display().to_string();
    let base_dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf);

    let mut table = Parser::new(&file, base_dir.clone(), options, stack, &text).parse()?;
    paths::normalize_value_paths(&mut table, base_dir.as_deref(), options.root_dir());

    finish(table, file, options)
}

fn finish(
    table: BTreeMap<String, String>,
    file_name: String,
    options: &DefinitionBuilder,
) -> Result<Definition, Error> {
    let mut definition =
        Definition::from_parts(table, Arc::clone(&options.defaults), file_name, options.sampling);

    if options.sampling {
        let seed = resolve_seed(&definition)?;
        if definition.keys().any(|key| key.ends_with("_stdDev")) {
            debug!(seed, file = definition.file_name(), "seeding probabilistic sampler");
        }
        definition.reseed(seed);
        definition.resample_probabilistic_values()?;
    }

    Ok(definition)
}

/// Seeds from `MonteCarlo.randomSeed` when it resolves (instance, default,
/// or class-based), else picks a fresh pseudo-random seed.
fn resolve_seed(definition: &Definition) -> Result<u64, Error> {
    match definition.get_value("MonteCarlo.randomSeed") {
        Ok(value) => match value.parse::<i64>() {
            Ok(seed) => Ok(seed as u64),
            Err(_) => Err(Error::InvalidSeed {
                value: value.to_string(),
            }),
        },
        Err(_) => Ok(rand::thread_rng().gen_range(0..1_000_000u64)),
    }
}
