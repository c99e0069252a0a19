use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while parsing, querying, resampling, or writing a
/// simulation definition.
///
/// Parse errors name the file they occurred in and, where a single line is at
/// fault, the 1-based line number in the original (pre-comment-stripping)
/// text. Definitions built from an in-memory table report their file identity
/// as `<in-memory>`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("failed to read definition file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: io::Error,
    },

    #[error("failed to write definition file '{path}': {source}")]
    Write {
        path: PathBuf,
        source: io::Error,
    },

    #[error("{file}:{line}: line matches no grammar form: '{content}'")]
    MalformedLine {
        file: String,
        line: usize,
        content: String,
    },

    #[error("{file}:{line}: duplicate key '{key}'")]
    DuplicateKey {
        file: String,
        line: usize,
        key: String,
    },

    #[error("circular include: '{file}' references '{target}', which is already being parsed (stack: {stack:?})")]
    CircularInclude {
        file: String,
        target: PathBuf,
        stack: Vec<PathBuf>,
    },

    #[error("{file}:{line}: source dictionary '{source_dict}' for derived dictionary '{dest}' has no keys at this point")]
    UnknownSourceDict {
        file: String,
        line: usize,
        source_dict: String,
        dest: String,
    },

    #[error("{file}:{line}: derived key '{key}' collides with an existing key")]
    DerivedKeyCollision {
        file: String,
        line: usize,
        key: String,
    },

    #[error("{file}:{line}: unsupported directive '{directive}' (expected !replace or !removeKeysContaining)")]
    UnknownDirective {
        file: String,
        line: usize,
        directive: String,
    },

    #[error("{file}: dictionary '{name}' is never closed (missing '}}')")]
    UnclosedDictionary {
        file: String,
        name: String,
    },

    #[error("key '{key}' not found in '{file}' or the default value table")]
    KeyNotFound {
        file: String,
        key: String,
    },

    #[error("probabilistic value for key '{key}' must be a scalar or a 3-component vector (mean: '{mean}', stdDev: '{stddev}')")]
    InvalidProbabilisticValue {
        key: String,
        mean: String,
        stddev: String,
    },

    #[error("cannot seed random generator from MonteCarlo.randomSeed value '{value}': not an integer")]
    InvalidSeed {
        value: String,
    },
}
