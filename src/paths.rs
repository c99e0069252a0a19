//! Locating definition and data files on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Extensions treated as data-file references when normalizing values.
const DATA_EXTENSIONS: &[&str] = &[".simdef", ".csv", ".txt", ".eng"];

/// Resolves `path` to an existing file.
///
/// Tries, in order: the path itself when absolute; relative to `base`
/// (usually the directory of the definition file being parsed); relative to
/// `root` (an optional install/repository root); relative to the working
/// directory. Returns `None` when none of those exist.
pub fn resolve_file(path: &str, base: Option<&Path>, root: Option<&Path>) -> Option<PathBuf> {
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        return candidate.exists().then(|| candidate.to_path_buf());
    }

    if let Some(base) = base {
        let joined = base.join(candidate);
        if joined.exists() {
            return Some(joined);
        }
    }
    if let Some(root) = root {
        let joined = root.join(candidate);
        if joined.exists() {
            return Some(joined);
        }
    }
    candidate.exists().then(|| candidate.to_path_buf())
}

/// Rewrites values that name existing data files to absolute paths, so a
/// definition keeps working when the process is started from a different
/// working directory than the file's own.
///
/// A value is a candidate when it mentions one of the known data extensions;
/// it is only rewritten when it actually resolves to an existing file. A
/// leading `./` is ignored for the probe but preserved when nothing resolves.
pub(crate) fn normalize_value_paths(
    table: &mut BTreeMap<String, String>,
    base: Option<&Path>,
    root: Option<&Path>,
) {
    for value in table.values_mut() {
        let probe = value.strip_prefix("./").unwrap_or(value);
        if !looks_like_data_file(probe) {
            continue;
        }
        if let Some(resolved) = resolve_file(probe, base, root) {
            *value = resolved.to_string_lossy().into_owned();
        }
    }
}

fn looks_like_data_file(value: &str) -> bool {
    DATA_EXTENSIONS.iter().any(|ext| value.contains(ext))
}
