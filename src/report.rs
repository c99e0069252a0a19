//! Reporting on how a definition was used.
//!
//! Pure reads of the tracked state: neither function changes what counts as
//! accessed. Typically called once at the end of a run, when an unused key
//! usually means a typo and a consumed default means a value the user never
//! set.

use tracing::{info, warn};

use crate::Definition;

/// Logs one warning per instance key that was never successfully read.
pub fn log_unused_keys(definition: &Definition) {
    let unused = definition.unused_keys();
    if unused.is_empty() {
        return;
    }

    warn!(
        file = definition.file_name(),
        count = unused.len(),
        "keys were loaded but never accessed"
    );
    for key in unused {
        let value = definition.peek(&key).unwrap_or_default();
        warn!(%key, value, "unused key");
    }
}

/// Logs the default values consumed since the definition was built.
pub fn log_used_defaults(definition: &Definition) {
    let used = definition.used_defaults();
    if used.is_empty() {
        return;
    }

    info!(
        file = definition.file_name(),
        count = used.len(),
        "default values were used; override them in the definition file if unintended"
    );
    for key in used {
        let value = definition.default_table().get(&key).unwrap_or_default();
        info!(%key, value, "default value used");
    }
}
