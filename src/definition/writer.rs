//! Writing a definition back out as nested dictionary text.

use std::fs;
use std::path::Path;

use crate::error::Error;

use super::model::Definition;

impl Definition {
    /// Renders the table as nested dictionary text, sorted by key.
    ///
    /// Comments, key order, and directives from the source file are not
    /// reproduced; re-parsing the output yields an identical table. The
    /// optional header is three comment lines (format name, file, write
    /// timestamp), so it re-parses cleanly too.
    pub fn to_text(&self, with_header: bool) -> String {
        let mut out = String::new();

        if with_header {
            out.push_str("# simdef\n");
            out.push_str(&format!("# File: {}\n", self.file_name));
            out.push_str(&format!(
                "# Autowritten on: {}\n",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
            ));
        }

        let mut open: Vec<&str> = Vec::new();
        for (key, value) in &self.table {
            let segments: Vec<&str> = key.split('.').collect();
            let dicts = &segments[..segments.len() - 1];
            let leaf = segments[segments.len() - 1];

            if open != dicts {
                // Close down to the longest prefix shared with the next key,
                // then open what it needs.
                let shared = open
                    .iter()
                    .zip(dicts.iter())
                    .take_while(|(a, b)| a == b)
                    .count();
                while open.len() > shared {
                    open.pop();
                    out.push_str(&format!("{}}}\n", "\t".repeat(open.len())));
                }

                let opened = open.len() < dicts.len();
                while open.len() < dicts.len() {
                    let name = dicts[open.len()];
                    out.push_str(&format!(
                        "\n{}{}{{\n",
                        "\t".repeat(open.len()),
                        escape_hashes(name)
                    ));
                    open.push(name);
                }
                if !opened {
                    // Spacing line when dropping back without opening anything.
                    out.push('\n');
                }
            }

            out.push_str(&format!(
                "{}{}\t{}\n",
                "\t".repeat(open.len()),
                escape_hashes(leaf),
                escape_hashes(value)
            ));
        }

        while !open.is_empty() {
            open.pop();
            out.push_str(&format!("{}}}\n", "\t".repeat(open.len())));
        }

        out
    }

    /// Writes [`to_text`](Definition::to_text) output to a file.
    pub fn write_to_file(&self, path: impl AsRef<Path>, with_header: bool) -> Result<(), Error> {
        let path = path.as_ref();
        fs::write(path, self.to_text(with_header)).map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// A literal `#` in a name or value would read back as a comment start, so
/// it is written in its escaped form.
fn escape_hashes(text: &str) -> String {
    text.replace('#', "\\#")
}
