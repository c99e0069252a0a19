//! Derived dictionaries: the `!create <Name> from <Source> { ... }` block.

use std::collections::BTreeMap;

use crate::error::Error;
use crate::key;

use super::include;
use super::parser::{qualify, tokenize, Parser};

impl Parser<'_> {
    /// Parses one derived-dictionary block starting at `start` (the `!create`
    /// line). Returns the index of the block's closing `}`.
    pub(super) fn parse_derived(&mut self, start: usize, prefix: &str) -> Result<usize, Error> {
        let header = self.lines[start].clone();

        // The opening brace may be glued to the source path or stand alone;
        // after removing it the line must be exactly `!create NAME from SRC`.
        let Some(head) = header.text.strip_suffix('{') else {
            return Err(self.malformed(header.number, &header.text));
        };
        let tokens = tokenize(head);
        if tokens.len() != 4 || tokens[0] != "!create" || tokens[2] != "from" {
            return Err(self.malformed(header.number, &header.text));
        }
        let dest = qualify(prefix, &tokens[1]);

        let (source_dict, mut staged) = self.stage_source(&tokens[3], &dest, header.number)?;
        if staged.is_empty() {
            return Err(Error::UnknownSourceDict {
                file: self.file.to_string(),
                line: header.number,
                source_dict,
                dest,
            });
        }

        // Transform directives run until the first line that is not a `!` line.
        let mut i = start + 1;
        while i < self.lines.len() {
            let line = self.lines[i].clone();
            if !line.text.starts_with('!') {
                break;
            }

            let args = tokenize(&line.text);
            match args[0].as_str() {
                "!replace" => {
                    if args.len() < 3 {
                        return Err(self.malformed(line.number, &line.text));
                    }
                    let from = args[1].as_str();
                    let to = args[args.len() - 1].as_str();
                    staged = staged
                        .into_iter()
                        .map(|(key, value)| (key.replace(from, to), value.replace(from, to)))
                        .collect();
                }
                "!removeKeysContaining" => {
                    if args.len() < 2 {
                        return Err(self.malformed(line.number, &line.text));
                    }
                    staged.retain(|key, _| !key.contains(args[1].as_str()));
                }
                directive => {
                    return Err(Error::UnknownDirective {
                        file: self.file.to_string(),
                        line: line.number,
                        directive: directive.to_string(),
                    });
                }
            }

            i += 1;
        }

        // The collision check stays strict even when the surrounding parse
        // allows overwrites (nested !create).
        for (key, value) in staged {
            if self.table.contains_key(&key) {
                return Err(Error::DerivedKeyCollision {
                    file: self.file.to_string(),
                    line: header.number,
                    key,
                });
            }
            self.table.insert(key, value);
        }

        // Literal lines in the block may override templated values.
        self.parse_dictionary(i, &dest, true)
    }

    /// Copies the source dictionary's entries, with the source-path prefix of
    /// each key swapped for the destination name.
    fn stage_source(
        &mut self,
        spec: &str,
        dest: &str,
        line: usize,
    ) -> Result<(String, BTreeMap<String, String>), Error> {
        let mut staged = BTreeMap::new();

        if let Some((file_ref, dict_path)) = spec.split_once(':') {
            if file_ref.is_empty() || dict_path.is_empty() {
                return Err(self.malformed(line, spec));
            }
            let sub = include::load_sub_definition(
                file_ref,
                self.file,
                self.base_dir.as_deref(),
                self.options,
                self.stack,
            )?;
            for (key, value) in sub.into_table() {
                if key::is_sub_key(dict_path, &key) {
                    staged.insert(format!("{dest}{}", &key[dict_path.len()..]), value);
                }
            }
            Ok((dict_path.to_string(), staged))
        } else {
            for (key, value) in &self.table {
                if key::is_sub_key(spec, key) {
                    staged.insert(format!("{dest}{}", &key[spec.len()..]), value.clone());
                }
            }
            Ok((spec.to_string(), staged))
        }
    }
}
