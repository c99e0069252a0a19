//! Line preprocessing and the recursive structural parser.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::Error;

use super::builder::DefinitionBuilder;
use super::include::{self, IncludeStack};

/// One surviving input line, keeping its 1-based position in the original
/// text so errors point at the user's file rather than the filtered buffer.
#[derive(Debug, Clone)]
pub(super) struct Line {
    pub(super) number: usize,
    pub(super) text: String,
}

/// Parses one definition file's text into a flat dotted-key table.
///
/// The parser is recursive: `!include` and `!create ... from file:path` load
/// other files through [`include::load_sub_definition`], which builds a whole
/// sub-definition with its own parser. The include stack is threaded through
/// explicitly so cycle detection never relies on shared state.
pub(super) struct Parser<'a> {
    pub(super) file: &'a str,
    pub(super) base_dir: Option<PathBuf>,
    pub(super) options: &'a DefinitionBuilder,
    pub(super) stack: &'a mut IncludeStack,
    pub(super) lines: Vec<Line>,
    pub(super) table: BTreeMap<String, String>,
}

impl<'a> Parser<'a> {
    pub(super) fn new(
        file: &'a str,
        base_dir: Option<PathBuf>,
        options: &'a DefinitionBuilder,
        stack: &'a mut IncludeStack,
        text: &str,
    ) -> Self {
        Self {
            file,
            base_dir,
            options,
            stack,
            lines: preprocess(text),
            table: BTreeMap::new(),
        }
    }

    pub(super) fn parse(mut self) -> Result<BTreeMap<String, String>, Error> {
        self.parse_dictionary(0, "", false)?;
        Ok(self.table)
    }

    /// Parses the contents of one dictionary, starting at line index `start`.
    ///
    /// Returns the index of the line holding the dictionary's closing `}`
    /// (or the line count when the root dictionary runs to end of input).
    /// `overwrite` is only true inside the literal body of a derived
    /// dictionary, where templated values may be overridden.
    pub(super) fn parse_dictionary(
        &mut self,
        start: usize,
        prefix: &str,
        overwrite: bool,
    ) -> Result<usize, Error> {
        let mut i = start;

        while i < self.lines.len() {
            let Line { number, text } = self.lines[i].clone();
            let first = text.split_whitespace().next().unwrap_or("");

            if first == "!create" {
                i = self.parse_derived(i, prefix)?;
            } else if first == "!include" {
                // Everything after the keyword is the path; it may contain
                // spaces.
                let target = text[first.len()..].trim();
                if target.is_empty() {
                    return Err(self.malformed(number, &text));
                }
                let sub = include::load_sub_definition(
                    target,
                    self.file,
                    self.base_dir.as_deref(),
                    self.options,
                    self.stack,
                )?;
                for (sub_key, value) in sub.into_table() {
                    self.insert(qualify(prefix, &sub_key), value, overwrite, number)?;
                }
            } else if let Some(name) = text.strip_suffix('{') {
                let name = name.trim();
                if name.is_empty() {
                    return Err(self.malformed(number, &text));
                }
                i = self.parse_dictionary(i + 1, &qualify(prefix, name), overwrite)?;
            } else if text == "}" {
                if prefix.is_empty() {
                    return Err(self.malformed(number, &text));
                }
                return Ok(i);
            } else if text.split_whitespace().nth(1).is_some() {
                let value = text.split_whitespace().skip(1).collect::<Vec<_>>().join(" ");
                self.insert(qualify(prefix, first), value, overwrite, number)?;
            } else {
                return Err(self.malformed(number, &text));
            }

            i += 1;
        }

        if prefix.is_empty() {
            Ok(self.lines.len())
        } else {
            Err(Error::UnclosedDictionary {
                file: self.file.to_string(),
                name: prefix.to_string(),
            })
        }
    }

    pub(super) fn insert(
        &mut self,
        key: String,
        value: String,
        overwrite: bool,
        line: usize,
    ) -> Result<(), Error> {
        if !overwrite && self.table.contains_key(&key) {
            return Err(Error::DuplicateKey {
                file: self.file.to_string(),
                line,
                key,
            });
        }
        self.table.insert(key, value);
        Ok(())
    }

    pub(super) fn malformed(&self, line: usize, content: &str) -> Error {
        Error::MalformedLine {
            file: self.file.to_string(),
            line,
            content: content.to_string(),
        }
    }
}

/// Strips comments and blank lines, keeping original line numbers.
fn preprocess(text: &str) -> Vec<Line> {
    text.lines()
        .enumerate()
        .filter_map(|(index, raw)| {
            let stripped = strip_comment(raw);
            let trimmed = stripped.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(Line {
                    number: index + 1,
                    text: trimmed.to_string(),
                })
            }
        })
        .collect()
}

/// Cuts the line at the first unescaped `#`; `\#` becomes a literal `#`.
fn strip_comment(line: &str) -> String {
    let mut result = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\\' && chars.peek() == Some(&'#') {
            chars.next();
            result.push('#');
        } else if ch == '#' {
            break;
        } else {
            result.push(ch);
        }
    }

    result
}

/// Joins a dictionary prefix and a name with a dot; bare name at root.
pub(super) fn qualify(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// Splits a line into whitespace-separated tokens, with single or double
/// quotes grouping words. The quotes themselves are not part of the token.
pub(super) fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => current.push(ch),
            None if ch == '\'' || ch == '"' => {
                quote = Some(ch);
                in_token = true;
            }
            None if ch.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(ch);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_text(text: &str) -> Result<BTreeMap<String, String>, Error> {
        let options = DefinitionBuilder::default();
        let mut stack = IncludeStack::new();
        Parser::new("test.simdef", None, &options, &mut stack, text).parse()
    }

    #[test]
    fn test_parses_nested_dictionaries() {
        let table = parse_text(
            "SimControl {\n\
             \ttimeStep 0.01\n\
             \tTimeStepAdaptation {\n\
             \t\tcontroller PID\n\
             \t}\n\
             }\n\
             rootKey rootValue\n",
        )
        .unwrap();

        assert_eq!(table["SimControl.timeStep"], "0.01");
        assert_eq!(table["SimControl.TimeStepAdaptation.controller"], "PID");
        assert_eq!(table["rootKey"], "rootValue");
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_value_tokens_rejoined_with_single_spaces() {
        let table = parse_text("plot   Position    Velocity\tFlightAnimation\n").unwrap();
        assert_eq!(table["plot"], "Position Velocity FlightAnimation");
    }

    #[test]
    fn test_comments_and_blank_lines_are_ignored() {
        let table = parse_text(
            "# full-line comment\n\
             \n\
             Rocket { # trailing comment\n\
             \tname Falcon # another\n\
             }\n",
        )
        .unwrap();
        assert_eq!(table["Rocket.name"], "Falcon");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_escaped_hash_is_literal() {
        let table = parse_text("label value\\#1 # comment\n").unwrap();
        assert_eq!(table["label"], "value#1");
    }

    #[test]
    fn test_duplicate_key_reports_original_line_number() {
        let err = parse_text(
            "# header comment\n\
             \n\
             Rocket {\n\
             \tname A\n\
             \tname B\n\
             }\n",
        )
        .unwrap_err();
        assert!(
            matches!(err, Error::DuplicateKey { line: 5, ref key, .. } if key == "Rocket.name"),
            "{err}"
        );
    }

    #[test]
    fn test_malformed_line_reports_content() {
        let err = parse_text("Rocket {\n\tjustonetoken\n}\n").unwrap_err();
        assert!(
            matches!(err, Error::MalformedLine { line: 2, ref content, .. } if content == "justonetoken"),
            "{err}"
        );
    }

    #[test]
    fn test_bare_open_brace_is_malformed() {
        let err = parse_text("{\n}\n").unwrap_err();
        assert!(matches!(err, Error::MalformedLine { line: 1, .. }));
    }

    #[test]
    fn test_close_brace_at_root_is_malformed() {
        let err = parse_text("key value\n}\n").unwrap_err();
        assert!(matches!(err, Error::MalformedLine { line: 2, .. }));
    }

    #[test]
    fn test_unclosed_dictionary() {
        let err = parse_text("Rocket {\n\tname A\n").unwrap_err();
        assert!(
            matches!(err, Error::UnclosedDictionary { ref name, .. } if name == "Rocket"),
            "{err}"
        );
    }

    #[test]
    fn test_include_without_argument_is_malformed() {
        let err = parse_text("!include\n").unwrap_err();
        assert!(matches!(err, Error::MalformedLine { line: 1, .. }));
    }

    #[test]
    fn test_crlf_input() {
        let table = parse_text("Rocket {\r\n\tname A\r\n}\r\n").unwrap();
        assert_eq!(table["Rocket.name"], "A");
    }

    #[test]
    fn test_tokenize_quotes() {
        assert_eq!(
            tokenize("!replace \"Stage 1\" 'Stage 2'"),
            vec!["!replace", "Stage 1", "Stage 2"]
        );
        assert_eq!(tokenize("  a  b "), vec!["a", "b"]);
        assert_eq!(tokenize("a\"b\"c"), vec!["abc"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_strip_comment() {
        assert_eq!(strip_comment("key value # comment"), "key value ");
        assert_eq!(strip_comment("key \\#tag # real"), "key #tag ");
        assert_eq!(strip_comment("no comment"), "no comment");
    }
}
