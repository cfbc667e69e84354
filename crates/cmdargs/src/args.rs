//! Token classification.
//!
//! One left-to-right pass with a single token of lookahead:
//! - `-abc` (one hyphen, two or more letters) is a group of flags `a`, `b`, `c`
//! - any other `-name` / `--name` is a named option, taking the next token as
//!   its value unless that token starts with `-`
//! - everything else is a positional command

use indexmap::IndexMap;

use crate::value::{RawValue, Value, parse_value, trim};

/// Accumulated state of one scan over the tokens.
#[derive(Debug, Default)]
pub struct Classifier {
    command: Option<String>,
    commands: Vec<String>,
    flags: Vec<String>,
    options: IndexMap<String, Value>,
}

/// Output of [`Classifier::scan`].
#[derive(Debug, Default)]
pub struct Classified {
    pub command: Option<String>,
    pub commands: Vec<String>,
    pub flags: Vec<String>,
    pub options: IndexMap<String, Value>,
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify every token. Never fails.
    pub fn scan<S: AsRef<str>>(mut self, tokens: &[S]) -> Classified {
        let mut i = 0;
        while i < tokens.len() {
            let token = trim(tokens[i].as_ref());
            i += 1;

            if is_flag_group(token) {
                self.push_flag_group(token);
                continue;
            }

            if token.starts_with('-') {
                let next = tokens.get(i).map(|t| t.as_ref());
                if self.push_option(token, next) {
                    i += 1;
                }
                continue;
            }

            self.push_command(token);
        }

        Classified {
            command: self.command,
            commands: self.commands,
            flags: self.flags,
            options: self.options,
        }
    }

    fn push_flag_group(&mut self, token: &str) {
        tracing::trace!(token, "flag group");
        self.flags.extend(token[1..].chars().map(|c| c.to_string()));
    }

    /// Record a named option. Returns whether `next` was consumed as its value.
    fn push_option(&mut self, token: &str, next: Option<&str>) -> bool {
        let (name, long) = match token.strip_prefix("--") {
            Some(name) => (name, true),
            None => (&token[1..], false),
        };

        let value = match next {
            Some(next) if !next.starts_with('-') => Some(trim(next)),
            _ => None,
        };

        let raw = match value {
            Some(text) => RawValue::Text(text),
            None => {
                // A valueless short option is also a flag.
                if !long {
                    self.flags.push(name.to_string());
                }
                RawValue::Switch
            }
        };

        tracing::trace!(name, long, raw = ?raw, "named option");
        self.options.insert(name.to_string(), parse_value(raw));
        value.is_some()
    }

    fn push_command(&mut self, token: &str) {
        tracing::trace!(token, "positional");
        if self.command.is_none() {
            self.command = Some(token.to_string());
        }
        self.commands.push(token.to_string());
    }
}

/// `-` followed by at least two ASCII letters and nothing else.
fn is_flag_group(token: &str) -> bool {
    match token.strip_prefix('-') {
        Some(rest) => rest.len() >= 2 && rest.bytes().all(|b| b.is_ascii_alphabetic()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(tokens: &[&str]) -> Classified {
        Classifier::new().scan(tokens)
    }

    #[test]
    fn flag_group_splits_letters() {
        let out = scan(&["-tlRv"]);
        assert_eq!(out.flags, ["t", "l", "R", "v"]);
        assert!(out.options.is_empty());
    }

    #[test]
    fn flag_group_wins_over_named_option() {
        let out = scan(&["-tpf", "value"]);
        assert_eq!(out.flags, ["t", "p", "f"]);
        assert!(out.options.is_empty());
        assert_eq!(out.command.as_deref(), Some("value"));
    }

    #[test]
    fn single_letter_takes_value() {
        let out = scan(&["-t", "01"]);
        assert!(out.flags.is_empty());
        assert_eq!(out.options["t"], Value::Text("01".into()));
    }

    #[test]
    fn non_letter_group_is_named_option() {
        let out = scan(&["-t1", "x"]);
        assert!(out.flags.is_empty());
        assert_eq!(out.options["t1"], Value::Text("x".into()));
    }

    #[test]
    fn bare_short_option_is_also_flag() {
        let out = scan(&["-q", "-l"]);
        assert_eq!(out.flags, ["q", "l"]);
        assert_eq!(out.options["q"], Value::Bool(true));
        assert_eq!(out.options["l"], Value::Bool(true));
    }

    #[test]
    fn bare_long_option_is_not_flag() {
        let out = scan(&["--verbose", "--dry-run"]);
        assert!(out.flags.is_empty());
        assert_eq!(out.options["verbose"], Value::Bool(true));
        assert_eq!(out.options["dry-run"], Value::Bool(true));
    }

    #[test]
    fn long_option_value_is_trimmed() {
        let out = scan(&["--name", "  rodger  "]);
        assert_eq!(out.options["name"], Value::Text("rodger".into()));
    }

    #[test]
    fn lookahead_uses_untrimmed_token() {
        let out = scan(&["--offset", " -5"]);
        assert_eq!(out.options["offset"], Value::Text("-5".into()));
    }

    #[test]
    fn later_option_overwrites_in_place() {
        let out = scan(&["--a", "1", "--b", "2", "--a", "3"]);
        let keys: Vec<&str> = out.options.keys().map(String::as_str).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(out.options["a"], Value::Text("3".into()));
    }

    #[test]
    fn positionals_keep_order_and_duplicates() {
        let out = scan(&["build", "--x", "1", "run", "build"]);
        assert_eq!(out.command.as_deref(), Some("build"));
        assert_eq!(out.commands, ["build", "run", "build"]);
    }

    #[test]
    fn empty_first_positional_is_the_command() {
        let out = scan(&["  ", "next"]);
        assert_eq!(out.command.as_deref(), Some(""));
        assert_eq!(out.commands, ["", "next"]);
    }

    #[test]
    fn lone_hyphens_are_empty_named_options() {
        let out = scan(&["--", "-"]);
        assert_eq!(out.flags, [""]);
        assert_eq!(out.options[""], Value::Bool(true));
        assert_eq!(out.options.len(), 1);
    }

    #[test]
    fn tokens_lose_byte_order_marks() {
        let out = scan(&["\u{feff}run", "--name", "\u{feff}x\u{feff}"]);
        assert_eq!(out.command.as_deref(), Some("run"));
        assert_eq!(out.options["name"], Value::Text("x".into()));
    }

    #[test]
    fn triple_hyphen_keeps_one() {
        let out = scan(&["---x", "v"]);
        assert_eq!(out.options["-x"], Value::Text("v".into()));
    }

    #[test]
    fn flag_group_pattern() {
        assert!(is_flag_group("-ab"));
        assert!(!is_flag_group("-a"));
        assert!(!is_flag_group("--ab"));
        assert!(!is_flag_group("-a_b"));
        assert!(!is_flag_group("ab"));
    }
}
