//! Schema-less command-line parsing.
//!
//! Turns a raw argument vector into a [`ParsedResult`] without any declared
//! arguments:
//! - `-abc` is the flag group `a`, `b`, `c`
//! - `-n value` / `--name value` are named options, `--name` alone is `true`
//! - everything else is a positional command
//!
//! Option values are typed by [`value::parse_value`]: `true`/`false`/`null`/
//! `undefined` literals, paths, plain text, or flat `name:value,name` maps.
//!
//! ```
//! use cmdargs::{ParsedResult, Value};
//!
//! let parsed = ParsedResult::parse(&["node", "app.js", "serve", "-v", "--port", "8080"]);
//! assert_eq!(parsed.command(), Some("serve"));
//! assert_eq!(parsed.flags(), ["v"]);
//! assert_eq!(parsed.option("port"), Some(&Value::Text("8080".into())));
//! ```

pub mod args;
pub mod result;
pub mod value;

pub use result::ParsedResult;
pub use value::{RawValue, RecordMap, SubValue, Value, parse_value};

/// Parse a full argument vector (executable, script, tokens...).
pub fn parse<S: AsRef<str>>(argv: &[S]) -> ParsedResult {
    ParsedResult::parse(argv)
}
