//! The frozen result of parsing one argument vector, and its JSON form.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};

use crate::args::{Classified, Classifier};
use crate::value::Value;

/// The classified form of one argument vector.
///
/// Built once by [`ParsedResult::parse`]; there are no mutators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedResult {
    executable: Option<String>,
    script: Option<String>,
    tokens: Vec<String>,
    command: Option<String>,
    commands: Vec<String>,
    flags: Vec<String>,
    options: IndexMap<String, Value>,
}

impl ParsedResult {
    /// Parse a full argument vector: executable, script, then the tokens.
    pub fn parse<S: AsRef<str>>(argv: &[S]) -> Self {
        let executable = argv.first().map(|s| s.as_ref().to_string());
        let script = argv.get(1).map(|s| s.as_ref().to_string());
        let rest = argv.get(2..).unwrap_or_default();

        let Classified {
            command,
            commands,
            flags,
            options,
        } = Classifier::new().scan(rest);

        tracing::debug!(
            tokens = rest.len(),
            commands = commands.len(),
            flags = flags.len(),
            options = options.len(),
            "parsed argv"
        );

        Self {
            executable,
            script,
            tokens: rest.iter().map(|t| t.as_ref().to_string()).collect(),
            command,
            commands,
            flags,
            options,
        }
    }

    /// Parse the arguments of the current process.
    pub fn from_env() -> Self {
        let argv: Vec<String> = std::env::args().collect();
        Self::parse(&argv)
    }

    pub fn executable(&self) -> Option<&str> {
        self.executable.as_deref()
    }

    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    /// The tokens after executable and script, as given.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// The first positional token.
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.iter().any(|f| f == name)
    }

    pub fn options(&self) -> &IndexMap<String, Value> {
        &self.options
    }

    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options.get(name)
    }
}

/// Options with `undefined` values dropped, the way a JSON encoder drops
/// undefined properties.
struct DefinedOptions<'a>(&'a IndexMap<String, Value>);

impl Serialize for DefinedOptions<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (name, value) in self.0 {
            if !value.is_undefined() {
                map.serialize_entry(name, value)?;
            }
        }
        map.end()
    }
}

impl Serialize for ParsedResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ParsedResult", 7)?;
        match &self.executable {
            Some(v) => s.serialize_field("_executable", v)?,
            None => s.skip_field("_executable")?,
        }
        match &self.script {
            Some(v) => s.serialize_field("_script", v)?,
            None => s.skip_field("_script")?,
        }
        s.serialize_field("command", &self.command)?;
        s.serialize_field("commands", &self.commands)?;
        s.serialize_field("tokens", &self.tokens)?;
        s.serialize_field("flags", &self.flags)?;
        s.serialize_field("options", &DefinedOptions(&self.options))?;
        s.end()
    }
}
