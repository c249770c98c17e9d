//! Host Bridge Protocol
//!
//! Commands travel to the host as a single evaluable expression string and
//! come back as a single string. Inside the crate both sides are typed:
//! [`Command`] on the way in, [`HostResult`] on the way out. The legacy
//! string forms exist only at the scripting interop edge.
//!
//! Wire format of a result: an empty string or free text is a success; any
//! string starting with [`SENTINEL`] is a failure whose remainder is the
//! diagnostic text.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::error::{EncodeError, EncodeResult};

/// Prefix reserved for failure results.
pub const SENTINEL: &str = "ERROR:";

/// Result of evaluating one command in the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum HostResult {
    /// Empty or informational payload.
    Success(String),
    /// Human-readable diagnostic, without the sentinel.
    Failure(String),
}

impl HostResult {
    pub fn success(payload: impl Into<String>) -> Self {
        HostResult::Success(payload.into())
    }

    pub fn empty() -> Self {
        HostResult::Success(String::new())
    }

    pub fn failure(message: impl Into<String>) -> Self {
        HostResult::Failure(message.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, HostResult::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, HostResult::Failure(_))
    }

    /// Payload for successes, diagnostic for failures.
    pub fn text(&self) -> &str {
        match self {
            HostResult::Success(text) | HostResult::Failure(text) => text,
        }
    }

    /// Decodes a raw host string.
    pub fn from_wire(raw: &str) -> Self {
        match raw.strip_prefix(SENTINEL) {
            Some(rest) => HostResult::Failure(rest.strip_prefix(' ').unwrap_or(rest).to_string()),
            None => HostResult::Success(raw.to_string()),
        }
    }

    /// Encodes into the raw host string.
    ///
    /// A success payload that happens to begin with the sentinel breaks the
    /// host contract; it is still emitted verbatim and will decode as a
    /// failure on the other side.
    pub fn to_wire(&self) -> String {
        match self {
            HostResult::Success(payload) => payload.clone(),
            HostResult::Failure(message) => format!("{} {}", SENTINEL, message),
        }
    }

    pub fn into_result(self) -> Result<String, String> {
        match self {
            HostResult::Success(payload) => Ok(payload),
            HostResult::Failure(message) => Err(message),
        }
    }
}

impl From<Result<String, String>> for HostResult {
    fn from(result: Result<String, String>) -> Self {
        match result {
            Ok(payload) => HostResult::Success(payload),
            Err(message) => HostResult::Failure(message),
        }
    }
}

impl fmt::Display for HostResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_wire())
    }
}

/// Escapes a value for embedding inside a double-quoted literal.
///
/// Backslashes go first so the escapes inserted afterwards are not
/// themselves re-escaped.
pub fn escape_literal(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\r', "\\r")
        .replace('\n', "\\n")
}

/// Inverse of [`escape_literal`].
///
/// Returns `None` when the input contains an escape sequence that
/// [`escape_literal`] never produces, or an unescaped quote.
pub fn decode_literal(escaped: &str) -> Option<String> {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next()? {
                '\\' => out.push('\\'),
                '"' => out.push('"'),
                'r' => out.push('\r'),
                'n' => out.push('\n'),
                _ => return None,
            },
            '"' | '\r' | '\n' => return None,
            other => out.push(other),
        }
    }
    Some(out)
}

/// Converts every backslash to a forward slash and trims surrounding
/// whitespace.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/").trim().to_string()
}

/// A command name is one identifier or a dotted path of identifiers,
/// e.g. `TMSRunner_runFile` or `KitchenSink.hello`.
pub fn is_valid_command_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => chars
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$'),
                _ => false,
            }
        })
}

/// One host invocation: a function name plus string arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: String,
    args: Vec<String>,
}

impl Command {
    /// Fails on an empty or non-identifier name, before any host interaction.
    pub fn new(name: impl Into<String>) -> EncodeResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(EncodeError::EmptyName);
        }
        if !is_valid_command_name(&name) {
            return Err(EncodeError::InvalidName(name));
        }
        Ok(Self {
            name,
            args: Vec::new(),
        })
    }

    /// Adds a plain string argument.
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Adds a path argument, normalized before escaping. An empty path
    /// after normalization is an input error.
    pub fn path_arg(mut self, path: &str) -> EncodeResult<Self> {
        let normalized = normalize_path(path);
        if normalized.is_empty() {
            return Err(EncodeError::EmptyPath);
        }
        self.args.push(normalized);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Builds `name("arg1","arg2")`.
    pub fn to_expression(&self) -> String {
        let args = self
            .args
            .iter()
            .map(|arg| format!("\"{}\"", escape_literal(arg)))
            .collect::<Vec<_>>()
            .join(",");
        format!("{}({})", self.name, args)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_expression())
    }
}
