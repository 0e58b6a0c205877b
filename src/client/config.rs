//! Client configuration.
//!
//! [`ClientOptions`] is the loose caller-facing input; [`ClientConfig`] is the
//! validated, immutable result. Validation never stops at the first problem:
//! every violation is collected into one [`ConfigError`].

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::core::{DEFAULT_HOST_PORT, DEFAULT_RETRIES, DEFAULT_TIMEOUT, Secret};
use crate::transport::AttemptTarget;

/// One violated constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    /// Option name, with an index for list entries (`dictionaries[1]`).
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every problem found in a set of client options.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid client options: {}", render(.issues))]
pub struct ConfigError {
    /// All violations, in option order.
    pub issues: Vec<ConfigIssue>,
}

impl ConfigError {
    /// Whether any issue concerns `field`.
    pub fn mentions(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }
}

fn render(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Default)]
struct Issues(Vec<ConfigIssue>);

impl Issues {
    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(ConfigIssue {
            field: field.into(),
            message: message.into(),
        });
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, ConfigError> {
        if self.0.is_empty() {
            Ok(value())
        } else {
            Err(ConfigError { issues: self.0 })
        }
    }
}

/// Unvalidated client options.
///
/// Numbers are wide and signed so that out-of-range input is reported
/// rather than rejected by the type system. `timeout` is in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientOptions {
    /// Server host name or address.
    pub host: Option<String>,
    /// Server port (default 1812).
    pub host_port: Option<i64>,
    /// Fixed local port (default: ephemeral per attempt).
    pub local_port: Option<i64>,
    /// Per-attempt timeout in milliseconds (default 2500).
    pub timeout: Option<f64>,
    /// Retries after the first attempt (default 3).
    pub retries: Option<i64>,
    /// Dictionaries to register; `None` and blank entries are skipped.
    pub dictionaries: Vec<Option<String>>,
    /// Shared secret.
    pub secret: Option<String>,
}

impl ClientOptions {
    /// Options with the two required fields set.
    pub fn new(host: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            secret: Some(secret.into()),
            ..Self::default()
        }
    }

    /// Set the server port.
    pub fn host_port(mut self, port: u16) -> Self {
        self.host_port = Some(i64::from(port));
        self
    }

    /// Pin the local port instead of picking an ephemeral one per attempt.
    pub fn local_port(mut self, port: u16) -> Self {
        self.local_port = Some(i64::from(port));
        self
    }

    /// Set the per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout.as_secs_f64() * 1000.0);
        self
    }

    /// Set the retry count.
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(i64::from(retries));
        self
    }

    /// Add a dictionary to register.
    pub fn dictionary(mut self, name: impl Into<String>) -> Self {
        self.dictionaries.push(Some(name.into()));
        self
    }

    /// Validate into a [`ClientConfig`].
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        ClientConfig::try_from(self)
    }
}

/// Validated, immutable client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    host: String,
    host_port: u16,
    local_port: Option<u16>,
    timeout: Duration,
    retries: u32,
    secret: Secret,
    dictionaries: Vec<String>,
}

impl ClientConfig {
    /// Validate loosely typed input, such as parsed JSON.
    ///
    /// Type mismatches and constraint violations are reported together.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let mut issues = Issues::default();
        let Some(object) = value.as_object() else {
            issues.push("options", "expected an object");
            return Err(ConfigError { issues: issues.0 });
        };

        let options = ClientOptions {
            host: string_field(object, "host", &mut issues),
            host_port: integer_field(object, "hostPort", &mut issues),
            local_port: integer_field(object, "localPort", &mut issues),
            timeout: number_field(object, "timeout", &mut issues),
            retries: integer_field(object, "retries", &mut issues),
            dictionaries: dictionaries_field(object, &mut issues),
            secret: string_field(object, "secret", &mut issues),
        };
        validate(options, issues)
    }

    /// Server host, trimmed.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Server port.
    pub fn host_port(&self) -> u16 {
        self.host_port
    }

    /// Fixed local port, if any.
    pub fn local_port(&self) -> Option<u16> {
        self.local_port
    }

    /// Per-attempt timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Retries after the first attempt.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Shared secret.
    pub fn secret(&self) -> &Secret {
        &self.secret
    }

    /// Dictionaries to register, blanks removed.
    pub fn dictionaries(&self) -> &[String] {
        &self.dictionaries
    }

    /// Attempt parameters derived from this configuration.
    pub fn attempt_target(&self) -> AttemptTarget<'_> {
        AttemptTarget {
            host: &self.host,
            port: self.host_port,
            local_port: self.local_port,
            timeout: self.timeout,
        }
    }
}

impl TryFrom<ClientOptions> for ClientConfig {
    type Error = ConfigError;

    fn try_from(options: ClientOptions) -> Result<Self, Self::Error> {
        validate(options, Issues::default())
    }
}

fn validate(options: ClientOptions, mut issues: Issues) -> Result<ClientConfig, ConfigError> {
    let host = match options.host.as_deref().map(str::trim) {
        Some("") => {
            issues.push("host", "must not be empty");
            String::new()
        }
        Some(host) => host.to_string(),
        None => {
            if !issues.0.iter().any(|i| i.field == "host") {
                issues.push("host", "is required");
            }
            String::new()
        }
    };

    let host_port = port(options.host_port, "hostPort", &mut issues).unwrap_or(DEFAULT_HOST_PORT);
    let local_port = port(options.local_port, "localPort", &mut issues);

    let timeout = match options.timeout {
        None => DEFAULT_TIMEOUT,
        Some(ms) if !ms.is_finite() => {
            issues.push("timeout", "must be a finite number of milliseconds");
            DEFAULT_TIMEOUT
        }
        Some(ms) if ms < 0.0 => {
            issues.push("timeout", "must be greater than or equal to 0");
            DEFAULT_TIMEOUT
        }
        Some(ms) => Duration::try_from_secs_f64(ms / 1000.0).unwrap_or_else(|_| {
            issues.push(
                "timeout",
                format!("must be at most {} milliseconds", Duration::MAX.as_millis()),
            );
            DEFAULT_TIMEOUT
        }),
    };

    let retries = match options.retries {
        None => DEFAULT_RETRIES,
        Some(n) if n < 0 => {
            issues.push("retries", "must be greater than or equal to 0");
            DEFAULT_RETRIES
        }
        Some(n) => u32::try_from(n).unwrap_or_else(|_| {
            issues.push("retries", format!("must be at most {}", u32::MAX));
            DEFAULT_RETRIES
        }),
    };

    let secret = match options.secret {
        Some(secret) if secret.is_empty() => {
            issues.push("secret", "must not be empty");
            Secret::new(Vec::new())
        }
        Some(secret) => Secret::from(secret),
        None => {
            if !issues.0.iter().any(|i| i.field == "secret") {
                issues.push("secret", "is required");
            }
            Secret::new(Vec::new())
        }
    };

    let dictionaries = options
        .dictionaries
        .into_iter()
        .flatten()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    issues.finish(|| ClientConfig {
        host,
        host_port,
        local_port,
        timeout,
        retries,
        secret,
        dictionaries,
    })
}

fn port(value: Option<i64>, field: &str, issues: &mut Issues) -> Option<u16> {
    let value = value?;
    if value < 0 {
        issues.push(field, "must be greater than or equal to 0");
        return None;
    }
    match u16::try_from(value) {
        Ok(port) => Some(port),
        Err(_) => {
            issues.push(field, format!("must be at most {}", u16::MAX));
            None
        }
    }
}

fn present<'a>(object: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    object.get(field).filter(|v| !v.is_null())
}

fn string_field(object: &Map<String, Value>, field: &str, issues: &mut Issues) -> Option<String> {
    match present(object, field)? {
        Value::String(s) => Some(s.clone()),
        other => {
            issues.push(field, format!("expected a string, got {}", kind(other)));
            None
        }
    }
}

fn number_field(object: &Map<String, Value>, field: &str, issues: &mut Issues) -> Option<f64> {
    match present(object, field)? {
        Value::Number(n) => n.as_f64(),
        other => {
            issues.push(field, format!("expected a number, got {}", kind(other)));
            None
        }
    }
}

fn integer_field(object: &Map<String, Value>, field: &str, issues: &mut Issues) -> Option<i64> {
    match present(object, field)? {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i)
            } else if n.as_u64().is_some() {
                // Above i64::MAX; let the range checks report it.
                Some(i64::MAX)
            } else {
                issues.push(field, "must be an integer");
                None
            }
        }
        other => {
            issues.push(field, format!("expected a number, got {}", kind(other)));
            None
        }
    }
}

fn dictionaries_field(object: &Map<String, Value>, issues: &mut Issues) -> Vec<Option<String>> {
    let Some(value) = present(object, "dictionaries") else {
        return Vec::new();
    };
    let Value::Array(entries) = value else {
        issues.push("dictionaries", format!("expected an array, got {}", kind(value)));
        return Vec::new();
    };
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| match entry {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => {
                issues.push(
                    format!("dictionaries[{i}]"),
                    format!("expected a string, got {}", kind(other)),
                );
                None
            }
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
