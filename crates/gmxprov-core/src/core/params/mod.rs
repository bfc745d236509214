//! Typed command-line parameters for the wrapped GROMACS tools.
//!
//! Every tool declares an explicit flag whitelist ([`ToolSchema`]). A
//! [`Parameters`] value can only be built from keys on that whitelist, has
//! defaults applied and required flags checked at construction, and is
//! immutable afterwards. Rendering it to tokens is pure: the same parameters
//! and the same staged filenames always produce the same command line.

pub mod schema;
pub mod tools;

use schema::{FlagRole, FlagSpec, ToolSchema, ValueKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error;

pub use schema::ChainRoles;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParamError {
    #[error("Unknown flag '-{flag}' for gmx {tool}")]
    UnknownFlag { tool: &'static str, flag: String },

    #[error("Missing required flag '-{flag}' for gmx {tool}")]
    MissingRequired { tool: &'static str, flag: &'static str },

    #[error("Invalid value for '-{flag}': {reason}")]
    InvalidValue { flag: String, reason: String },
}

/// A single flag value as supplied by a launcher or a configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Switch(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<ParamValue>),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Switch(b) => write!(f, "{}", if *b { "yes" } else { "no" }),
            ParamValue::Integer(i) => write!(f, "{}", i),
            ParamValue::Float(x) => write!(f, "{}", x),
            ParamValue::Text(s) => f.write_str(s),
            ParamValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Text(s)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Switch(b)
    }
}

impl From<i64> for ParamValue {
    fn from(i: i64) -> Self {
        ParamValue::Integer(i)
    }
}

impl From<f64> for ParamValue {
    fn from(x: f64) -> Self {
        ParamValue::Float(x)
    }
}

/// Validated, immutable parameters for one tool invocation.
#[derive(Debug, Clone)]
pub struct Parameters {
    schema: &'static ToolSchema,
    values: BTreeMap<&'static str, ParamValue>,
}

impl Parameters {
    /// Validates `config` against the tool's whitelist, normalizes values to
    /// the declared kind, applies schema defaults and checks required flags.
    pub fn new<K, I>(schema: &'static ToolSchema, config: I) -> Result<Self, ParamError>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, ParamValue)>,
    {
        let mut values = BTreeMap::new();
        for (key, value) in config {
            let key = key.as_ref();
            let spec = schema.flag(key).ok_or_else(|| ParamError::UnknownFlag {
                tool: schema.name,
                flag: key.to_string(),
            })?;
            values.insert(spec.name, normalize(spec, value)?);
        }

        for spec in schema.flags {
            if values.contains_key(spec.name) {
                continue;
            }
            if let Some(default) = spec.default {
                values.insert(spec.name, normalize(spec, ParamValue::from(default))?);
            } else if spec.required {
                return Err(ParamError::MissingRequired {
                    tool: schema.name,
                    flag: spec.name,
                });
            }
        }

        Ok(Self { schema, values })
    }

    pub fn schema(&self) -> &'static ToolSchema {
        self.schema
    }

    pub fn get(&self, flag: &str) -> Option<&ParamValue> {
        self.values.get(flag)
    }

    pub fn contains(&self, flag: &str) -> bool {
        self.values.contains_key(flag)
    }

    /// Input-file flags that are present, in schema order, with their source paths.
    pub fn input_files(&self) -> impl Iterator<Item = (&'static FlagSpec, String)> + '_ {
        self.schema
            .inputs()
            .filter_map(|spec| self.values.get(spec.name).map(|v| (spec, v.to_string())))
    }

    /// Output-file flags that are present, in schema order, with their filenames.
    pub fn output_files(&self) -> impl Iterator<Item = (&'static FlagSpec, String)> + '_ {
        self.schema
            .outputs()
            .filter_map(|spec| self.values.get(spec.name).map(|v| (spec, v.to_string())))
    }

    /// Renders the argument vector: subcommand, then input-file flags, plain
    /// options and output-file flags, each group in schema order.
    ///
    /// `staged_names` maps input roles to the filename staged in the working
    /// directory; an input flag with an entry there renders that name instead
    /// of the configured source path.
    pub fn render(&self, staged_names: &HashMap<String, String>) -> Vec<String> {
        let mut tokens = vec![self.schema.name.to_string()];
        let groups = [
            self.schema.inputs().collect::<Vec<_>>(),
            self.schema.options().collect(),
            self.schema.outputs().collect(),
        ];
        for spec in groups.iter().flatten() {
            let Some(value) = self.values.get(spec.name) else {
                continue;
            };
            match (spec.role, value) {
                (FlagRole::Input(role), _) => {
                    tokens.push(format!("-{}", spec.name));
                    tokens.push(
                        staged_names
                            .get(role)
                            .cloned()
                            .unwrap_or_else(|| value.to_string()),
                    );
                }
                (_, ParamValue::Switch(true)) => tokens.push(format!("-{}", spec.name)),
                (_, ParamValue::Switch(false)) => tokens.push(format!("-no{}", spec.name)),
                (_, ParamValue::List(items)) => {
                    tokens.push(format!("-{}", spec.name));
                    tokens.extend(items.iter().map(ToString::to_string));
                }
                (_, other) => {
                    tokens.push(format!("-{}", spec.name));
                    tokens.push(other.to_string());
                }
            }
        }
        tokens
    }
}

fn normalize(spec: &FlagSpec, value: ParamValue) -> Result<ParamValue, ParamError> {
    let invalid = |reason: &str| ParamError::InvalidValue {
        flag: spec.name.to_string(),
        reason: reason.to_string(),
    };

    match spec.kind {
        ValueKind::Switch => match value {
            ParamValue::Switch(b) => Ok(ParamValue::Switch(b)),
            ParamValue::Integer(1) => Ok(ParamValue::Switch(true)),
            ParamValue::Integer(0) => Ok(ParamValue::Switch(false)),
            ParamValue::Text(s) => parse_switch(&s)
                .map(ParamValue::Switch)
                .ok_or_else(|| invalid(&format!("'{}' is not a yes/no value", s))),
            _ => Err(invalid("expected a yes/no switch")),
        },
        ValueKind::Single => match value {
            ParamValue::Switch(_) => Err(invalid("expected a value, got a switch")),
            ParamValue::List(_) => Err(invalid("expected a single value, got a list")),
            ParamValue::Text(s) if s.trim().is_empty() => Err(invalid("value is empty")),
            other => Ok(other),
        },
        ValueKind::Vector => match value {
            ParamValue::Text(s) => {
                let items: Vec<ParamValue> = s
                    .split(|c: char| c.is_whitespace() || c == ',')
                    .filter(|part| !part.is_empty())
                    .map(ParamValue::from)
                    .collect();
                if items.is_empty() {
                    Err(invalid("vector is empty"))
                } else {
                    Ok(ParamValue::List(items))
                }
            }
            ParamValue::List(items) if items.is_empty() => Err(invalid("vector is empty")),
            ParamValue::List(items) => {
                if items
                    .iter()
                    .any(|i| matches!(i, ParamValue::List(_) | ParamValue::Switch(_)))
                {
                    Err(invalid("vector components must be scalars"))
                } else {
                    Ok(ParamValue::List(items))
                }
            }
            ParamValue::Switch(_) => Err(invalid("expected a vector, got a switch")),
            scalar => Ok(ParamValue::List(vec![scalar])),
        },
    }
}

fn parse_switch(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "on" | "1" => Some(true),
        "no" | "false" | "off" | "0" => Some(false),
        _ => None,
    }
}
