use gmxprov::core::params::ParamValue;
use gmxprov::core::params::schema::{ToolSchema, ValueKind};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid --set format: '{0}'. Expected KEY=VALUE.")]
    InvalidKeyValue(String),

    #[error("Expected a flag such as '-f', found '{0}'.")]
    ExpectedFlag(String),

    #[error("Unknown flag '-{flag}' for gmx {tool}.")]
    UnknownFlag { tool: &'static str, flag: String },

    #[error("Flag '-{0}' requires a value.")]
    MissingValue(String),

    #[error("Flag '-{0}' is given more than once.")]
    DuplicateFlag(String),
}

pub fn parse_key_value(kv_pair: &str) -> Result<(&str, &str), ParseError> {
    match kv_pair.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value.trim())),
        _ => Err(ParseError::InvalidKeyValue(kv_pair.to_string())),
    }
}

/// A token that names a flag. Negative numbers are values, not flags.
fn is_flag(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-') && token.parse::<f64>().is_err()
}

/// Parses GROMACS-style flags (`-ff oplsaa -water spce -ignh -box 5 5 5`)
/// against `schema` into a configuration mapping.
///
/// Switches take an optional yes/no value and accept the `-noX` form.
/// Vector flags consume every following token up to the next flag.
pub fn parse_gromacs_flags(
    schema: &'static ToolSchema,
    tokens: &[String],
) -> Result<Vec<(String, ParamValue)>, ParseError> {
    let mut parsed: Vec<(String, ParamValue)> = Vec::new();
    let mut iter = tokens.iter().map(String::as_str).peekable();

    while let Some(token) = iter.next() {
        if !is_flag(token) {
            return Err(ParseError::ExpectedFlag(token.to_string()));
        }
        let name = &token[1..];

        let (spec, negated) = match schema.flag(name) {
            Some(spec) => (spec, false),
            None => match name.strip_prefix("no").and_then(|n| schema.flag(n)) {
                Some(spec) if spec.kind == ValueKind::Switch => (spec, true),
                _ => {
                    return Err(ParseError::UnknownFlag {
                        tool: schema.name,
                        flag: name.to_string(),
                    });
                }
            },
        };
        if parsed.iter().any(|(k, _)| k == spec.name) {
            return Err(ParseError::DuplicateFlag(spec.name.to_string()));
        }

        let value = match spec.kind {
            ValueKind::Switch if negated => ParamValue::Switch(false),
            ValueKind::Switch => match iter.next_if(|t| !is_flag(t)) {
                Some(v) => ParamValue::from(v),
                None => ParamValue::Switch(true),
            },
            ValueKind::Single => iter
                .next()
                .map(ParamValue::from)
                .ok_or_else(|| ParseError::MissingValue(spec.name.to_string()))?,
            ValueKind::Vector => {
                let mut items = Vec::new();
                while let Some(v) = iter.next_if(|t| !is_flag(t)) {
                    items.push(ParamValue::from(v));
                }
                if items.is_empty() {
                    return Err(ParseError::MissingValue(spec.name.to_string()));
                }
                ParamValue::List(items)
            }
        };
        parsed.push((spec.name.to_string(), value));
    }
    Ok(parsed)
}
