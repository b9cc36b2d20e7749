//! String-encoded list boundary.
//!
//! Item lists travel as comma-joined ids; option lists travel as
//! `value=label` pairs where commas and equals signs inside the text are
//! escaped with a backslash and a missing value is the literal `null`.

use thiserror::Error;
use winnow::combinator::{alt, opt, preceded, repeat, separated};
use winnow::token::{any, none_of};
use winnow::{ModalResult, Parser};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Commas delimit options, so a value may not contain one. Labels may;
    /// they are escaped.
    #[error("option value \"{0}\" contains a comma")]
    CommaInValue(String),

    #[error("malformed option list: {0}")]
    Malformed(String),
}

/// One selectable answer as it crosses the boundary. `value: None` encodes
/// as the `null` sentinel; an absent label encodes as empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PossibleOption {
    pub value: Option<String>,
    pub label: Option<String>,
}

/// Comma-join an id list. Ids never contain commas (they cannot contain
/// whitespace either; both are enforced at compile time).
#[must_use]
pub fn encode_ids(ids: &[String]) -> String {
    ids.join(",")
}

/// Split a comma-joined id list, trimming each id.
#[must_use]
pub fn decode_ids(input: &str) -> Vec<String> {
    if input.is_empty() {
        return Vec::new();
    }
    input.split(',').map(|id| id.trim().to_owned()).collect()
}

/// Encode an option list.
///
/// # Errors
///
/// [`CodecError::CommaInValue`] if any option value contains a comma.
pub fn encode_options(options: &[PossibleOption]) -> Result<String, CodecError> {
    let mut out = String::new();
    for option in options {
        if !out.is_empty() {
            out.push(',');
        }
        match &option.value {
            Some(value) => {
                if value.contains(',') {
                    return Err(CodecError::CommaInValue(value.clone()));
                }
                out.push_str(&value.replace('=', "\\="));
            }
            None => out.push_str("null"),
        }
        out.push('=');
        if let Some(label) = &option.label {
            out.push_str(&label.replace(',', "\\,").replace('=', "\\="));
        }
    }
    Ok(out)
}

/// Decode an option list.
///
/// # Errors
///
/// [`CodecError::Malformed`] when the text does not parse.
pub fn decode_options(input: &str) -> Result<Vec<PossibleOption>, CodecError> {
    if input.is_empty() {
        return Ok(Vec::new());
    }
    separated(1.., option_pair, ',')
        .parse(input)
        .map_err(|e| CodecError::Malformed(e.to_string()))
}

fn escaped_char(input: &mut &str) -> ModalResult<char> {
    preceded('\\', any).parse_next(input)
}

fn option_pair(input: &mut &str) -> ModalResult<PossibleOption> {
    let value: String =
        repeat(0.., alt((escaped_char, none_of([',', '='])))).parse_next(input)?;
    let label: Option<String> = opt(preceded(
        '=',
        repeat(0.., alt((escaped_char, none_of([','])))).map(|s: String| s),
    ))
    .parse_next(input)?;
    Ok(PossibleOption {
        value: if value == "null" { None } else { Some(value) },
        label: label.filter(|l| !l.is_empty()),
    })
}
