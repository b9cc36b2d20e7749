use std::fmt;

use chrono::NaiveDate;

/// The five basic answer types a questionnaire field can hold.
///
/// Parsed from the spreadsheet's field-type column; anything unrecognised
/// falls back to [`AnswerKind::Text`] with a warning, matching the loader's
/// historical behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnswerKind {
    Text,
    Number,
    Decimal,
    Boolean,
    Date,
}

impl AnswerKind {
    /// Map a field-type keyword to an answer kind. `None` and unknown
    /// keywords both yield `Text`; unknown keywords are logged.
    #[must_use]
    pub fn from_keyword(keyword: Option<&str>) -> Self {
        let Some(keyword) = keyword else {
            return AnswerKind::Text;
        };
        match keyword.to_ascii_lowercase().as_str() {
            "text" => AnswerKind::Text,
            "number" => AnswerKind::Number,
            "decimal" => AnswerKind::Decimal,
            "boolean" => AnswerKind::Boolean,
            "date" => AnswerKind::Date,
            other => {
                tracing::warn!(keyword = other, "unknown field type, defaulting to text");
                AnswerKind::Text
            }
        }
    }
}

impl fmt::Display for AnswerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnswerKind::Text => "text",
            AnswerKind::Number => "number",
            AnswerKind::Decimal => "decimal",
            AnswerKind::Boolean => "boolean",
            AnswerKind::Date => "date",
        };
        write!(f, "{name}")
    }
}

/// A typed answer value.
///
/// Replaces the original's five nullable fields plus string-keyed dispatch:
/// the variant is the type, so a "wrong answer type" state cannot be
/// represented.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Answer {
    Text(String),
    Number(i64),
    Decimal(f64),
    Boolean(bool),
    Date(NaiveDate),
}

impl Answer {
    #[must_use]
    pub fn kind(&self) -> AnswerKind {
        match self {
            Answer::Text(_) => AnswerKind::Text,
            Answer::Number(_) => AnswerKind::Number,
            Answer::Decimal(_) => AnswerKind::Decimal,
            Answer::Boolean(_) => AnswerKind::Boolean,
            Answer::Date(_) => AnswerKind::Date,
        }
    }

    /// Parse a raw cell value as the given kind. Dates are ISO `YYYY-MM-DD`.
    ///
    /// # Errors
    ///
    /// Returns the raw text back if it does not parse as the kind.
    pub fn parse(kind: AnswerKind, raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        match kind {
            AnswerKind::Text => Ok(Answer::Text(raw.to_owned())),
            AnswerKind::Number => raw
                .parse::<i64>()
                .map(Answer::Number)
                .map_err(|_| raw.to_owned()),
            AnswerKind::Decimal => raw
                .parse::<f64>()
                .map(Answer::Decimal)
                .map_err(|_| raw.to_owned()),
            AnswerKind::Boolean => match raw.to_ascii_lowercase().as_str() {
                "true" | "yes" => Ok(Answer::Boolean(true)),
                "false" | "no" => Ok(Answer::Boolean(false)),
                _ => Err(raw.to_owned()),
            },
            AnswerKind::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(Answer::Date)
                .map_err(|_| raw.to_owned()),
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Text(v) => write!(f, "\"{v}\""),
            Answer::Number(v) => write!(f, "{v}"),
            Answer::Decimal(v) => write!(f, "{v}"),
            Answer::Boolean(v) => write!(f, "{v}"),
            Answer::Date(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for Answer {
    fn from(v: &str) -> Self {
        Answer::Text(v.to_owned())
    }
}

impl From<String> for Answer {
    fn from(v: String) -> Self {
        Answer::Text(v)
    }
}

impl From<i64> for Answer {
    fn from(v: i64) -> Self {
        Answer::Number(v)
    }
}

impl From<f64> for Answer {
    fn from(v: f64) -> Self {
        Answer::Decimal(v)
    }
}

impl From<bool> for Answer {
    fn from(v: bool) -> Self {
        Answer::Boolean(v)
    }
}
