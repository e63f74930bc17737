//! Ledger rows and the comma-separated encoding shared by the ledger and the
//! mirror's dataset index.

use crate::types::{Category, PackageId};
use std::fmt;
use std::str::FromStr;

/// Column names written as the ledger's header row.
pub const LEDGER_HEADER: [&str; 5] = ["package", "category", "result", "error", "identifier"];

/// Result column of a ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerResult {
    /// A satisfying build was stored.
    Found,
    /// The search finished without a satisfying build.
    NotFound,
    /// The attempt failed (transport, storage, backend error).
    Error,
}

impl LedgerResult {
    /// The string written to the ledger.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Found => "found",
            Self::NotFound => "not-found",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LedgerResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced when decoding a ledger row.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RecordError {
    /// The row did not have the expected number of columns.
    #[error("expected {expected} columns, found {found}")]
    ColumnCount {
        /// Columns required.
        expected: usize,
        /// Columns present.
        found: usize,
    },

    /// The result column held an unknown value.
    #[error("unknown result '{0}'")]
    UnknownResult(String),

    /// The identifier column was not empty and not a number.
    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),
}

impl FromStr for LedgerResult {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "found" => Ok(Self::Found),
            "not-found" => Ok(Self::NotFound),
            "error" => Ok(Self::Error),
            other => Err(RecordError::UnknownResult(other.to_string())),
        }
    }
}

/// One completed attempt, as recorded in the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRecord {
    /// Package that was attempted.
    pub package: PackageId,
    /// Category it was filed under.
    pub category: Category,
    /// How the attempt ended.
    pub result: LedgerResult,
    /// Failure text, empty on success.
    pub error: String,
    /// Identifier of the stored build, when known.
    pub identifier: Option<u64>,
}

impl LedgerRecord {
    /// Encode as a single line (without the trailing newline).
    pub fn to_line(&self) -> String {
        let identifier = self.identifier.map(|i| i.to_string()).unwrap_or_default();
        join_fields(&[
            self.package.as_str(),
            self.category.as_str(),
            self.result.as_str(),
            &self.error,
            &identifier,
        ])
    }

    /// Decode a line produced by [`LedgerRecord::to_line`].
    ///
    /// # Errors
    ///
    /// Returns a [`RecordError`] if the column count, result, or identifier
    /// is malformed.
    pub fn from_line(line: &str) -> Result<Self, RecordError> {
        let fields = split_fields(line);
        let [package, category, result, error, identifier] =
            <[String; 5]>::try_from(fields).map_err(|f| RecordError::ColumnCount {
                expected: LEDGER_HEADER.len(),
                found: f.len(),
            })?;

        let identifier = if identifier.is_empty() {
            None
        } else {
            Some(
                identifier
                    .parse::<u64>()
                    .map_err(|_| RecordError::InvalidIdentifier(identifier.clone()))?,
            )
        };

        Ok(Self {
            package: PackageId::new(&package),
            category: Category::new(&category),
            result: result.parse()?,
            error,
            identifier,
        })
    }
}

/// Quote a field if it contains a delimiter, quote, or line break.
pub fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Join fields into one comma-separated line, quoting where needed.
pub fn join_fields(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| quote_field(f))
        .collect::<Vec<_>>()
        .join(",")
}

/// Split one comma-separated line into fields.
///
/// Double-quoted fields may contain commas; `""` inside quotes is a literal
/// quote. Line breaks inside quoted fields are not supported (callers read
/// line by line and the ledger flattens messages before writing).
///
/// # Example
///
/// ```
/// use apkfetch_schema::split_fields;
///
/// assert_eq!(split_fields(r#"a,"b,c",d"#), vec!["a", "b,c", "d"]);
/// ```
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if current.is_empty() => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}
