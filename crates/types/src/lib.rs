//! Shared value types for the registro ledger system.
//!
//! Small validated types used across the core library and the REST API:
//! non-empty text, spreadsheet cell values, and line-item kinds.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("text cannot be empty")]
    Empty,
}

/// A string type that guarantees non-empty content.
///
/// Wraps a `String` and ensures it contains at least one non-whitespace
/// character. Input is trimmed of surrounding whitespace on construction.
/// Used for fields the ledger cannot accept blank, such as the patient name
/// of a new entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed; if the trimmed result is empty an error is
    /// returned.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Case-insensitive comparison against an arbitrary (untrimmed) string.
    ///
    /// This is the matching rule used when resolving a patient against
    /// ledger rows: both sides are trimmed and compared ignoring ASCII case.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.trim())
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A single spreadsheet cell.
///
/// The ledger file is the authoritative record submitted to the insurer, so
/// cells keep whatever scalar the file carried: free text, a number, or
/// nothing. No further typing is imposed; quantities in particular are
/// stored as given.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    /// Cell content rendered as text for matching and display.
    ///
    /// Numbers with no fractional part render without a decimal point so
    /// that codes stored numerically by a spreadsheet (e.g. `1234.0`)
    /// compare equal to their text form.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
        }
    }

    /// True when the cell holds no usable content (empty, blank text, or a
    /// non-finite number).
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(n) => !n.is_finite(),
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_owned())
        }
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s)
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl serde::Serialize for CellValue {
    /// Empty cells and non-finite numbers serialize as JSON `null`; the
    /// grid front end treats both as "no value".
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            CellValue::Empty => serializer.serialize_none(),
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Number(n) if n.is_finite() => serializer.serialize_f64(*n),
            CellValue::Number(_) => serializer.serialize_none(),
        }
    }
}

impl<'de> serde::Deserialize<'de> for CellValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value {
            serde_json::Value::Null => CellValue::Empty,
            serde_json::Value::String(s) => CellValue::from(s),
            serde_json::Value::Number(n) => {
                CellValue::Number(n.as_f64().unwrap_or(f64::NAN))
            }
            serde_json::Value::Bool(b) => {
                CellValue::Text(if b { "TRUE" } else { "FALSE" }.to_owned())
            }
            other => CellValue::Text(other.to_string()),
        })
    }
}

/// The kind of a billed line item.
///
/// Procedures and medications are validated against their reference
/// catalogs; supplies are free text and never carry a catalog code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Procedure,
    Medication,
    Supply,
}

impl ItemKind {
    /// Whether entries of this kind must resolve to a catalog code.
    pub fn requires_catalog(self) -> bool {
        !matches!(self, ItemKind::Supply)
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ItemKind::Procedure => "procedure",
            ItemKind::Medication => "medication",
            ItemKind::Supply => "supply",
        };
        write!(f, "{}", s)
    }
}
