//! Conversion between typed values and the literals a client edits.
//!
//! Controls display a value as text and receive text back. A [`Converter`]
//! performs both directions; an empty or missing literal always means "no
//! value".

use std::fmt::{Display, Write};
use std::marker::PhantomData;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::error::ConversionError;

/// Converts values to literals and back.
pub trait Converter<V>: Send + Sync {
    /// Render a value as a literal.
    fn convert_value(&self, value: &Option<V>) -> Option<String>;

    /// Parse a literal into a value.
    fn convert_literal(&self, literal: Option<&str>) -> Result<Option<V>, ConversionError>;

    /// Whether a literal would convert successfully.
    fn is_valid_literal(&self, literal: Option<&str>) -> bool {
        self.convert_literal(literal).is_ok()
    }
}

fn non_empty(literal: Option<&str>) -> Option<&str> {
    literal.filter(|text| !text.is_empty())
}

/// Passes strings through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringConverter;

impl Converter<String> for StringConverter {
    fn convert_value(&self, value: &Option<String>) -> Option<String> {
        value.clone()
    }

    fn convert_literal(&self, literal: Option<&str>) -> Result<Option<String>, ConversionError> {
        Ok(non_empty(literal).map(str::to_owned))
    }
}

/// Converts any type with [`FromStr`] and [`Display`] implementations.
///
/// Surrounding whitespace is ignored when parsing.
///
/// ```
/// use arbor::converter::{Converter, ParseConverter};
///
/// let converter = ParseConverter::<u16>::new();
/// assert_eq!(converter.convert_literal(Some(" 8080 ")).unwrap(), Some(8080));
/// assert_eq!(converter.convert_literal(Some("")).unwrap(), None);
/// assert!(converter.convert_literal(Some("port")).is_err());
/// ```
pub struct ParseConverter<V> {
    _value: PhantomData<fn() -> V>,
}

impl<V> ParseConverter<V> {
    /// Create a converter.
    pub fn new() -> Self {
        Self {
            _value: PhantomData,
        }
    }
}

impl<V> Default for ParseConverter<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> std::fmt::Debug for ParseConverter<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseConverter")
            .field("type", &std::any::type_name::<V>())
            .finish()
    }
}

impl<V> Converter<V> for ParseConverter<V>
where
    V: FromStr + Display,
    V::Err: Display,
{
    fn convert_value(&self, value: &Option<V>) -> Option<String> {
        value.as_ref().map(ToString::to_string)
    }

    fn convert_literal(&self, literal: Option<&str>) -> Result<Option<V>, ConversionError> {
        let Some(text) = non_empty(literal.map(str::trim)) else {
            return Ok(None);
        };
        text.parse()
            .map(Some)
            .map_err(|err: V::Err| ConversionError::new(text, err.to_string()))
    }
}

/// Converts `true`/`false` in any letter case.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanConverter;

impl Converter<bool> for BooleanConverter {
    fn convert_value(&self, value: &Option<bool>) -> Option<String> {
        value.map(|value| value.to_string())
    }

    fn convert_literal(&self, literal: Option<&str>) -> Result<Option<bool>, ConversionError> {
        let Some(text) = non_empty(literal.map(str::trim)) else {
            return Ok(None);
        };
        if text.eq_ignore_ascii_case("true") {
            Ok(Some(true))
        } else if text.eq_ignore_ascii_case("false") {
            Ok(Some(false))
        } else {
            Err(ConversionError::new(text, "expected true or false"))
        }
    }
}

/// Converts calendar dates using a `chrono` format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateConverter {
    format: String,
}

impl DateConverter {
    /// The default date format, ISO 8601 (`2024-01-31`).
    pub const DEFAULT_FORMAT: &'static str = "%Y-%m-%d";

    /// Create a converter using the default format.
    pub fn new() -> Self {
        Self::with_format(Self::DEFAULT_FORMAT)
    }

    /// Create a converter with a custom format.
    pub fn with_format(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }

    /// The format string.
    pub fn format(&self) -> &str {
        &self.format
    }
}

impl Default for DateConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter<NaiveDate> for DateConverter {
    /// Returns `None` when the format string cannot render a date.
    fn convert_value(&self, value: &Option<NaiveDate>) -> Option<String> {
        let date = (*value)?;
        let mut rendered = String::new();
        write!(rendered, "{}", date.format(&self.format)).ok()?;
        Some(rendered)
    }

    fn convert_literal(&self, literal: Option<&str>) -> Result<Option<NaiveDate>, ConversionError> {
        let Some(text) = non_empty(literal.map(str::trim)) else {
            return Ok(None);
        };
        NaiveDate::parse_from_str(text, &self.format)
            .map(Some)
            .map_err(|err| ConversionError::new(text, err.to_string()))
    }
}
