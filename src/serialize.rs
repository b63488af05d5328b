//! Delimited text serialization
//!
//! One header line, then one line per row, every line terminated by `\n`.
//! A field is quoted (with embedded quotes doubled) when it contains a
//! delimiter character, the quote character, `;` or `&`. The last two are
//! not delimiters but trip up common spreadsheet importers.

use crate::config::FormatConfig;
use crate::extract::headers::HeaderSet;
use crate::extract::store::RowRecord;
use std::borrow::Cow;

/// Characters that force quoting regardless of the delimiter
const ALWAYS_QUOTED: [char; 2] = [';', '&'];

/// Renders a header set and rows into a delimited document
#[derive(Debug, Clone)]
pub struct Serializer {
    delimiter: String,
    quote: char,
    /// Delimiter characters that force quoting
    delimiter_chars: Vec<char>,
}

impl Serializer {
    pub fn new(delimiter: impl Into<String>, quote: char) -> Self {
        let delimiter = delimiter.into();
        // ", " splits on the comma; an all-whitespace delimiter such as "\t"
        // is significant as a whole
        let mut delimiter_chars: Vec<char> =
            delimiter.chars().filter(|c| !c.is_whitespace()).collect();
        if delimiter_chars.is_empty() {
            delimiter_chars = delimiter.chars().collect();
        }
        Self {
            delimiter,
            quote,
            delimiter_chars,
        }
    }

    pub fn from_config(format: &FormatConfig) -> Self {
        Self::new(format.delimiter.clone(), format.quote)
    }

    /// Quote `field` if it contains any sensitive character
    pub fn escape<'a>(&self, field: &'a str) -> Cow<'a, str> {
        let sensitive = field.chars().any(|c| {
            c == self.quote || self.delimiter_chars.contains(&c) || ALWAYS_QUOTED.contains(&c)
        });
        if !sensitive {
            return Cow::Borrowed(field);
        }

        let doubled: String = [self.quote, self.quote].iter().collect();
        let inner = field.replace(self.quote, &doubled);
        Cow::Owned(format!("{q}{inner}{q}", q = self.quote))
    }

    fn push_line<'a>(&self, out: &mut String, fields: impl Iterator<Item = &'a str>) {
        for (i, field) in fields.enumerate() {
            if i > 0 {
                out.push_str(&self.delimiter);
            }
            out.push_str(&self.escape(field));
        }
        out.push('\n');
    }

    /// Render the full document
    ///
    /// Rows are clamped or padded to the header width.
    pub fn render(&self, headers: &HeaderSet, rows: &[RowRecord]) -> String {
        let width = headers.width();
        let mut out = String::new();

        self.push_line(&mut out, headers.labels().iter().map(String::as_str));

        for row in rows {
            let cells = row.cells();
            let padded = (0..width).map(|i| cells.get(i).map_or("", String::as_str));
            self.push_line(&mut out, padded);
        }

        out
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::from_config(&FormatConfig::default())
    }
}
