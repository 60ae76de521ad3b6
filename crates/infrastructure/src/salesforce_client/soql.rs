//! SOQL statements with named binds.
//!
//! Bind values are rendered as escaped literals, so user input never becomes
//! part of the query syntax.

use chrono::NaiveDate;
use opsdash_core::{AppError, AppResult};

/// Literal value bound to a `:name` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SoqlValue {
    /// Quoted, escaped string literal.
    Text(String),
    /// Unquoted `YYYY-MM-DD` date literal.
    Date(NaiveDate),
    /// Integer literal.
    Integer(i64),
    /// Boolean literal.
    Boolean(bool),
    /// Parenthesized list of string literals, for `IN` clauses.
    TextList(Vec<String>),
}

impl SoqlValue {
    fn render(&self) -> String {
        match self {
            Self::Text(value) => format!("'{}'", escape_literal(value)),
            Self::Date(value) => value.format("%Y-%m-%d").to_string(),
            Self::Integer(value) => value.to_string(),
            Self::Boolean(value) => value.to_string(),
            Self::TextList(values) => {
                let items: Vec<String> = values
                    .iter()
                    .map(|value| format!("'{}'", escape_literal(value)))
                    .collect();
                format!("({})", items.join(", "))
            }
        }
    }
}

impl From<&str> for SoqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for SoqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NaiveDate> for SoqlValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<i64> for SoqlValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for SoqlValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// SOQL template plus its bind values.
#[derive(Debug, Clone, PartialEq)]
pub struct SoqlStatement {
    template: String,
    binds: Vec<(String, SoqlValue)>,
}

impl SoqlStatement {
    /// Creates a statement from a template containing `:name` placeholders.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            binds: Vec::new(),
        }
    }

    /// Binds a value to a placeholder. Rebinding a name replaces the value.
    #[must_use]
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<SoqlValue>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.binds.iter_mut().find(|(bound, _)| *bound == name) {
            Some(existing) => existing.1 = value,
            None => self.binds.push((name, value)),
        }
        self
    }

    /// Renders the final query text.
    ///
    /// Placeholders inside quoted template literals are left untouched. A
    /// placeholder without a bind value is a validation error.
    pub fn render(&self) -> AppResult<String> {
        let mut output = String::with_capacity(self.template.len());
        let mut characters = self.template.chars().peekable();
        let mut in_literal = false;

        while let Some(character) = characters.next() {
            if in_literal {
                output.push(character);
                if character == '\\' {
                    if let Some(escaped) = characters.next() {
                        output.push(escaped);
                    }
                } else if character == '\'' {
                    in_literal = false;
                }
                continue;
            }

            match character {
                '\'' => {
                    in_literal = true;
                    output.push(character);
                }
                ':' if characters
                    .peek()
                    .is_some_and(|next| next.is_ascii_alphabetic() || *next == '_') =>
                {
                    let mut name = String::new();
                    while let Some(next) = characters.peek() {
                        if next.is_ascii_alphanumeric() || *next == '_' {
                            name.push(*next);
                            characters.next();
                        } else {
                            break;
                        }
                    }

                    let value = self
                        .binds
                        .iter()
                        .find(|(bound, _)| *bound == name)
                        .map(|(_, value)| value)
                        .ok_or_else(|| {
                            AppError::Validation(format!("SOQL bind ':{name}' has no value"))
                        })?;
                    output.push_str(&value.render());
                }
                other => output.push(other),
            }
        }

        Ok(output)
    }
}

/// Escapes a string for use inside a quoted SOQL literal.
#[must_use]
pub fn escape_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for character in value.chars() {
        match character {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            other => escaped.push(other),
        }
    }

    escaped
}

/// Escapes SOSL reserved characters in a search term.
#[must_use]
pub fn escape_sosl_term(term: &str) -> String {
    const RESERVED: &[char] = &[
        '?', '&', '|', '!', '{', '}', '[', ']', '(', ')', '^', '~', '*', ':', '\\', '"', '\'',
        '+', '-',
    ];

    let mut escaped = String::with_capacity(term.len());
    for character in term.chars() {
        if RESERVED.contains(&character) {
            escaped.push('\\');
        }
        escaped.push(character);
    }

    escaped
}
