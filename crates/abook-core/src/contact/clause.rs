//! Filter clauses for queries.
//!
//! A clause is a whitespace-separated list of terms that must all match:
//!
//! - `gump` matches any property value containing `gump`
//! - `EMAIL:example.com` matches inside one property
//! - `TEL:555-1212` compares digits only, so `(111) 5551212` matches too
//! - `ID:abc` and `SOURCE:S1` match the record id / source id exactly
//! - `FN:"Forrest Gump"` quotes a value with spaces
//!
//! Text matching is case-insensitive. The empty clause matches everything.

use super::ContactRecord;
use crate::error::{Error, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Term {
    Any(String),
    Field { name: String, needle: String },
    Id(String),
    Source(String),
}

/// A parsed filter clause.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clause {
    terms: Vec<Term>,
}

impl Clause {
    /// Parse a clause.
    ///
    /// # Errors
    ///
    /// Returns a validation error for unterminated quotes and empty or
    /// malformed field names.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let mut terms = Vec::new();
        let mut chars = text.chars().peekable();

        loop {
            while chars.next_if(|c| c.is_whitespace()).is_some() {}
            if chars.peek().is_none() {
                break;
            }

            let mut key: Option<String> = None;
            let mut current = String::new();
            let mut quoted = false;

            while let Some(&c) = chars.peek() {
                if c.is_whitespace() && !quoted {
                    break;
                }
                chars.next();
                match c {
                    '"' => quoted = !quoted,
                    ':' if !quoted && key.is_none() => {
                        if current.is_empty() {
                            return Err(clause_error(text, "empty field name"));
                        }
                        key = Some(std::mem::take(&mut current));
                    }
                    c => current.push(c),
                }
            }

            if quoted {
                return Err(clause_error(text, "unterminated quote"));
            }

            terms.push(match key {
                None => Term::Any(current.to_lowercase()),
                Some(name) => Self::field_term(text, name, current)?,
            });
        }

        Ok(Self { terms })
    }

    fn field_term(text: &str, name: String, value: String) -> Result<Term, Error> {
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(clause_error(text, &format!("invalid field name '{}'", name)));
        }

        let name = name.to_ascii_uppercase();
        Ok(match name.as_str() {
            "ID" => Term::Id(value),
            "SOURCE" => Term::Source(value),
            _ => Term::Field {
                name,
                needle: value.to_lowercase(),
            },
        })
    }

    /// Returns true if the clause has no terms and therefore matches everything.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Returns true if every term matches the record.
    pub fn matches(&self, record: &ContactRecord) -> bool {
        self.terms.iter().all(|term| match term {
            Term::Id(id) => record.id.as_str() == id,
            Term::Source(source) => record.source_id.as_str() == source,
            Term::Any(needle) => {
                record.id.as_str().to_lowercase().contains(needle.as_str())
                    || record
                        .card
                        .properties()
                        .iter()
                        .any(|p| p.value().to_lowercase().contains(needle.as_str()))
            }
            Term::Field { name, needle } => record
                .card
                .values(name)
                .any(|value| field_matches(name, value, needle)),
        })
    }
}

fn field_matches(name: &str, value: &str, needle: &str) -> bool {
    if name == "TEL" {
        let wanted = digits(needle);
        if !wanted.is_empty() {
            return digits(value).contains(&wanted);
        }
    }
    value.to_lowercase().contains(needle)
}

fn digits(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

fn clause_error(clause: &str, reason: &str) -> Error {
    ValidationError::Clause {
        clause: clause.to_string(),
        reason: reason.to_string(),
    }
    .into()
}
