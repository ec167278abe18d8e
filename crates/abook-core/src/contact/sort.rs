//! Sort clauses for query views.
//!
//! A sort clause is a comma-separated list of `KEY [ASC|DESC]` entries, e.g.
//! `LAST_NAME, FIRST_NAME DESC`. Keys name a card property, optionally one
//! component of a structured value such as `N` or `ADR`.

use std::cmp::Ordering;

use super::Card;

/// Sort keys understood by the directory: key, card property, component index.
const SORT_FIELDS: &[(&str, &str, Option<usize>)] = &[
    ("NAME_PREFIX", "N", Some(3)),
    ("FIRST_NAME", "N", Some(1)),
    ("MIDDLE_NAME", "N", Some(2)),
    ("LAST_NAME", "N", Some(0)),
    ("NAME_SUFFIX", "N", Some(4)),
    ("FULL_NAME", "FN", None),
    ("NICKNAME", "NICKNAME", None),
    ("BIRTHDAY", "BDAY", None),
    ("PHOTO", "PHOTO", None),
    ("ORG_ROLE", "ROLE", None),
    ("ORG_NAME", "ORG", Some(0)),
    ("ORG_DEPARTMENT", "ORG", Some(1)),
    ("ORG_LOCATION", "ORG", Some(2)),
    ("ORG_TITLE", "TITLE", None),
    ("EMAIL", "EMAIL", None),
    ("PHONE", "TEL", None),
    ("ADDR_POST_OFFICE_BOX", "ADR", Some(0)),
    ("ADDR_STREET", "ADR", Some(2)),
    ("ADDR_LOCALITY", "ADR", Some(3)),
    ("ADDR_REGION", "ADR", Some(4)),
    ("ADDR_POSTCODE", "ADR", Some(5)),
    ("ADDR_COUNTRY", "ADR", Some(6)),
    ("IM_URI", "IMPP", None),
    ("URL", "URL", None),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SortKey {
    field: &'static str,
    property: &'static str,
    component: Option<usize>,
    descending: bool,
}

impl SortKey {
    fn value(&self, card: &Card) -> Option<String> {
        let raw = card.first(self.property)?;
        let value = match self.component {
            Some(i) => raw.split(';').nth(i)?,
            None => raw,
        };
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_lowercase())
    }
}

/// A parsed sort clause.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortClause {
    keys: Vec<SortKey>,
    rejected: Vec<String>,
}

impl SortClause {
    /// Parse a sort clause. Unknown keys and malformed entries are collected
    /// in [`SortClause::rejected`] instead of failing the whole clause.
    pub fn parse(text: &str) -> Self {
        let mut clause = Self::default();

        for entry in text.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let words: Vec<&str> = entry.split_whitespace().collect();
            let descending = match words.get(1).map(|w| w.to_ascii_uppercase()) {
                None => false,
                Some(ref order) if order == "ASC" && words.len() == 2 => false,
                Some(ref order) if order == "DESC" && words.len() == 2 => true,
                Some(_) => {
                    clause.rejected.push(entry.to_string());
                    continue;
                }
            };

            let name = words[0].to_ascii_uppercase();
            match SORT_FIELDS.iter().find(|(field, _, _)| *field == name) {
                Some(&(field, property, component)) => clause.keys.push(SortKey {
                    field,
                    property,
                    component,
                    descending,
                }),
                None => clause.rejected.push(entry.to_string()),
            }
        }

        clause
    }

    /// Keys supported in sort clauses.
    pub fn supported_fields() -> Vec<&'static str> {
        SORT_FIELDS.iter().map(|(field, _, _)| *field).collect()
    }

    /// Entries that were dropped while parsing.
    pub fn rejected(&self) -> &[String] {
        &self.rejected
    }

    /// Returns true if no usable key was parsed.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Compare two cards. Missing values sort last in either direction;
    /// full ties compare equal so a stable sort keeps the prior order.
    pub fn compare(&self, a: &Card, b: &Card) -> Ordering {
        for key in &self.keys {
            let ordering = match (key.value(a), key.value(b)) {
                (Some(x), Some(y)) if key.descending => y.cmp(&x),
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Canonical text form, e.g. `LAST_NAME ASC, FIRST_NAME DESC`.
    pub fn to_clause_string(&self) -> String {
        self.keys
            .iter()
            .map(|k| format!("{} {}", k.field, if k.descending { "DESC" } else { "ASC" }))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
