//! Line-oriented contact card (vCard) model.
//!
//! The directory treats cards as mostly opaque. It needs the `BEGIN`/`END`
//! framing for validation, the `UID` line for update matching, `REV` for
//! revision stamps, and plain property access for filtering, sorting and
//! field projection. Anything beyond that (value escaping, parameter
//! semantics) passes through untouched.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, ValidationError};

const BEGIN: &str = "BEGIN:VCARD";
const END: &str = "END:VCARD";

/// A single content line of a card, e.g. `TEL;TYPE=WORK:555-1212`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    group: Option<String>,
    name: String,
    params: Vec<String>,
    value: String,
}

impl Property {
    /// Create a property with no group and no parameters.
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            group: None,
            name: name.to_ascii_uppercase(),
            params: Vec::new(),
            value: value.into(),
        }
    }

    /// Upper-cased property name, without group prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Group prefix (`item1` in `item1.TEL`), if any.
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Raw parameters, e.g. `["TYPE=WORK,VOICE"]`.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Raw property value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns true if this property has the given name (case-insensitive).
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    fn parse(line: &str) -> Result<Self, Error> {
        let colon = find_unquoted(line, ':')
            .ok_or_else(|| card_error(format!("line '{}' has no ':' separator", line)))?;
        let (head, value) = (&line[..colon], &line[colon + 1..]);

        let mut parts = split_unquoted(head, ';').into_iter();
        let full_name = parts.next().unwrap_or_default();
        let (group, name) = match full_name.rsplit_once('.') {
            Some((group, name)) => (Some(group.to_string()), name),
            None => (None, full_name),
        };

        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(card_error(format!("invalid property name in line '{}'", line)));
        }

        Ok(Self {
            group,
            name: name.to_ascii_uppercase(),
            params: parts.map(str::to_string).collect(),
            value: value.to_string(),
        })
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref group) = self.group {
            write!(f, "{}.", group)?;
        }
        write!(f, "{}", self.name)?;
        for param in &self.params {
            write!(f, ";{}", param)?;
        }
        write!(f, ":{}", self.value)
    }
}

/// A parsed contact card.
///
/// Construction guarantees a single `BEGIN:VCARD` ... `END:VCARD` block in
/// which every content line is a well-formed property.
///
/// # Example
///
/// ```
/// use abook_core::Card;
///
/// let card = Card::parse("BEGIN:VCARD\nVERSION:3.0\nFN:Forrest Gump\nEND:VCARD\n").unwrap();
/// assert_eq!(card.first("fn"), Some("Forrest Gump"));
/// assert_eq!(card.uid(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    properties: Vec<Property>,
}

impl Card {
    /// Parse a card from its textual form.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the framing is missing, more than one
    /// card is present, or a content line is malformed.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let lines = unfold(text);

        let (first, rest) = lines
            .split_first()
            .ok_or_else(|| card_error("payload is empty"))?;
        if !first.trim().eq_ignore_ascii_case(BEGIN) {
            return Err(card_error("must start with BEGIN:VCARD"));
        }

        let (last, body) = rest
            .split_last()
            .ok_or_else(|| card_error("missing END:VCARD"))?;
        if !last.trim().eq_ignore_ascii_case(END) {
            return Err(card_error("must end with END:VCARD"));
        }

        let mut properties = Vec::with_capacity(body.len());
        for line in body {
            let trimmed = line.trim();
            if trimmed.eq_ignore_ascii_case(BEGIN) || trimmed.eq_ignore_ascii_case(END) {
                return Err(card_error("payload must contain exactly one card"));
            }
            properties.push(Property::parse(line)?);
        }

        Ok(Self { properties })
    }

    /// All content properties in order.
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// The first value of a property (case-insensitive name).
    pub fn first<'a>(&'a self, name: &str) -> Option<&'a str> {
        self.properties
            .iter()
            .find(|p| p.is(name))
            .map(Property::value)
    }

    /// Every value of a property (case-insensitive name).
    pub fn values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.properties
            .iter()
            .filter(move |p| p.is(name))
            .map(Property::value)
    }

    /// The card's `UID`, if present and non-blank.
    pub fn uid(&self) -> Option<&str> {
        self.first("UID").map(str::trim).filter(|uid| !uid.is_empty())
    }

    /// Replace any `UID` lines with a single one.
    ///
    /// The new line goes right after `VERSION` when there is one.
    pub fn set_uid(&mut self, uid: &str) {
        self.properties.retain(|p| !p.is("UID"));
        let at = self
            .properties
            .iter()
            .position(|p| p.is("VERSION"))
            .map(|i| i + 1)
            .unwrap_or(0);
        self.properties.insert(at, Property::new("UID", uid));
    }

    /// Replace any `REV` lines with the given revision timestamp.
    pub fn set_rev(&mut self, rev: DateTime<Utc>) {
        self.properties.retain(|p| !p.is("REV"));
        self.properties.push(Property::new(
            "REV",
            rev.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        ));
    }

    /// A copy holding only the requested properties.
    ///
    /// `VERSION` and `UID` are always kept so the result is still a usable
    /// card. An empty field list keeps everything.
    pub fn project(&self, fields: &[String]) -> Card {
        if fields.is_empty() {
            return self.clone();
        }

        let properties = self
            .properties
            .iter()
            .filter(|p| p.is("VERSION") || p.is("UID") || fields.iter().any(|f| p.is(f)))
            .cloned()
            .collect();

        Card { properties }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\r\n", BEGIN)?;
        for property in &self.properties {
            write!(f, "{}\r\n", property)?;
        }
        write!(f, "{}\r\n", END)
    }
}

impl std::str::FromStr for Card {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Card {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Card::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Split a multi-card document into one text block per card.
///
/// Blocks start at each `BEGIN:VCARD` line. Text before the first card is
/// returned as its own block unless it is blank, so callers can report it.
pub fn split_cards(text: &str) -> Vec<String> {
    let mut blocks: Vec<String> = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        if line.trim().eq_ignore_ascii_case(BEGIN) && !current.trim().is_empty() {
            blocks.push(std::mem::take(&mut current));
        }
        current.push_str(line);
        current.push('\n');
    }

    if !current.trim().is_empty() {
        blocks.push(current);
    }

    blocks
}

fn card_error(reason: impl Into<String>) -> Error {
    ValidationError::Card {
        reason: reason.into(),
    }
    .into()
}

/// Join folded lines and drop blank ones.
fn unfold(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in text.lines() {
        let folded = raw.starts_with(' ') || raw.starts_with('\t');
        if folded && let Some(previous) = lines.last_mut() {
            previous.push_str(&raw[1..]);
            continue;
        }
        if !raw.trim().is_empty() {
            lines.push(raw.to_string());
        }
    }
    lines
}

fn find_unquoted(s: &str, needle: char) -> Option<usize> {
    let mut quoted = false;
    for (i, c) in s.char_indices() {
        match c {
            '"' => quoted = !quoted,
            c if c == needle && !quoted => return Some(i),
            _ => {}
        }
    }
    None
}

fn split_unquoted(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = s;
    while let Some(i) = find_unquoted(rest, sep) {
        parts.push(&rest[..i]);
        rest = &rest[i + sep.len_utf8()..];
    }
    parts.push(rest);
    parts
}
