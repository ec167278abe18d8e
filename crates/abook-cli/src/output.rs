//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use abook_core::{ContactProjection, DirectoryEvent, Source};

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as compact JSON.
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a one-line summary of a contact.
pub fn contact(contact: &ContactProjection) {
    let name = contact
        .field("FN")
        .or_else(|| contact.field("N"))
        .unwrap_or("(no name)");
    println!(
        "{}  {}  {}",
        contact.id.as_str().cyan(),
        contact.source_id.as_str().dimmed(),
        name
    );
}

/// Print a one-line summary of a source.
pub fn source(source: &Source) {
    let mut flags = Vec::new();
    if source.primary {
        flags.push("primary");
    }
    if source.read_only {
        flags.push("read-only");
    }
    println!(
        "{}  {}  {}{}",
        source.id.as_str().cyan(),
        source.display_name,
        source.provider.dimmed(),
        if flags.is_empty() {
            String::new()
        } else {
            format!("  [{}]", flags.join(", "))
        }
    );
}

/// Print a one-line summary of an event.
pub fn event(event: &DirectoryEvent) {
    let ids: Vec<&str> = event.change.ids().iter().map(|id| id.as_str()).collect();
    let name = event.change.name();
    let label = match name {
        "contactsAdded" => name.green(),
        "contactsUpdated" => name.yellow(),
        "contactsRemoved" => name.red(),
        other => other.blue(),
    };
    if ids.is_empty() {
        println!("{} @ seq {}", label, event.seq);
    } else {
        println!("{} {} @ seq {}", label, ids.join(" "), event.seq);
    }
}
