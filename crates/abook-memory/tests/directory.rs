//! Behavioural tests for the in-memory directory.

use std::time::Duration;

use futures_util::StreamExt;

use abook_core::{AddressBook, Change, ContactId, PageRequest, Query, Source, SourceId};
use abook_memory::{DEFAULT_SOURCE_ID, Directory, DirectoryConfig};

const FORREST: &str = "BEGIN:VCARD
VERSION:3.0
N:Gump;Forrest
FN:Forrest Gump
TEL;TYPE=WORK,VOICE:(111) 555-1212
EMAIL;TYPE=PREF,INTERNET:forrestgump@example.com
END:VCARD";

fn card(given: &str, family: &str) -> String {
    format!(
        "BEGIN:VCARD\r\nVERSION:3.0\r\nN:{family};{given}\r\nFN:{given} {family}\r\nEMAIL:{given}@example.com\r\nEND:VCARD\r\n"
    )
}

fn sid(id: &str) -> SourceId {
    SourceId::new(id).unwrap()
}

async fn directory() -> Directory {
    Directory::from_config(&DirectoryConfig::default()).await.unwrap()
}

async fn two_sources() -> Directory {
    let dir = Directory::new();
    assert!(
        dir.create_source(Source::new(sid("S1"), "One").with_primary(true))
            .await
            .unwrap()
    );
    assert!(dir.create_source(Source::new(sid("S2"), "Two")).await.unwrap());
    dir
}

async fn next_change(events: &mut abook_memory::DirectoryEvents) -> Change {
    tokio::time::timeout(Duration::from_secs(1), events.next())
        .await
        .expect("event not delivered")
        .expect("stream ended")
        .expect("stream error")
        .change
}

#[tokio::test]
async fn forrest_gump_round_trip() {
    let dir = directory().await;

    let id = dir.create_contact(FORREST, None).await.unwrap();
    assert!(!id.as_str().is_empty());

    let contacts = dir.fetch_all(&Query::all()).await.unwrap();
    let forrest = contacts.iter().find(|c| c.id == id).unwrap();
    assert_eq!(forrest.field("FN"), Some("Forrest Gump"));
    assert_eq!(forrest.field("UID"), Some(id.as_str()));
    assert_eq!(forrest.source_id.as_str(), DEFAULT_SOURCE_ID);
    assert!(forrest.field("REV").is_some());
}

#[tokio::test]
async fn created_contacts_match_their_own_clause() {
    let dir = directory().await;
    let alice = dir.create_contact(&card("Alice", "Smith"), None).await.unwrap();
    dir.create_contact(&card("Bob", "Jones"), None).await.unwrap();

    let hits = dir
        .fetch_all(&Query::all().with_clause("EMAIL:alice@example.com"))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, alice);
}

#[tokio::test]
async fn malformed_payloads_and_clauses_are_validation_errors() {
    let dir = directory().await;

    let err = dir.create_contact("FN:nobody", None).await.unwrap_err();
    assert_eq!(err.code(), "ValidationError");

    let err = dir
        .query(&Query::all().with_clause("FN:\"open"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ValidationError");
}

#[tokio::test]
async fn create_without_target_source_is_not_found() {
    let dir = Directory::new();
    let err = dir.create_contact(FORREST, None).await.unwrap_err();
    assert_eq!(err.code(), "NotFoundError");

    let dir = directory().await;
    let err = dir.create_contact(FORREST, Some(&sid("nope"))).await.unwrap_err();
    assert_eq!(err.code(), "NotFoundError");
}

#[tokio::test]
async fn delete_counts_intersection_with_existing_ids() {
    let dir = directory().await;
    let a = dir.create_contact(&card("A", "One"), None).await.unwrap();
    let b = dir.create_contact(&card("B", "Two"), None).await.unwrap();
    dir.create_contact(&card("C", "Three"), None).await.unwrap();

    let ghost = ContactId::new("ghost").unwrap();
    let removed = dir
        .remove_contacts(&[a.clone(), ghost, b, a])
        .await
        .unwrap();
    assert_eq!(removed, 2);
    assert_eq!(dir.len().await, 1);
}

#[tokio::test]
async fn update_with_unknown_uid_changes_nothing() {
    let dir = directory().await;
    let id = dir.create_contact(FORREST, None).await.unwrap();

    let stranger = FORREST.replace("VERSION:3.0", "VERSION:3.0\nUID:not-a-contact");
    assert_eq!(dir.update_contacts(&[stranger]).await.unwrap(), 0);

    let contacts = dir.fetch_all(&Query::all()).await.unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].id, id);
}

#[tokio::test]
async fn update_replaces_matching_records_and_skips_the_rest() {
    let dir = two_sources().await;
    let first = dir.create_contact(FORREST, Some(&sid("S2"))).await.unwrap();
    let second = dir.create_contact(FORREST, None).await.unwrap();

    let rename = |id: &ContactId, name: &str| {
        FORREST
            .replace("VERSION:3.0", &format!("VERSION:3.0\nUID:{}", id))
            .replace("FN:Forrest Gump", &format!("FN:{}", name))
    };
    let batch = vec![
        rename(&first, "Lt. Dan"),
        "garbage".to_string(),
        rename(&second, "Bubba"),
        FORREST.to_string(),
    ];
    assert_eq!(dir.update_contacts(&batch).await.unwrap(), 2);

    let contacts = dir.fetch_all(&Query::all()).await.unwrap();
    assert_eq!(contacts.len(), 2);
    assert_eq!(contacts[0].field("FN"), Some("Lt. Dan"));
    assert_eq!(contacts[0].source_id.as_str(), "S2");
    assert_eq!(contacts[1].id, second);
    assert_eq!(contacts[1].field("FN"), Some("Bubba"));
}

#[tokio::test]
async fn paging_one_by_one_equals_paging_all() {
    let dir = directory().await;
    for i in 0..7 {
        dir.create_contact(&card(&format!("P{i}"), "Page"), None)
            .await
            .unwrap();
    }

    let view = dir.query(&Query::all()).await.unwrap();
    let count = dir.view_count(view).await.unwrap();
    assert_eq!(count, 7);

    let all: Vec<_> = dir
        .contacts_details(view, &[], PageRequest::from_wire(0, -1))
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();

    let mut single = Vec::new();
    for i in 0..count {
        let page = dir
            .contacts_details(view, &[], PageRequest::new(i, 1))
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        single.push(page[0].id.clone());
    }
    assert_eq!(all, single);

    let past_end = dir
        .contacts_details(view, &[], PageRequest::new(count + 3, 2))
        .await
        .unwrap();
    assert!(past_end.is_empty());
}

#[tokio::test]
async fn closed_view_is_invalid_state() {
    let dir = directory().await;
    dir.create_contact(FORREST, None).await.unwrap();

    let view = dir.query(&Query::all()).await.unwrap();
    dir.close_view(view).await.unwrap();
    dir.close_view(view).await.unwrap();

    let err = dir
        .contacts_details(view, &[], PageRequest::all())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "InvalidStateError");
    let err = dir.view_count(view).await.unwrap_err();
    assert_eq!(err.code(), "InvalidStateError");
}

#[tokio::test]
async fn views_are_snapshots() {
    let dir = directory().await;
    let id = dir.create_contact(FORREST, None).await.unwrap();

    let view = dir.query(&Query::all()).await.unwrap();
    dir.remove_contacts(&[id]).await.unwrap();
    dir.create_contact(&card("Late", "Comer"), None).await.unwrap();

    let page = dir
        .contacts_details(view, &[], PageRequest::all())
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].field("FN"), Some("Forrest Gump"));
}

#[tokio::test]
async fn second_primary_demotes_first() {
    let dir = Directory::new();
    dir.create_source(Source::new(sid("S1"), "One").with_primary(true))
        .await
        .unwrap();
    dir.create_source(Source::new(sid("S2"), "Two").with_primary(true))
        .await
        .unwrap();

    let sources = dir.available_sources().await.unwrap();
    let primaries: Vec<_> = sources.iter().filter(|s| s.primary).collect();
    assert_eq!(primaries.len(), 1);
    assert_eq!(primaries[0].id.as_str(), "S2");
    assert_eq!(sources[0].id.as_str(), "S1");
}

#[tokio::test]
async fn duplicate_source_returns_false() {
    let dir = two_sources().await;
    assert!(!dir.create_source(Source::new(sid("S1"), "Again")).await.unwrap());
    assert_eq!(dir.available_sources().await.unwrap().len(), 2);

    let err = dir
        .try_create_source(Source::new(sid("S1"), "Again"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "DuplicateError");
}

#[tokio::test]
async fn remove_source_drops_its_contacts() {
    let dir = two_sources().await;
    for i in 0..3 {
        dir.create_contact(&card(&format!("One{i}"), "S"), Some(&sid("S1")))
            .await
            .unwrap();
    }
    for i in 0..2 {
        dir.create_contact(&card(&format!("Two{i}"), "S"), Some(&sid("S2")))
            .await
            .unwrap();
    }

    assert!(dir.remove_source(&sid("S1")).await.unwrap());
    assert!(!dir.remove_source(&sid("S1")).await.unwrap());

    let sources = dir.available_sources().await.unwrap();
    assert!(sources.iter().all(|s| s.id.as_str() != "S1"));

    let contacts = dir.fetch_all(&Query::all()).await.unwrap();
    assert_eq!(contacts.len(), 2);
    assert!(contacts.iter().all(|c| c.source_id.as_str() == "S2"));
}

#[tokio::test]
async fn query_can_be_scoped_to_sources() {
    let dir = two_sources().await;
    dir.create_contact(&card("Ann", "One"), Some(&sid("S1")))
        .await
        .unwrap();
    dir.create_contact(&card("Ben", "Two"), Some(&sid("S2")))
        .await
        .unwrap();

    let only_two = dir
        .fetch_all(&Query::all().with_sources(vec![sid("S2")]))
        .await
        .unwrap();
    assert_eq!(only_two.len(), 1);
    assert_eq!(only_two[0].field("FN"), Some("Ben Two"));

    let everything = dir.fetch_all(&Query::all()).await.unwrap();
    assert_eq!(everything.len(), 2);
}

#[tokio::test]
async fn sort_and_projection_apply_to_views() {
    let dir = directory().await;
    dir.create_contact(&card("Carol", "Young"), None).await.unwrap();
    dir.create_contact(&card("Alice", "Zimmer"), None).await.unwrap();
    dir.create_contact(&card("Bob", "Adams"), None).await.unwrap();

    let by_first = dir
        .fetch_all(&Query::all().with_sort("FIRST_NAME").with_fields(["FN"]))
        .await
        .unwrap();
    let names: Vec<_> = by_first.iter().filter_map(|c| c.field("FN")).collect();
    assert_eq!(names, ["Alice Zimmer", "Bob Adams", "Carol Young"]);
    assert!(by_first.iter().all(|c| c.field("EMAIL").is_none()));

    let by_last_desc = dir
        .fetch_all(&Query::all().with_sort("LAST_NAME DESC, BOGUS"))
        .await
        .unwrap();
    let names: Vec<_> = by_last_desc.iter().filter_map(|c| c.field("FN")).collect();
    assert_eq!(names, ["Alice Zimmer", "Carol Young", "Bob Adams"]);

    let fields = dir.sort_fields().await.unwrap();
    assert!(fields.iter().any(|f| f == "LAST_NAME"));
}

#[tokio::test]
async fn reset_clears_everything() {
    let dir = directory().await;
    dir.create_contact(FORREST, None).await.unwrap();

    assert!(dir.reset().await.unwrap());
    assert!(dir.is_empty().await);
    assert!(dir.available_sources().await.unwrap().is_empty());
}

#[tokio::test]
async fn release_views_closes_only_the_owners_views() {
    let dir = directory().await;
    dir.create_contact(FORREST, None).await.unwrap();

    let mine = dir.query(&Query::all().owned_by("peer-1")).await.unwrap();
    let theirs = dir.query(&Query::all().owned_by("peer-2")).await.unwrap();

    assert_eq!(dir.release_views("peer-1").await.unwrap(), 1);
    assert!(dir.view_count(mine).await.is_err());
    assert_eq!(dir.view_count(theirs).await.unwrap(), 1);
}

#[tokio::test]
async fn mutations_emit_events_in_order() {
    let dir = directory().await;
    let mut events = dir.subscribe().unwrap();

    let id = dir.create_contact(FORREST, None).await.unwrap();
    let updated = FORREST.replace("VERSION:3.0", &format!("VERSION:3.0\nUID:{}", id));
    dir.update_contacts(&[updated]).await.unwrap();
    dir.remove_contacts(&[id.clone()]).await.unwrap();

    assert_eq!(
        next_change(&mut events).await,
        Change::ContactsAdded {
            ids: vec![id.clone()]
        }
    );
    assert_eq!(
        next_change(&mut events).await,
        Change::ContactsUpdated {
            ids: vec![id.clone()]
        }
    );
    assert_eq!(
        next_change(&mut events).await,
        Change::ContactsRemoved { ids: vec![id] }
    );
}

#[tokio::test]
async fn no_op_mutations_emit_nothing() {
    let dir = directory().await;
    let mut events = dir.subscribe().unwrap();

    dir.remove_contacts(&[ContactId::new("ghost").unwrap()])
        .await
        .unwrap();
    dir.update_contacts(&[FORREST.to_string()]).await.unwrap();
    dir.set_ready(true).await.unwrap();

    assert_eq!(
        next_change(&mut events).await,
        Change::ReadyChanged { ready: true }
    );
}

#[tokio::test]
async fn flags_fire_once_per_transition() {
    let dir = directory().await;
    assert!(!dir.is_ready().await.unwrap());
    let mut events = dir.subscribe().unwrap();

    dir.set_ready(true).await.unwrap();
    dir.set_ready(true).await.unwrap();
    dir.set_safe_mode(true).await.unwrap();
    dir.set_safe_mode(true).await.unwrap();
    dir.set_ready(false).await.unwrap();

    assert_eq!(
        next_change(&mut events).await,
        Change::ReadyChanged { ready: true }
    );
    assert_eq!(
        next_change(&mut events).await,
        Change::SafeModeChanged { safe_mode: true }
    );
    assert_eq!(
        next_change(&mut events).await,
        Change::ReadyChanged { ready: false }
    );
    assert!(dir.safe_mode().await.unwrap());
}

#[tokio::test]
async fn remove_source_reports_removed_contacts() {
    let dir = two_sources().await;
    let id = dir.create_contact(FORREST, Some(&sid("S1"))).await.unwrap();
    let mut events = dir.subscribe().unwrap();

    dir.remove_source(&sid("S1")).await.unwrap();
    assert_eq!(
        next_change(&mut events).await,
        Change::ContactsRemoved { ids: vec![id] }
    );
}

#[tokio::test]
async fn import_skips_malformed_cards() {
    let dir = directory().await;
    let text = format!(
        "{}\nBEGIN:VCARD\nFN:broken\n{}",
        card("Ann", "Lee"),
        card("Bo", "Kim")
    );

    let ids = dir.import_cards(&text, None).await.unwrap();
    assert_eq!(ids.len(), 2);
    assert_eq!(dir.len().await, 2);
}

#[tokio::test]
async fn config_loads_demo_data() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("demo.vcf");
    std::fs::write(&path, format!("{}\n{}", FORREST, card("Jenny", "Curran"))).unwrap();

    let config = DirectoryConfig {
        demo_data: Some(path),
        safe_mode: true,
        ..DirectoryConfig::default()
    };
    let dir = Directory::from_config(&config).await.unwrap();

    assert_eq!(dir.len().await, 2);
    assert!(dir.safe_mode().await.unwrap());
    assert!(!dir.is_ready().await.unwrap());
}

#[tokio::test]
async fn missing_demo_data_fails() {
    let config = DirectoryConfig {
        demo_data: Some("/definitely/not/here.vcf".into()),
        ..DirectoryConfig::default()
    };
    assert!(Directory::from_config(&config).await.is_err());
}
