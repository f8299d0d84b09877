// Roster config round-trip tests.

use parley::config::{default_roster, load_roster, save_roster, RosterConfig};
use parley::models::Contact;

#[test]
fn test_missing_file_loads_as_none() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("roster.json");

    let loaded = load_roster(&path).expect("load succeeds");
    assert!(loaded.is_none());
}

#[test]
fn test_roster_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("roster.json");

    let config = RosterConfig {
        profile: parley::config::Profile {
            display_name: "Mika".to_string(),
        },
        contacts: vec![Contact {
            id: "noor".to_string(),
            name: "Noor Haddad".to_string(),
            avatar_ref: "avatar:noor".to_string(),
            last_message_preview: String::new(),
            last_message_time: 0,
            unread_count: 0,
            online: true,
            tags: vec!["friends".to_string()],
        }],
    };

    save_roster(&path, &config).expect("save succeeds");
    let loaded = load_roster(&path).expect("load succeeds").expect("present");

    assert_eq!(loaded.profile.display_name, "Mika");
    assert_eq!(loaded.contacts, config.contacts);
}

#[test]
fn test_sparse_roster_json_fills_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("roster.json");

    // Only the required fields; everything else takes its default
    std::fs::write(
        &path,
        r#"{ "contacts": [ { "id": "omar", "name": "Omar Sy" } ] }"#,
    )
    .expect("write fixture");

    let loaded = load_roster(&path).expect("load succeeds").expect("present");
    assert_eq!(loaded.profile.display_name, "You");

    let omar = &loaded.contacts[0];
    assert_eq!(omar.unread_count, 0);
    assert!(!omar.online);
    assert!(omar.tags.is_empty());
    assert_eq!(omar.last_message_preview, "");
}

#[test]
fn test_default_roster_is_usable() {
    let roster = default_roster();
    assert!(!roster.contacts.is_empty());

    // Ids unique, tags drawn from the console's filter set
    let mut ids: Vec<&str> = roster.contacts.iter().map(|c| c.id.as_str()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), roster.contacts.len());
}
