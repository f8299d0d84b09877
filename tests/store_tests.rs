// ConversationStore tests: thread ordering, the unread model, filtering,
// and the simulated delivery-status progression.

mod common;
use common::{
    drain_status_events, seeded_store, seeded_store_with_delays, test_contact, test_message,
};

use std::collections::HashSet;
use tokio::time::Duration;

use parley::convo::StatusDelays;
use parley::models::{DeliveryStatus, Sender};

#[tokio::test]
async fn test_append_preserves_call_order_and_unique_ids() {
    common::setup_logging();
    let (store, _events_rx) = seeded_store().await;

    for stamp in [10, 20, 21, 35, 40] {
        store
            .append_message("alice", test_message("alice", stamp, Sender::Peer, "hi"))
            .await;
    }

    let thread = store.get_thread("alice").await;
    assert_eq!(thread.len(), 5);

    let timestamps: Vec<u64> = thread.iter().map(|m| m.timestamp).collect();
    assert_eq!(timestamps, vec![10, 20, 21, 35, 40], "append order kept");

    let ids: HashSet<&str> = thread.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids.len(), thread.len(), "every id unique within the thread");
}

#[tokio::test]
async fn test_append_updates_contact_summary() {
    let (store, _events_rx) = seeded_store().await;

    store
        .append_message(
            "alice",
            test_message("alice", 1000, Sender::Peer, "See you at noon"),
        )
        .await;

    let contacts = store.list_contacts().await;
    let alice = contacts.iter().find(|c| c.id == "alice").unwrap();
    assert_eq!(alice.last_message_preview, "See you at noon");
    assert_eq!(alice.last_message_time, 1000);
}

#[tokio::test]
async fn test_append_for_unknown_contact_is_dropped() {
    let (store, _events_rx) = seeded_store().await;

    store
        .append_message("nobody", test_message("nobody", 5, Sender::Peer, "hello?"))
        .await;

    assert!(store.get_thread("nobody").await.is_empty());
}

#[tokio::test]
async fn test_unread_increments_for_background_peer_messages_only() {
    let (store, _events_rx) = seeded_store().await;
    store.select_contact("alice").await;

    // Peer message into the active thread: no unread bump
    store
        .append_message("alice", test_message("alice", 1, Sender::Peer, "hey"))
        .await;
    // Peer messages into a background thread: bump per message
    store
        .append_message("ben", test_message("ben", 2, Sender::Peer, "ping"))
        .await;
    store
        .append_message("ben", test_message("ben", 3, Sender::Peer, "ping again"))
        .await;
    // Self-sent messages never count as unread
    store
        .append_message("ben", test_message("ben", 4, Sender::Me, "pong"))
        .await;

    let contacts = store.list_contacts().await;
    assert_eq!(contacts.iter().find(|c| c.id == "alice").unwrap().unread_count, 0);
    assert_eq!(contacts.iter().find(|c| c.id == "ben").unwrap().unread_count, 2);
}

#[tokio::test]
async fn test_select_contact_resets_unread_atomically() {
    let (store, _events_rx) = seeded_store().await;

    store
        .append_message("ben", test_message("ben", 1, Sender::Peer, "one"))
        .await;
    store
        .append_message("ben", test_message("ben", 2, Sender::Peer, "two"))
        .await;

    let before = store.list_contacts().await;
    assert_eq!(before.iter().find(|c| c.id == "ben").unwrap().unread_count, 2);

    store.select_contact("ben").await;

    let after = store.list_contacts().await;
    assert_eq!(after.iter().find(|c| c.id == "ben").unwrap().unread_count, 0);
    assert_eq!(store.active_contact().await.as_deref(), Some("ben"));
}

#[tokio::test]
async fn test_select_unknown_contact_is_noop() {
    let (store, _events_rx) = seeded_store().await;
    store.select_contact("alice").await;

    store.select_contact("nobody").await;

    assert_eq!(store.active_contact().await.as_deref(), Some("alice"));
}

#[tokio::test(start_paused = true)]
async fn test_status_progression_delivers_then_reads() {
    let (store, mut events_rx) = seeded_store().await;

    store
        .append_message("alice", test_message("alice", 100, Sender::Me, "outbound"))
        .await;
    let sent_id = store.get_thread("alice").await[0].id.clone();
    assert_eq!(
        store.get_thread("alice").await[0].status,
        DeliveryStatus::Sent
    );

    // Delivered after 1s
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(
        store.get_thread("alice").await[0].status,
        DeliveryStatus::Delivered
    );

    // Read after a further 2s
    tokio::time::sleep(Duration::from_millis(2000)).await;
    assert_eq!(
        store.get_thread("alice").await[0].status,
        DeliveryStatus::Read
    );

    let events = drain_status_events(&mut events_rx);
    assert_eq!(
        events,
        vec![
            (sent_id.clone(), DeliveryStatus::Delivered),
            (sent_id, DeliveryStatus::Read),
        ],
        "delivered is observable strictly before read"
    );
}

#[tokio::test(start_paused = true)]
async fn test_status_progression_respects_custom_delays() {
    let delays = StatusDelays {
        delivered: Duration::from_secs(5),
        read: Duration::from_secs(10),
    };
    let (store, _events_rx) = seeded_store_with_delays(delays).await;

    store
        .append_message("alice", test_message("alice", 100, Sender::Me, "slow lane"))
        .await;

    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(
        store.get_thread("alice").await[0].status,
        DeliveryStatus::Sent
    );

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(
        store.get_thread("alice").await[0].status,
        DeliveryStatus::Delivered
    );

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(
        store.get_thread("alice").await[0].status,
        DeliveryStatus::Read
    );
}

#[tokio::test(start_paused = true)]
async fn test_peer_messages_never_progress() {
    let (store, mut events_rx) = seeded_store().await;

    store
        .append_message("alice", test_message("alice", 100, Sender::Peer, "inbound"))
        .await;

    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(
        store.get_thread("alice").await[0].status,
        DeliveryStatus::Sent
    );
    assert!(drain_status_events(&mut events_rx).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_delete_before_delivery_suppresses_all_transitions() {
    let (store, mut events_rx) = seeded_store().await;

    store
        .append_message("alice", test_message("alice", 100, Sender::Me, "doomed"))
        .await;
    let id = store.get_thread("alice").await[0].id.clone();

    store.delete_message("alice", &id).await;
    assert!(store.get_thread("alice").await.is_empty());

    // Well past both scheduled transitions
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert!(
        drain_status_events(&mut events_rx).is_empty(),
        "a deleted message produces zero status events"
    );
    assert!(
        store.get_thread("alice").await.is_empty(),
        "the scheduler never resurrects a deleted message"
    );
}

#[tokio::test(start_paused = true)]
async fn test_delete_between_transitions_stops_read() {
    let (store, mut events_rx) = seeded_store().await;

    store
        .append_message("alice", test_message("alice", 100, Sender::Me, "halfway"))
        .await;
    let id = store.get_thread("alice").await[0].id.clone();

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(
        drain_status_events(&mut events_rx),
        vec![(id.clone(), DeliveryStatus::Delivered)]
    );

    store.delete_message("alice", &id).await;
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert!(drain_status_events(&mut events_rx).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_status_sequence_is_forward_only_per_message() {
    let (store, mut events_rx) = seeded_store().await;

    store
        .append_message("alice", test_message("alice", 100, Sender::Me, "first"))
        .await;
    tokio::time::sleep(Duration::from_millis(500)).await;
    store
        .append_message("alice", test_message("alice", 200, Sender::Me, "second"))
        .await;

    tokio::time::sleep(Duration::from_secs(10)).await;

    // Group observed transitions per message id and check each is a
    // strictly increasing subsequence of Sent -> Delivered -> Read
    let events = drain_status_events(&mut events_rx);
    for id in ["alice-100", "alice-200"] {
        let seen: Vec<DeliveryStatus> = events
            .iter()
            .filter(|(m, _)| m == id)
            .map(|(_, s)| *s)
            .collect();
        assert_eq!(
            seen,
            vec![DeliveryStatus::Delivered, DeliveryStatus::Read],
            "transitions for {} stay ordered",
            id
        );
    }
}

#[tokio::test]
async fn test_delete_unknown_message_is_noop() {
    let (store, _events_rx) = seeded_store().await;

    store
        .append_message("alice", test_message("alice", 1, Sender::Peer, "keep me"))
        .await;
    store.delete_message("alice", "alice-999").await;
    store.delete_message("nobody", "alice-1").await;

    assert_eq!(store.get_thread("alice").await.len(), 1);
}

#[tokio::test]
async fn test_toggle_star_flips_in_place() {
    let (store, _events_rx) = seeded_store().await;

    store
        .append_message("alice", test_message("alice", 1, Sender::Peer, "starworthy"))
        .await;
    let id = store.get_thread("alice").await[0].id.clone();

    store.toggle_star("alice", &id).await;
    assert!(store.get_thread("alice").await[0].is_starred);

    store.toggle_star("alice", &id).await;
    assert!(!store.get_thread("alice").await[0].is_starred);

    // Unknown ids are ignored
    store.toggle_star("alice", "alice-404").await;
}

#[tokio::test]
async fn test_find_contacts_matches_name_and_preview() {
    let (store, _events_rx) = seeded_store().await;
    store
        .append_message("ben", test_message("ben", 1, Sender::Peer, "Lunch tomorrow?"))
        .await;

    let by_name = store.find_contacts("ALICE", "all").await;
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].id, "alice");

    let by_preview = store.find_contacts("lunch", "all").await;
    assert_eq!(by_preview.len(), 1);
    assert_eq!(by_preview[0].id, "ben");

    assert!(store.find_contacts("zzz", "all").await.is_empty());
}

#[tokio::test]
async fn test_find_contacts_intersects_tags_and_keeps_order() {
    let (store, _events_rx) = seeded_store().await;
    store
        .add_contact(test_contact("carol", "Carol Alvarez", &["friends", "work"]))
        .await;

    let friends = store.find_contacts("", "friends").await;
    let ids: Vec<&str> = friends.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["alice", "carol"], "store order, not relevance order");

    // Query and tag intersect
    let filtered = store.find_contacts("carol", "friends").await;
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, "carol");

    let all = store.find_contacts("", "all").await;
    assert_eq!(all.len(), 3);
}
