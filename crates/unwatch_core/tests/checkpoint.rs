use unwatch_core::{PageOutcome, TaskCheckpoint, KEY_ACTIVE, KEY_LAST_LOCATION, KEY_TOTAL_PROCESSED};

#[test]
fn checkpoint_serializes_under_stable_keys() {
    let checkpoint = TaskCheckpoint {
        active: true,
        total_processed: 15,
        last_location: Some("https://wiki.example.com/users/watches?start=40".into()),
    };
    let value = serde_json::to_value(&checkpoint).unwrap();

    assert_eq!(value[KEY_ACTIVE], true);
    assert_eq!(value[KEY_TOTAL_PROCESSED], 15);
    assert_eq!(
        value[KEY_LAST_LOCATION],
        "https://wiki.example.com/users/watches?start=40"
    );
}

#[test]
fn normalizing_inactive_checkpoint_drops_stale_fields() {
    let stale = TaskCheckpoint {
        active: false,
        total_processed: 8,
        last_location: Some("https://wiki.example.com/users/watches".into()),
    };
    assert_eq!(stale.normalized(), TaskCheckpoint::inactive());

    let live = TaskCheckpoint {
        active: true,
        total_processed: 8,
        last_location: None,
    };
    assert_eq!(live.clone().normalized(), live);
}

#[test]
fn terminal_outcomes() {
    let done = PageOutcome {
        removed_count: 5,
        next_page: None,
    };
    assert!(done.is_terminal());

    let stalled = PageOutcome {
        removed_count: 0,
        next_page: Some("https://wiki.example.com/users/watches?start=20".into()),
    };
    assert!(stalled.has_next_page());
    assert!(stalled.is_terminal());

    let more = PageOutcome {
        removed_count: 3,
        next_page: Some("https://wiki.example.com/users/watches?start=20".into()),
    };
    assert!(!more.is_terminal());
}
