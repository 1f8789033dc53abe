use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use night_shift_core::{Profile, ProfileStore};
use night_shift_profile_store::JsonProfileStore;

fn scratch_path(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    std::env::temp_dir()
        .join(format!("night-shift-{}-{nanos}", std::process::id()))
        .join(format!("{name}.json"))
}

#[test]
fn missing_file_starts_empty_and_flush_creates_it() {
    let path = scratch_path("fresh");
    let mut store = JsonProfileStore::open(&path);
    assert!(store.cache().is_empty());

    let _ = store.add_xp("Ash", 75);
    store.flush().expect("flush profiles");

    let reopened = JsonProfileStore::open(&path);
    assert_eq!(
        reopened.cache().get("Ash"),
        Some(Profile { xp: 75, level: 2 })
    );
    let _ = fs::remove_dir_all(path.parent().expect("scratch dir"));
}

#[test]
fn corrupt_file_is_ignored_and_replaced() {
    let path = scratch_path("corrupt");
    fs::create_dir_all(path.parent().expect("scratch dir")).expect("create scratch dir");
    fs::write(&path, "{ not json").expect("write corrupt file");

    let mut store = JsonProfileStore::open(&path);
    assert!(store.cache().is_empty());
    store.save_profile("Birch", Profile::with_xp(200));
    store.flush().expect("flush profiles");

    let raw = fs::read_to_string(&path).expect("read profile file");
    let decoded: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
    assert_eq!(
        decoded,
        serde_json::json!({ "Birch": { "xp": 200, "level": 3 } })
    );
    let _ = fs::remove_dir_all(path.parent().expect("scratch dir"));
}

#[test]
fn flush_without_changes_writes_nothing() {
    let path = scratch_path("idle");
    let mut store = JsonProfileStore::open(&path);
    store.flush().expect("flush profiles");
    assert!(!path.exists());
}
