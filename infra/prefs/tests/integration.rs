use courier_prefs::*;
use tempfile::TempDir;

#[tokio::test]
async fn test_in_memory_set_get_remove() {
    let prefs = Preferences::in_memory();
    assert!(prefs.is_empty());
    assert!(prefs.path().is_none());

    prefs.set("a", "1").await.unwrap();
    assert_eq!(prefs.get("a").as_deref(), Some("1"));
    assert!(prefs.contains("a"));

    assert!(prefs.remove("a").await.unwrap());
    assert!(!prefs.remove("a").await.unwrap());
    assert!(prefs.get("a").is_none());
}

#[tokio::test]
async fn test_file_values_survive_reconnect() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested/dir/prefs.json");

    let prefs = Preferences::builder().path(&path).connect().await.unwrap();
    prefs.set("PF_CustomId_v1", "device-1").await.unwrap();
    prefs.set("volume", "7").await.unwrap();
    assert!(prefs.remove("volume").await.unwrap());
    drop(prefs);

    let reopened = Preferences::builder().path(&path).connect().await.unwrap();
    assert_eq!(reopened.get("PF_CustomId_v1").as_deref(), Some("device-1"));
    assert!(!reopened.contains("volume"));
    assert_eq!(reopened.len(), 1);
}

#[tokio::test]
async fn test_file_is_plain_json_object() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("prefs.json");

    let prefs = Preferences::builder().path(&path).connect().await.unwrap();
    prefs.set("b", "2").await.unwrap();
    prefs.set("a", "1").await.unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value, serde_json::json!({ "a": "1", "b": "2" }));
}

#[tokio::test]
async fn test_missing_file_without_create_is_io_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("absent.json");

    let err = Preferences::builder().path(&path).create(false).connect().await.unwrap_err();
    assert!(matches!(err, PrefsError::Io { .. }));
}

#[tokio::test]
async fn test_corrupt_file_is_reported() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("prefs.json");
    std::fs::write(&path, "[1, 2, 3]").unwrap();

    let err = Preferences::builder().path(&path).connect().await.unwrap_err();
    assert!(matches!(err, PrefsError::Corrupt { .. }));
    assert!(err.attached_context().is_some_and(|c| c.contains("prefs.json")));
}

#[tokio::test]
async fn test_orphaned_temp_files_are_purged() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("prefs.json");
    let orphan = temp.path().join("prefs.json.courier-tmp.42");
    let unrelated = temp.path().join("other.json");
    std::fs::write(&orphan, "{").unwrap();
    std::fs::write(&unrelated, "{}").unwrap();

    let _prefs = Preferences::builder().path(&path).connect().await.unwrap();

    assert!(!orphan.exists());
    assert!(unrelated.exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sets_are_all_durable() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("prefs.json");
    let prefs = Preferences::builder().path(&path).connect().await.unwrap();

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let prefs = prefs.clone();
            tokio::spawn(async move { prefs.set(format!("k{i}"), i.to_string()).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let reopened = Preferences::builder().path(&path).connect().await.unwrap();
    assert_eq!(reopened.len(), 16);
    assert_eq!(reopened.get("k9").as_deref(), Some("9"));
}
