use courier_bridge::*;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory store that answers from a background thread.
#[derive(Default)]
struct MemoryStore {
    blobs: Mutex<HashMap<String, (String, Visibility)>>,
    failure: Mutex<Option<ErrorInfo>>,
}

impl MemoryStore {
    fn fail_with(&self, info: ErrorInfo) {
        *self.failure.lock() = Some(info);
    }

    fn insert_raw(&self, key: &str, blob: &str) {
        self.blobs.lock().insert(key.to_owned(), (blob.to_owned(), Visibility::Private));
    }

    fn visibility(&self, key: &str) -> Option<Visibility> {
        self.blobs.lock().get(key).map(|(_, v)| *v)
    }
}

impl RemoteStore for MemoryStore {
    fn get(&self, key: &str, on_success: OnSuccess<Option<String>>, on_failure: OnFailure) {
        let failure = self.failure.lock().clone();
        let value = self.blobs.lock().get(key).map(|(blob, _)| blob.clone());
        std::thread::spawn(move || match failure {
            Some(info) => on_failure(info),
            None => on_success(value),
        });
    }

    fn put(
        &self,
        key: &str,
        blob: String,
        visibility: Visibility,
        on_success: OnSuccess<()>,
        on_failure: OnFailure,
    ) {
        if let Some(info) = self.failure.lock().clone() {
            std::thread::spawn(move || on_failure(info));
            return;
        }
        self.blobs.lock().insert(key.to_owned(), (blob, visibility));
        std::thread::spawn(move || on_success(()));
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Progress {
    level: u32,
    unlocked: Vec<String>,
}

struct Unserializable;

impl Serialize for Unserializable {
    fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
        Err(serde::ser::Error::custom("refusing to serialize"))
    }
}

#[tokio::test]
async fn test_settles_from_another_thread() {
    let (completer, handle) = pending::<u64>();
    std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(10));
        completer.resolve(99);
    });

    assert_eq!(handle.await.unwrap(), 99);
}

#[tokio::test]
async fn test_racing_settlements_only_one_wins() {
    let (completer, handle) = pending::<usize>();
    let wins = Arc::new(AtomicUsize::new(0));

    let threads: Vec<_> = (0..8)
        .map(|i| {
            let completer = completer.clone();
            let wins = Arc::clone(&wins);
            std::thread::spawn(move || {
                let won = if i % 2 == 0 {
                    completer.resolve(i)
                } else {
                    completer.reject(format!("loser {i}").into())
                };
                if won {
                    wins.fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }

    assert_eq!(wins.load(Ordering::SeqCst), 1);
    assert!(handle.is_settled());
    let _ = handle.await;
}

#[tokio::test]
async fn test_call_success_and_late_failure_is_ignored() {
    let handle = call(3_u32, |n, on_success, on_failure| {
        on_success(n + 1);
        on_failure(ErrorInfo::new("too late"));
    });

    assert_eq!(handle.state(), OperationState::Resolved);
    assert_eq!(handle.await.unwrap(), 4);
}

#[tokio::test]
async fn test_call_failure_carries_code_and_details() {
    let handle = call((), |(), _on_success: OnSuccess<String>, on_failure| {
        on_failure(
            ErrorInfo::new("Invalid input")
                .with_code("InvalidParams")
                .with_detail("DisplayName", "too long"),
        );
    });

    let err = handle.await.unwrap_err();
    assert_eq!(err.remote_code(), Some("InvalidParams"));
    assert!(err.to_string().contains("DisplayName: too long"));
}

#[tokio::test]
async fn test_call_without_any_callback_is_abandoned() {
    let handle = call((), |(), on_success: OnSuccess<u8>, on_failure| {
        drop(on_success);
        drop(on_failure);
    });

    assert!(matches!(handle.await, Err(BridgeError::Abandoned { .. })));
}

#[tokio::test]
async fn test_cancel_before_settlement_rejects() {
    let (completer, handle) = pending::<u8>();
    assert!(handle.cancel());
    assert!(!completer.resolve(1));
    assert!(!handle.cancel());

    assert!(matches!(handle.await, Err(BridgeError::Cancelled { .. })));
}

#[tokio::test]
async fn test_cancel_after_settlement_keeps_outcome() {
    let (completer, handle) = pending::<u8>();
    completer.resolve(5);

    assert!(!handle.cancel());
    assert_eq!(handle.await.unwrap(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_rejects_and_late_settle_is_noop() {
    let (completer, handle) = pending::<u8>();

    let result = handle.timeout(Duration::from_secs(5)).await;

    assert!(matches!(result, Err(BridgeError::TimedOut { .. })));
    assert_eq!(completer.state(), OperationState::Rejected);
    assert!(!completer.resolve(1));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_returns_value_settled_in_time() {
    let (completer, handle) = pending::<u8>();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        completer.resolve(8);
    });

    assert_eq!(handle.timeout(Duration::from_secs(5)).await.unwrap(), 8);
}

#[tokio::test]
async fn test_chain_primary_failure_skips_secondary() {
    let ran = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&ran);

    let result = Pending::<u8>::rejected(ErrorInfo::new("login refused").into())
        .then_best_effort(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, BridgeError>(()) }
        })
        .await;

    assert!(result.unwrap_err().is_remote());
    assert_eq!(ran.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_chain_secondary_failure_keeps_primary_value() {
    let result = Pending::resolved("session")
        .then_best_effort(|_| async { Err::<(), _>(BridgeError::from("rename refused")) })
        .await;

    assert_eq!(result.unwrap(), "session");
}

#[tokio::test]
async fn test_chain_without_secondary_returns_primary() {
    type NoFollowUp = fn(&u8) -> std::future::Ready<Result<(), BridgeError>>;

    let result = chain_best_effort(Pending::resolved(4_u8), None::<NoFollowUp>).await;
    assert_eq!(result.unwrap(), 4);
}

#[tokio::test]
async fn test_chain_secondary_sees_primary_value() {
    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);

    let result = Pending::resolved(String::from("player-7"))
        .then_best_effort(move |id| {
            *sink.lock() = Some(id.clone());
            async { Ok::<_, BridgeError>(()) }
        })
        .await;

    assert_eq!(result.unwrap(), "player-7");
    assert_eq!(seen.lock().as_deref(), Some("player-7"));
}

#[tokio::test]
async fn test_json_store_save_then_load() {
    let store = JsonStore::new(MemoryStore::default());
    let progress = Progress { level: 3, unlocked: vec!["forest".into()] };

    store.save("progress", &progress).await.unwrap();
    let loaded: Option<Progress> = store.load("progress").await.unwrap();

    assert_eq!(loaded, Some(progress));
    assert_eq!(store.inner().visibility("progress"), Some(Visibility::Private));
}

#[tokio::test]
async fn test_json_store_public_visibility_is_forwarded() {
    let store = JsonStore::new(MemoryStore::default());
    store.save_with("badge", &"gold", Visibility::Public).await.unwrap();
    assert_eq!(store.inner().visibility("badge"), Some(Visibility::Public));
}

#[tokio::test]
async fn test_json_store_missing_key_is_none() {
    let store = JsonStore::new(MemoryStore::default());
    let loaded: Option<Progress> = store.load("nothing-here").await.unwrap();
    assert!(loaded.is_none());
}

#[tokio::test]
async fn test_json_store_malformed_blob_is_deserialize_error() {
    let store = JsonStore::new(MemoryStore::default());
    store.inner().insert_raw("progress", "{ not json");

    let err = store.load::<Progress>("progress").await.unwrap_err();

    assert!(matches!(err, BridgeError::Deserialize { .. }));
    assert!(!err.is_remote());
    assert_eq!(err.attached_context(), Some("key `progress`"));
}

#[tokio::test]
async fn test_json_store_remote_failure_is_remote_error() {
    let store = JsonStore::new(MemoryStore::default());
    store.inner().fail_with(ErrorInfo::new("throttled").with_code("APIRequestsDisabled"));

    let err = store.load::<Progress>("progress").await.unwrap_err();
    assert_eq!(err.remote_code(), Some("APIRequestsDisabled"));

    let err = store.save("progress", &1).await.unwrap_err();
    assert!(err.is_remote());
}

#[tokio::test]
async fn test_json_store_unserializable_value_is_rejected_locally() {
    let store = JsonStore::new(MemoryStore::default());

    let handle = store.save("broken", &Unserializable);
    assert_eq!(handle.state(), OperationState::Rejected);

    assert!(matches!(handle.await, Err(BridgeError::Serialize { .. })));
    assert!(store.inner().visibility("broken").is_none());
}

#[tokio::test]
async fn test_json_store_over_shared_arc() {
    let shared = Arc::new(MemoryStore::default());
    let store = JsonStore::new(Arc::clone(&shared));

    store.save("n", &7_u32).await.unwrap();
    assert_eq!(shared.visibility("n"), Some(Visibility::Private));
}
