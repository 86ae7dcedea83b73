// ABOUTME: Tests for TableSource implementations.
// ABOUTME: Producers must be invoked fresh on every resolve.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::*;
use crate::model::{PermissionEntry, PermissionKey, PermissionTable};

fn granted_table() -> PermissionTable {
    PermissionTable::new()
        .with_entry("docs.read", PermissionEntry::granted())
        .unwrap()
}

#[tokio::test]
async fn test_plain_table_borrows() {
    let table = granted_table();
    let resolved = table.resolve().await.unwrap();
    assert!(matches!(resolved, std::borrow::Cow::Borrowed(_)));
    assert_eq!(*resolved, table);
}

#[tokio::test]
async fn test_arc_table() {
    let table = Arc::new(granted_table());
    let resolved = table.resolve().await.unwrap();
    assert_eq!(&*resolved, table.as_ref());
}

#[tokio::test]
async fn test_sync_producer_called_each_time() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let source = table_fn(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        granted_table()
    });

    source.resolve().await.unwrap();
    source.resolve().await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_async_producer() {
    let source = table_async(|| async {
        tokio::task::yield_now().await;
        Ok::<_, anyhow::Error>(granted_table())
    });

    let resolved = source.resolve().await.unwrap();
    let key = PermissionKey::parse("docs.read").unwrap();
    assert_eq!(resolved.entry(&key), Some(&PermissionEntry::granted()));
}

#[tokio::test]
async fn test_async_producer_error() {
    let source = table_async(|| async {
        Err::<PermissionTable, _>(anyhow::anyhow!("store unavailable"))
    });

    let err = source.resolve().await.unwrap_err();
    assert_eq!(err.to_string(), "store unavailable");
}
