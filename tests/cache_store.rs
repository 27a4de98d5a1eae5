//! CacheStore over the file backend: layout, validation on load, concurrency.

mod common;

use ai_report_rust::cache::{CacheBackend, CacheKey, CacheKind, CacheStore, FileCache};
use ai_report_rust::hashing::fingerprint_text;
use ai_report_rust::telemetry::{InMemoryObserver, NoopObserver};
use ai_report_rust::{DesignBrief, GeneratedImage, ImagePrompt, ReportData};
use bytes::Bytes;
use common::*;
use std::sync::Arc;
use tempfile::TempDir;

fn report() -> ReportData {
    serde_json::from_value(valid_report()).unwrap()
}

#[tokio::test]
async fn test_file_names_follow_kind_layout() {
    let dir = TempDir::new().unwrap();
    let cache_dir = dir.path().join("cache");
    let assets_dir = dir.path().join("assets");
    let store = CacheStore::on_disk(&cache_dir, &assets_dir, Arc::new(NoopObserver));
    let fp = fingerprint_text("input");
    let hash = sha256_hex("input");

    store.store(&fp, &report()).await.unwrap();
    store
        .store(&fp, &serde_json::from_value::<DesignBrief>(valid_brief()).unwrap())
        .await
        .unwrap();
    store
        .store(&fp, &ImagePrompt::new("a bakery").unwrap())
        .await
        .unwrap();
    store
        .store(&fp, &GeneratedImage::new(Bytes::from_static(b"png")))
        .await
        .unwrap();

    assert_eq!(
        file_names(&cache_dir),
        vec![
            format!("{hash}.json"),
            format!("design_brief_{hash}.json"),
            format!("image_prompt_{hash}.txt"),
        ]
    );
    assert_eq!(file_names(&assets_dir), vec![format!("design_{hash}.png")]);
}

#[tokio::test]
async fn test_report_is_stored_as_pretty_json() {
    let dir = TempDir::new().unwrap();
    let store = CacheStore::on_disk(dir.path(), dir.path(), Arc::new(NoopObserver));
    let fp = fingerprint_text("input");

    store.store(&fp, &report()).await.unwrap();

    let raw = std::fs::read_to_string(dir.path().join(format!("{}.json", fp.as_str()))).unwrap();
    assert!(raw.contains("\n  \"client_name\": \"Anna\""));
    let loaded: ReportData = serde_json::from_str(&raw).unwrap();
    assert_eq!(loaded, report());
}

#[tokio::test]
async fn test_exists_does_not_validate() {
    let dir = TempDir::new().unwrap();
    let observer = Arc::new(InMemoryObserver::new());
    let store = CacheStore::on_disk(dir.path(), dir.path(), observer.clone());
    let fp = fingerprint_text("input");
    std::fs::write(dir.path().join(format!("{}.json", fp.as_str())), "garbage").unwrap();

    assert!(store.exists::<ReportData>(&fp).await.unwrap());
    assert!(!store.exists::<DesignBrief>(&fp).await.unwrap());
    assert!(store.load::<ReportData>(&fp).await.unwrap().is_none());
    assert_eq!(observer.names(), vec!["cache_discarded"]);
}

#[tokio::test]
async fn test_out_of_range_score_is_discarded() {
    let dir = TempDir::new().unwrap();
    let store = CacheStore::on_disk(dir.path(), dir.path(), Arc::new(NoopObserver));
    let fp = fingerprint_text("input");
    let mut value = valid_report();
    value["sentiment"]["score"] = serde_json::json!(9);
    std::fs::write(
        dir.path().join(format!("{}.json", fp.as_str())),
        value.to_string(),
    )
    .unwrap();

    assert!(store.load::<ReportData>(&fp).await.unwrap().is_none());
    assert_eq!(store.stats().discarded, 1);
}

#[tokio::test]
async fn test_empty_image_file_is_discarded() {
    let dir = TempDir::new().unwrap();
    let store = CacheStore::on_disk(dir.path().join("cache"), dir.path().join("assets"), Arc::new(NoopObserver));
    let fp = fingerprint_text("prompt");
    std::fs::create_dir_all(dir.path().join("assets")).unwrap();
    std::fs::write(dir.path().join("assets").join(format!("design_{}.png", fp.as_str())), b"").unwrap();

    assert!(store.load::<GeneratedImage>(&fp).await.unwrap().is_none());
}

#[tokio::test]
async fn test_concurrent_writers_leave_one_complete_entry() {
    let dir = TempDir::new().unwrap();
    let store = CacheStore::on_disk(dir.path(), dir.path(), Arc::new(NoopObserver));
    let fp = fingerprint_text("input");

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        let fp = fp.clone();
        handles.push(tokio::spawn(async move {
            let mut r = report();
            r.summary = format!("writer {i}");
            store.store(&fp, &r).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(file_names(dir.path()), vec![format!("{}.json", fp.as_str())]);
    let loaded = store.load::<ReportData>(&fp).await.unwrap().unwrap();
    assert!(loaded.summary.starts_with("writer "));
}

#[tokio::test]
async fn test_file_backend_put_creates_missing_directories() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("a").join("b");
    let backend = FileCache::new(&nested);
    let key = CacheKey::new(CacheKind::ImagePrompt, fingerprint_text("x"));

    backend.put(&key, b"hello").await.unwrap();
    assert_eq!(backend.get(&key).await.unwrap().as_deref(), Some(&b"hello"[..]));
    assert!(nested.join(key.file_name()).is_file());
}
