//! One-shot facade functions driven end to end against a local API mock.

mod common;

use ai_report_rust::facade::{extract_design_brief, extract_report, generate_image, make_image_prompt};
use ai_report_rust::hashing::fingerprint_json;
use ai_report_rust::{DesignBrief, ErrorCategory};
use base64::Engine;
use common::*;
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::sync::{Mutex, MutexGuard};
use tempfile::TempDir;

// The facade reads its base URL from the process environment, which every
// test in this binary shares.
static ENV_LOCK: Mutex<()> = Mutex::new(());

struct ApiEnv {
    _guard: MutexGuard<'static, ()>,
}

impl ApiEnv {
    fn pointing_at(server: &ServerGuard) -> Self {
        let guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var("OPENAI_BASE_URL", server.url());
        for var in ["AI_HTTP_TIMEOUT_SECS", "AI_PROXY_URL", "AI_TEMPERATURE", "AI_MAX_CORRECTIONS"] {
            std::env::remove_var(var);
        }
        Self { _guard: guard }
    }
}

impl Drop for ApiEnv {
    fn drop(&mut self) {
        std::env::remove_var("OPENAI_BASE_URL");
        std::env::remove_var("AI_HTTP_TIMEOUT_SECS");
    }
}

fn completion(content: &str) -> String {
    json!({
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

#[tokio::test]
async fn test_extract_report_uses_model_and_temperature_and_caches() {
    let mut server = Server::new_async().await;
    let _env = ApiEnv::pointing_at(&server);
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(json!({"model": "gpt-4o", "temperature": 0.5})))
        .with_status(200)
        .with_body(completion(&valid_report().to_string()))
        .expect(1)
        .create_async()
        .await;
    let dir = TempDir::new().unwrap();

    let first = extract_report(TRANSCRIPT, "gpt-4o", 0.5, "sk-test", dir.path(), true)
        .await
        .unwrap();
    let second = extract_report(TRANSCRIPT, "gpt-4o", 0.5, "sk-test", dir.path(), true)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first.client_name, "Anna");
    assert_eq!(file_names(dir.path()), vec![format!("{}.json", sha256_hex(TRANSCRIPT))]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_extract_report_without_cache_calls_every_time() {
    let mut server = Server::new_async().await;
    let _env = ApiEnv::pointing_at(&server);
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(completion(&valid_report().to_string()))
        .expect(2)
        .create_async()
        .await;
    let dir = TempDir::new().unwrap();

    for _ in 0..2 {
        extract_report(TRANSCRIPT, "gpt-4o-mini", 0.0, "sk-test", dir.path(), false)
            .await
            .unwrap();
    }

    assert!(file_names(dir.path()).is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_extract_design_brief_runs_at_temperature_zero() {
    let mut server = Server::new_async().await;
    let _env = ApiEnv::pointing_at(&server);
    let mock = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJson(json!({"model": "gpt-4o-mini", "temperature": 0.0})))
        .with_status(200)
        .with_body(completion(&valid_brief().to_string()))
        .create_async()
        .await;
    let dir = TempDir::new().unwrap();

    let brief = extract_design_brief(TRANSCRIPT, "gpt-4o-mini", "sk-test", dir.path(), true)
        .await
        .unwrap();

    assert_eq!(brief.project_name, "Bakery site");
    assert_eq!(
        file_names(dir.path()),
        vec![format!("design_brief_{}.json", sha256_hex(TRANSCRIPT))]
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_make_image_prompt_sends_brief_and_caches_prompt() {
    let mut server = Server::new_async().await;
    let _env = ApiEnv::pointing_at(&server);
    let mock = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({"temperature": 0.0})),
            Matcher::Regex("Bakery site".to_string()),
        ]))
        .with_status(200)
        .with_body(completion("A warm rustic bakery homepage,\ncream tones"))
        .create_async()
        .await;
    let dir = TempDir::new().unwrap();
    let brief: DesignBrief = serde_json::from_value(valid_brief()).unwrap();

    let prompt = make_image_prompt(&brief, "gpt-4o-mini", "sk-test", dir.path(), true)
        .await
        .unwrap();

    assert_eq!(prompt, "A warm rustic bakery homepage, cream tones");
    let fp = fingerprint_json(&serde_json::to_value(&brief).unwrap());
    assert_eq!(file_names(dir.path()), vec![format!("image_prompt_{}.txt", fp.as_str())]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_generate_image_returns_design_path() {
    let mut server = Server::new_async().await;
    let _env = ApiEnv::pointing_at(&server);
    let png = b"\x89PNG fake image";
    let mock = server
        .mock("POST", "/images/generations")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-image-1",
            "size": "1024x1024",
            "prompt": "A warm rustic bakery homepage"
        })))
        .with_status(200)
        .with_body(
            json!({"data": [{"b64_json": base64::engine::general_purpose::STANDARD.encode(png)}]})
                .to_string(),
        )
        .expect(1)
        .create_async()
        .await;
    let dir = TempDir::new().unwrap();
    let prompt = "A warm rustic bakery homepage";

    let path = generate_image(prompt, "gpt-image-1", "1024x1024", "sk-test", dir.path())
        .await
        .unwrap();
    let again = generate_image(prompt, "gpt-image-1", "1024x1024", "sk-test", dir.path())
        .await
        .unwrap();

    assert_eq!(path, dir.path().join(format!("design_{}.png", sha256_hex(prompt))));
    assert_eq!(again, path);
    assert_eq!(std::fs::read(&path).unwrap(), png.to_vec());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_malformed_timeout_setting_is_rejected() {
    let mut server = Server::new_async().await;
    let _env = ApiEnv::pointing_at(&server);
    std::env::set_var("AI_HTTP_TIMEOUT_SECS", "soon");
    let mock = server
        .mock("POST", "/chat/completions")
        .expect(0)
        .create_async()
        .await;
    let dir = TempDir::new().unwrap();

    let err = extract_report(TRANSCRIPT, "gpt-4o-mini", 0.0, "sk-test", dir.path(), true)
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Configuration);
    assert_eq!(
        err.context().and_then(|c| c.field_path.as_deref()),
        Some("AI_HTTP_TIMEOUT_SECS")
    );
    mock.assert_async().await;
}
