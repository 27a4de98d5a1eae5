//! Shared fixtures for integration tests: scripted generators and a broken cache backend.

#![allow(dead_code)]

use ai_report_rust::cache::{CacheBackend, CacheError, CacheKey};
use ai_report_rust::transport::{
    GenerationRequest, ImageGenerator, ImageRequest, TextGenerator, TransportError,
};
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Mutex;

pub const TRANSCRIPT: &str = "Client wants a 3-page site, budget limited, deadline 2 months";

/// Replays a fixed list of responses; the last one repeats once the list runs out.
pub struct ScriptedGenerator {
    script: Vec<Result<String, TransportError>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn new(script: Vec<Result<String, TransportError>>) -> Self {
        assert!(!script.is_empty(), "script needs at least one response");
        Self {
            script,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replies(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn always(reply: &str) -> Self {
        Self::replies(&[reply])
    }

    pub fn failing(error: TransportError) -> Self {
        Self::new(vec![Err(error)])
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, request: &GenerationRequest) -> Result<String, TransportError> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        let idx = (requests.len() - 1).min(self.script.len() - 1);
        self.script[idx].clone()
    }
}

/// Returns the same image result for every call.
pub struct ScriptedImages {
    reply: Result<Bytes, TransportError>,
    requests: Mutex<Vec<ImageRequest>>,
}

impl ScriptedImages {
    pub fn new(reply: Result<Bytes, TransportError>) -> Self {
        Self {
            reply,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ImageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageGenerator for ScriptedImages {
    async fn generate_image(&self, request: &ImageRequest) -> Result<Bytes, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.reply.clone()
    }
}

/// Backend whose reads and/or writes always fail with an I/O error.
pub struct BrokenBackend {
    pub fail_reads: bool,
    pub fail_writes: bool,
}

fn broken(operation: &'static str) -> CacheError {
    CacheError::io(
        operation,
        "/unavailable",
        std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only file system"),
    )
}

#[async_trait]
impl CacheBackend for BrokenBackend {
    async fn get(&self, _key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError> {
        if self.fail_reads {
            Err(broken("read"))
        } else {
            Ok(None)
        }
    }

    async fn put(&self, _key: &CacheKey, _value: &[u8]) -> Result<(), CacheError> {
        if self.fail_writes {
            Err(broken("write"))
        } else {
            Ok(())
        }
    }

    async fn exists(&self, _key: &CacheKey) -> Result<bool, CacheError> {
        Ok(false)
    }

    fn name(&self) -> &'static str {
        "broken"
    }
}

pub fn valid_report() -> Value {
    json!({
        "client_name": "Anna",
        "topic": "Website",
        "main_request": "A 3-page site",
        "sentiment": {"label": "neutral", "score": 3},
        "summary": "The client needs a small site on a limited budget within 2 months.",
        "key_points": ["3 pages", "limited budget", "2 month deadline"],
        "next_steps": ["Send an estimate"],
        "desired_timeline": "2 months",
        "budget_range": "limited budget",
        "core_requirements": ["3 pages"]
    })
}

pub fn valid_brief() -> Value {
    json!({
        "project_name": "Bakery site",
        "business": "Bakery",
        "site_goal": "Online orders",
        "target_audience": ["locals"],
        "pages": ["Home", "Menu", "Contact"],
        "style_keywords": ["warm", "rustic"],
        "colors": ["cream"],
        "must_have": ["order form"],
        "avoid": ["stock photos"],
        "content_notes": null
    })
}

pub fn sha256_hex(data: &str) -> String {
    Sha256::digest(data.as_bytes())
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Sorted file names in `dir`; empty when the directory does not exist.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}
