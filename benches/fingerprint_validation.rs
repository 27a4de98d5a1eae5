//! Benchmarks for the per-call hot path that runs before any network I/O
//!
//! This benchmark measures:
//! - Fingerprinting transcripts of different sizes
//! - Canonical JSON fingerprinting of a design brief
//! - Parsing and validating a report response, plain and fenced
//! - Rejecting an invalid response

use ai_report_rust::artifacts::ArtifactKind;
use ai_report_rust::hashing::{fingerprint_json, fingerprint_text};
use ai_report_rust::ReportData;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;

const SAMPLE_REPORT: &str = r#"{
  "client_name": "Anna",
  "topic": "Website",
  "main_request": "A 3-page site for a bakery",
  "sentiment": {"label": "positive", "score": 4},
  "summary": "The client wants a small site with online orders within two months.",
  "key_points": ["3 pages", "online orders", "limited budget"],
  "next_steps": ["Send an estimate", "Schedule a call"],
  "desired_timeline": "2 months",
  "budget_range": "limited",
  "core_requirements": ["order form", "menu page"]
}"#;

fn bench_fingerprint(c: &mut Criterion) {
    let mut group = c.benchmark_group("fingerprint");

    for size in [1_000usize, 10_000, 100_000] {
        let transcript = "Client: we need a website for the bakery.\n".repeat(size / 42 + 1);
        group.throughput(Throughput::Bytes(transcript.len() as u64));
        group.bench_with_input(BenchmarkId::new("text", size), &transcript, |b, t| {
            b.iter(|| black_box(fingerprint_text(black_box(t))))
        });
    }

    let brief = json!({
        "project_name": "Bakery site",
        "business": "Bakery",
        "site_goal": "Online orders",
        "target_audience": ["locals", "tourists"],
        "pages": ["Home", "Menu", "Contact"],
        "style_keywords": ["warm", "rustic"],
        "colors": ["cream", "brown"],
        "must_have": ["order form"],
        "avoid": ["stock photos"],
        "content_notes": null
    });
    group.bench_function("canonical_json", |b| {
        b.iter(|| black_box(fingerprint_json(black_box(&brief))))
    });

    group.finish();
}

fn bench_report_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("report_validation");
    group.throughput(Throughput::Bytes(SAMPLE_REPORT.len() as u64));

    group.bench_function("plain", |b| {
        b.iter(|| black_box(ReportData::parse(black_box(SAMPLE_REPORT))))
    });

    let fenced = format!("```json\n{}\n```", SAMPLE_REPORT);
    group.bench_function("fenced", |b| {
        b.iter(|| black_box(ReportData::parse(black_box(&fenced))))
    });

    let invalid = r#"{"client_name": "X", "sentiment": {"label": "bad", "score": 9}}"#;
    group.bench_function("invalid", |b| {
        b.iter(|| black_box(ReportData::parse(black_box(invalid))))
    });

    group.finish();
}

criterion_group!(benches, bench_fingerprint, bench_report_validation);
criterion_main!(benches);
