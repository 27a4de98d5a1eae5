//! ai-report：从对话记录生成结构化报告（JSON）的命令行工具
//!
//! Usage:
//!   ai-report [--input <path>] [--report-type client|design] [--output <path>]
//!             [--no-cache] [--log-level <level>]

use ai_report_rust::facade::{image_path, orchestrator_from_settings};
use ai_report_rust::{DesignBrief, ImagePrompt, ReportData, Settings};
use anyhow::{bail, Context};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReportType {
    Client,
    Design,
}

#[derive(Debug)]
struct Args {
    input: PathBuf,
    output: Option<PathBuf>,
    report_type: ReportType,
    use_cache: bool,
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let raw: Vec<String> = std::env::args().skip(1).collect();
    if raw.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return ExitCode::SUCCESS;
    }
    if raw.iter().any(|a| a == "--version" || a == "-V") {
        println!("ai-report {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!();
            print_usage();
            return ExitCode::from(2);
        }
    };

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            return ExitCode::FAILURE;
        }
    };

    init_logging(args.log_level.as_deref().unwrap_or(&settings.log_level));

    match run(&args, &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let message = match e.downcast_ref::<ai_report_rust::Error>() {
                Some(err) => err.user_message(),
                None => format!("{e:#}"),
            };
            error!(error = %format!("{e:#}"), "ai-report failed");
            eprintln!("\nError: {message}");
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    println!(
        r#"ai-report: structured reports from client dialogue transcripts

USAGE:
    ai-report [OPTIONS]

OPTIONS:
    --input <path>               Transcript file (default: fixtures/sample_transcript.txt)
    --report-type <client|design>
                                 Report to generate (default: client)
    --output <path>              Write the JSON result here instead of stdout
    --no-cache                   Ignore cached results and call the model
    --log-level <level>          debug, info, warn or error (default: LOG_LEVEL or info)
    --version                    Show version information
    --help                       Show this help message

ENVIRONMENT:
    OPENAI_API_KEY               API key (required)
    OPENAI_MODEL                 Text model (default: gpt-4o-mini)
    CACHE_DIR                    Cache directory (default: cache/ai_outputs)
    ASSETS_DIR                   Generated images (default: assets)"#
    );
}

fn parse_args(raw: &[String]) -> anyhow::Result<Args> {
    let mut args = Args {
        input: PathBuf::from("fixtures/sample_transcript.txt"),
        output: None,
        report_type: ReportType::Client,
        use_cache: true,
        log_level: None,
    };

    let mut iter = raw.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--input" => args.input = PathBuf::from(value_of(&mut iter, arg)?),
            "--output" => args.output = Some(PathBuf::from(value_of(&mut iter, arg)?)),
            "--report-type" => {
                args.report_type = match value_of(&mut iter, arg)?.as_str() {
                    "client" => ReportType::Client,
                    "design" => ReportType::Design,
                    other => bail!("unknown report type '{other}', expected client or design"),
                }
            }
            "--log-level" => args.log_level = Some(value_of(&mut iter, arg)?.to_lowercase()),
            "--no-cache" => args.use_cache = false,
            "--use-cache" => args.use_cache = true,
            other => bail!("unknown argument '{other}'"),
        }
    }
    Ok(args)
}

fn value_of<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> anyhow::Result<String> {
    iter.next()
        .cloned()
        .with_context(|| format!("{flag} requires a value"))
}

fn init_logging(level: &str) {
    let level = match level {
        "warning" => "warn",
        "critical" => "error",
        other => other,
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run(args: &Args, settings: &Settings) -> anyhow::Result<()> {
    info!(
        input = %args.input.display(),
        report_type = ?args.report_type,
        use_cache = args.use_cache,
        "ai-report starting"
    );

    let transcript = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read transcript {}", args.input.display()))?;
    eprintln!("[1/2] Read {} characters from {}", transcript.chars().count(), args.input.display());

    let orchestrator = orchestrator_from_settings(settings)?;
    let options = settings.produce_options().with_cache(args.use_cache);

    let output = match args.report_type {
        ReportType::Client => {
            eprintln!("[2/2] Analyzing dialogue...");
            let report: ReportData = orchestrator.produce(&transcript, &options).await?;
            eprintln!("  Client: {}", report.client_name);
            eprintln!("  Topic: {}", report.topic);
            serde_json::to_value(&report)?
        }
        ReportType::Design => {
            eprintln!("[2/2] Extracting design brief...");
            let design_options = settings.design_options().with_cache(args.use_cache);
            let brief: DesignBrief = orchestrator.produce(&transcript, &design_options).await?;
            eprintln!("  Project: {}", brief.project_name);

            let mut image_options = settings.image_options();
            image_options.use_cache = args.use_cache;
            let image = async {
                let prompt: ImagePrompt = orchestrator.produce_from(&brief, &design_options).await?;
                orchestrator.produce_image(&prompt, &image_options).await?;
                Ok::<_, ai_report_rust::Error>(prompt)
            }
            .await;

            match image {
                Ok(prompt) => {
                    let path = image_path(&settings.assets_dir, prompt.as_str());
                    eprintln!("  Image: {}", path.display());
                    json!({
                        "design_brief": brief,
                        "image_prompt": prompt.as_str(),
                        "image_path": path,
                        "image_failed": false,
                    })
                }
                Err(e) => {
                    // The brief is still useful without an illustration.
                    error!(error = %e, "image generation failed");
                    eprintln!("  Image failed: {}", e.user_message());
                    json!({
                        "design_brief": brief,
                        "image_prompt": null,
                        "image_path": null,
                        "image_failed": true,
                    })
                }
            }
        }
    };

    let rendered = serde_json::to_string_pretty(&output)?;
    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(path, rendered + "\n")
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Done: {}", path.display());
        }
        None => println!("{rendered}"),
    }
    info!("ai-report completed");
    Ok(())
}
