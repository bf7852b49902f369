// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (warnings and diagnostics go to stderr)
// 3. Dispatch to the appropriate subcommand handler
// 4. Print results to stdout, as text or JSON
// 5. Exit with proper code (0 = success, 1 = broken links, 2 = error,
//    130 = interrupted)
// =============================================================================

mod checker; // src/checker/ - link classification and checking
mod cli; // src/cli.rs - command-line parsing
mod error; // src/error.rs - fatal error types
mod markdown; // src/markdown/ - heading and link enumeration
mod partition; // src/partition/ - explode and assemble
mod slug; // src/slug.rs - heading text -> file name / anchor

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use checker::{BrokenReason, CheckOptions, CheckReport, LinkCheckResult, LinkVerdict, SkipReason};
use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Explode {
            input,
            output_dir,
            json,
        } => {
            let output_dir = output_dir.unwrap_or_else(|| default_explode_dir(&input));
            handle_explode(&input, &output_dir, json)
        }
        Commands::Assemble { dir, output, json } => {
            let output = output.unwrap_or_else(|| default_assemble_output(&dir));
            handle_assemble(&dir, &output, json)
        }
        Commands::CheckLinks {
            input,
            recursive,
            json,
            timeout,
            concurrency,
        } => {
            let options = CheckOptions {
                recursive,
                timeout: Duration::from_secs(timeout),
                concurrency,
            };
            handle_check_links(&input, &options, json).await
        }
    }
}

fn setup_logging(verbosity: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = log_filter(verbosity, rust_log.as_deref());

    // stderr, so JSON on stdout stays clean
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_names(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

// RUST_LOG applies when no -v is given; an explicit -v wins over it.
// Verbosity 0 -> WARN, 1 -> INFO, 2 -> DEBUG, 3+ -> TRACE
fn log_filter(verbosity: u8, rust_log: Option<&str>) -> EnvFilter {
    if let Some(directives) = rust_log.filter(|d| !d.trim().is_empty()) {
        if verbosity == 0 {
            return EnvFilter::new(directives);
        }
    }

    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    EnvFilter::default().add_directive(level.into())
}

// guide.md -> guide/ ; an input without extension gets a "-sections" suffix
fn default_explode_dir(input: &Path) -> PathBuf {
    let dir = input.with_extension("");
    if dir == input {
        let name = input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        input.with_file_name(format!("{}-sections", name))
    } else {
        dir
    }
}

// guide/ -> guide.md next to it
fn default_assemble_output(dir: &Path) -> PathBuf {
    match dir.file_name() {
        Some(name) => dir.with_file_name(format!("{}.md", name.to_string_lossy())),
        None => PathBuf::from("assembled.md"),
    }
}

fn handle_explode(input: &Path, output_dir: &Path, json: bool) -> Result<i32> {
    let summary = partition::explode(input, output_dir)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(0);
    }

    match &summary.index {
        None => println!("⚠️  No sections found in {}; nothing written", input.display()),
        Some(index) => {
            println!(
                "📄 Found {} section(s) in {}",
                summary.sections_found,
                input.display()
            );
            println!("   ✅ Written: {}", summary.written.len());
            if !summary.failed.is_empty() {
                println!("   ❌ Failed: {}", summary.failed.len());
                for path in &summary.failed {
                    println!("      {}", path.display());
                }
            }
            if !summary.unlinked.is_empty() {
                println!("   ⚠️  Not linked from the index: {}", summary.unlinked.len());
                for path in &summary.unlinked {
                    println!("      {}", path.display());
                }
            }
            println!("   📋 Index: {}", index.display());
        }
    }

    Ok(0)
}

fn handle_assemble(dir: &Path, output: &Path, json: bool) -> Result<i32> {
    let summary = partition::assemble(dir, output)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(0);
    }

    println!(
        "📄 Assembled \"{}\" from {} section(s)",
        summary.title,
        summary.included.len()
    );
    if !summary.missing.is_empty() {
        println!("   ⚠️  Skipped {} missing section file(s):", summary.missing.len());
        for path in &summary.missing {
            println!("      {}", path.display());
        }
    }
    println!("   📋 Output: {}", summary.output.display());

    Ok(0)
}

async fn handle_check_links(input: &Path, options: &CheckOptions, json: bool) -> Result<i32> {
    if !json {
        println!("🔍 Checking links in {}", input.display());
        if options.recursive {
            println!("📊 Following local Markdown links");
        }
    }

    // Ctrl-C drops the scan future, which abandons any in-flight requests.
    // Nothing is written to disk by a link check, so there is nothing to
    // clean up.
    let report = tokio::select! {
        report = checker::check_document(input, options) => report?,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("Interrupted");
            return Ok(130);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.has_broken_links() {
        Ok(1) // Exit code 1 = broken links found
    } else {
        Ok(0)
    }
}

// Prints one table per scanned document, then the overall summary
fn print_report(report: &CheckReport) {
    for document in &report.documents {
        println!("\n📄 {}", document.source.display());
        if document.results.is_empty() {
            println!("   No links found");
            continue;
        }
        print_table(&document.results);
    }

    println!();
    println!("📊 Summary:");
    println!("   📄 Documents: {}", report.visited.len());
    println!("   ✅ OK: {}", report.summary.ok);
    println!("   ❌ Broken: {}", report.summary.broken);
    println!("   ⏭️  Skipped: {}", report.summary.skipped);
    println!("   📋 Total: {}", report.summary.total);
}

fn print_table(results: &[LinkCheckResult]) {
    println!("{:<60} {:<24} {:<30}", "URL", "STATUS", "MESSAGE");
    println!("{}", "=".repeat(114));

    for result in results {
        let message = result.message.as_deref().unwrap_or("");

        // Truncate URL if too long for display (on a char boundary)
        let url_display = if result.url.chars().count() > 57 {
            let head: String = result.url.chars().take(57).collect();
            format!("{}...", head)
        } else {
            result.url.clone()
        };

        println!(
            "{:<60} {:<24} {:<30}",
            url_display,
            format_verdict(&result.verdict),
            message
        );
    }
}

fn format_verdict(verdict: &LinkVerdict) -> String {
    match verdict {
        LinkVerdict::Ok => "✅ OK".to_string(),
        LinkVerdict::Broken(BrokenReason::FileNotFound) => "❌ FILE NOT FOUND".to_string(),
        LinkVerdict::Broken(BrokenReason::StatusCode(code)) => format!("❌ HTTP {}", code),
        LinkVerdict::Broken(BrokenReason::Unreachable) => "🌐 UNREACHABLE".to_string(),
        LinkVerdict::Skipped(SkipReason::Email) => "⏭️  SKIPPED (email)".to_string(),
        LinkVerdict::Skipped(SkipReason::UnsupportedScheme(scheme)) => {
            format!("⏭️  SKIPPED ({})", scheme)
        }
    }
}
