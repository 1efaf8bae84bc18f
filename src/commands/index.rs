//! Index command - embed an adviser catalog into a dataset

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use super::GlobalOptions;
use advisify::{Embedder, HtpEmbedder, VectorStore};

/// Run index command
pub fn run(
    input: Option<&Path>,
    output: Option<&Path>,
    status_only: bool,
    json: bool,
    options: &GlobalOptions,
) -> Result<()> {
    let config = options.load_config()?;

    if status_only {
        return show_status(&config.dataset, json);
    }

    let Some(input) = input else {
        eprintln!(
            "{} No input CSV given. Usage: {}",
            "Error:".red().bold(),
            "advisify index <advisers.csv> [--output dataset.csv]".cyan()
        );
        std::process::exit(1);
    };
    let output = output.unwrap_or(config.dataset.as_path());

    if !json {
        println!("{} Embedding advisers from {}...", "→".dimmed(), input.display());
    }

    let start = std::time::Instant::now();
    let embedder = HtpEmbedder::new();
    let file = std::fs::File::open(input)
        .with_context(|| format!("Failed to open {}", input.display()))?;
    let store = VectorStore::embed_from_reader(file, &embedder)
        .with_context(|| format!("Failed to embed {}", input.display()))?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let out = std::fs::File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    store.write_csv(out)?;

    let duration_ms = start.elapsed().as_millis();
    tracing::info!(advisers = store.len(), output = %output.display(), "dataset written");

    if json {
        println!(
            "{}",
            serde_json::json!({
                "advisers": store.len(),
                "dimension": store.dimension(),
                "output": output.display().to_string(),
                "duration_ms": duration_ms,
            })
        );
    } else {
        println!(
            "{} Embedded {} advisers in {:.2}s",
            "✓".green().bold(),
            store.len().to_string().cyan(),
            duration_ms as f64 / 1000.0
        );
        println!("  {} Dataset saved to: {}", "→".dimmed(), output.display());
    }

    Ok(())
}

/// Show dataset status
fn show_status(dataset: &Path, json: bool) -> Result<()> {
    if !dataset.exists() {
        if json {
            println!(
                "{}",
                serde_json::json!({
                    "exists": false,
                    "error": "Dataset not found",
                    "path": dataset.display().to_string(),
                })
            );
        } else {
            println!(
                "{} Dataset not found at {}. Run {} first.",
                "!".yellow().bold(),
                dataset.display(),
                "advisify index <advisers.csv>".cyan()
            );
        }
        return Ok(());
    }

    let store = VectorStore::load(dataset)
        .with_context(|| format!("Failed to load adviser dataset {}", dataset.display()))?;
    let compatible = store.dimension() == HtpEmbedder::new().dimension();
    let file_size = std::fs::metadata(dataset).map(|m| m.len()).unwrap_or(0);

    if json {
        println!(
            "{}",
            serde_json::json!({
                "exists": true,
                "path": dataset.display().to_string(),
                "advisers": store.len(),
                "dimension": store.dimension(),
                "compatible": compatible,
                "file_size_bytes": file_size,
            })
        );
    } else {
        println!("{}", "Dataset Status".bold());
        println!();
        println!("  {} {} advisers", "→".dimmed(), store.len().to_string().cyan());
        println!("  {} {} dimensions", "→".dimmed(), store.dimension().to_string().cyan());
        println!("  {} Size: {:.2} KB", "→".dimmed(), file_size as f64 / 1024.0);
        if compatible {
            println!("  {} Matches the built-in embedder", "✓".green());
        } else {
            println!(
                "  {} Dimension differs from the built-in embedder; re-run {}",
                "✗".red(),
                "advisify index".cyan()
            );
        }
    }

    Ok(())
}
