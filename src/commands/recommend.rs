//! Recommend command - rank advisers for a thesis title

use anyhow::Result;
use colored::Colorize;
use unicode_width::UnicodeWidthChar;

use super::{open_engine, GlobalOptions};
use advisify::core::project_types::unknown_project_types;
use advisify::core::query::MAX_TITLE_CHARS;
use advisify::{AdvisifyError, Query, ScoredAdviser};

const BAR_WIDTH: usize = 20;
const SNIPPET_WIDTH: usize = 100;

/// Run recommend command
pub fn run(
    title: &str,
    project_types: &[String],
    limit: Option<usize>,
    json: bool,
    options: &GlobalOptions,
) -> Result<()> {
    if title.chars().count() > MAX_TITLE_CHARS {
        eprintln!(
            "{} Thesis title is limited to {} characters",
            "Error:".red().bold(),
            MAX_TITLE_CHARS
        );
        std::process::exit(1);
    }

    let query = Query::new(title).with_tags(project_types);

    let unknown = unknown_project_types(query.tags());
    if !unknown.is_empty() {
        tracing::warn!(tags = ?unknown, "unknown project types");
        if !json {
            println!(
                "{} Not in the project type list: {} (see {})",
                "!".yellow(),
                unknown.join(", "),
                "advisify types".cyan()
            );
        }
    }

    let config = options.load_config()?;
    let engine = open_engine(&config)?;
    let limit = limit.unwrap_or(config.top_k);

    let results = match engine.recommend(&query, limit) {
        Ok(results) => results,
        Err(e) if e.is_user_error() => {
            report_failure(
                json,
                "Please enter your thesis title or select at least one project type.",
            );
            std::process::exit(1);
        }
        Err(e @ AdvisifyError::Embedding(_)) => {
            tracing::error!(error = %e, "embedding failed");
            report_failure(json, "Could not compute recommendations right now. Please try again.");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("{} No advisers to recommend", "→".dimmed());
        return Ok(());
    }

    println!(
        "{} {} recommended advisers for: {}",
        "→".dimmed(),
        results.len(),
        query.composed_text().trim().cyan()
    );
    println!();

    for (i, result) in results.iter().enumerate() {
        print_result(i + 1, result);
    }

    Ok(())
}

fn report_failure(json: bool, message: &str) {
    if json {
        println!("{}", serde_json::json!({ "error": message }));
    } else {
        eprintln!("{} {}", "!".yellow().bold(), message);
    }
}

fn print_result(rank: usize, result: &ScoredAdviser<'_>) {
    let adviser = result.adviser;

    println!(
        "{}. {} [{}]",
        rank.to_string().bold(),
        adviser.name.cyan().bold(),
        colored_percent(result.overall_similarity)
    );
    println!("   {}", truncate_display(&adviser.past_thesis_topics, SNIPPET_WIDTH).dimmed());
    println!("   {}", truncate_display(&adviser.expertise_description, SNIPPET_WIDTH).dimmed());
    println!();

    for (label, score) in [
        ("Area of Expertise Fit", result.expertise_similarity),
        ("Past Thesis Supervised Fit", result.past_thesis_similarity),
        ("Overall Match", result.overall_similarity),
    ] {
        println!(
            "   {:<28} {} {:>7}",
            label,
            progress_bar(score, BAR_WIDTH),
            percent(score)
        );
    }
    println!();
}

/// Score as a percentage rounded to two decimals
fn percent(score: f32) -> String {
    format!("{:.2}%", score * 100.0)
}

fn colored_percent(score: f32) -> colored::ColoredString {
    let text = percent(score);
    if score > 0.8 {
        text.green()
    } else if score > 0.6 {
        text.yellow()
    } else {
        text.dimmed()
    }
}

fn progress_bar(score: f32, width: usize) -> String {
    let filled = ((score.clamp(0.0, 1.0) * width as f32).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Cut `text` to at most `max_width` terminal columns, marking the cut with "..."
fn truncate_display(text: &str, max_width: usize) -> String {
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= max_width {
        return text.to_string();
    }

    let budget = max_width.saturating_sub(3);
    let mut width = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > budget {
            break;
        }
        width += w;
        out.push(c);
    }
    out.push_str("...");
    out
}
