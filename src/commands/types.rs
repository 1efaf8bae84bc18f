//! Types command - list the project types a query can carry

use anyhow::Result;
use colored::Colorize;

use advisify::PROJECT_TYPES;

pub fn run(json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(PROJECT_TYPES)?);
        return Ok(());
    }

    println!("{}", "Project Types".bold());
    println!("{}", "=".repeat(40));
    for project_type in PROJECT_TYPES {
        println!("  {} {}", "•".dimmed(), project_type.cyan());
    }
    println!();
    println!(
        "Pass one or more with {}, e.g. {}",
        "--type".cyan(),
        "advisify recommend \"Crop yield prediction\" --type \"Mobile App\"".dimmed()
    );

    Ok(())
}
