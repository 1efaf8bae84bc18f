mod commands;
#[cfg(feature = "mcp")]
mod mcp;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use commands::GlobalOptions;

#[derive(Parser)]
#[command(name = "advisify")]
#[command(about = "Thesis adviser recommender", long_about = None)]
#[command(version)]
struct Cli {
    #[arg(long, global = true, help = "Config file (default: ./advisify.yaml)")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Adviser dataset CSV (overrides config)")]
    dataset: Option<PathBuf>,
    #[arg(short, long, global = true, help = "Debug logging to stderr")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend advisers for a thesis title
    #[command(alias = "rec")]
    Recommend {
        #[arg(default_value = "", help = "Thesis title (max 300 characters)")]
        title: String,
        #[arg(short = 't', long = "type", help = "Project type; repeat to add more")]
        project_types: Vec<String>,
        #[arg(long, short, help = "Number of advisers to show")]
        limit: Option<usize>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },

    /// Embed an adviser catalog into a dataset
    Index {
        #[arg(help = "CSV with name, area_of_expertise_description, past_thesis_topics_supervised")]
        input: Option<PathBuf>,
        #[arg(long, short, help = "Output dataset (default: configured dataset)")]
        output: Option<PathBuf>,
        #[arg(long, help = "Show dataset status only")]
        status: bool,
        #[arg(long, help = "JSON output")]
        json: bool,
    },

    /// List project types
    Types {
        #[arg(long, help = "JSON output")]
        json: bool,
    },

    // ===== MCP Server =====
    /// Start MCP server
    #[cfg(feature = "mcp")]
    Mcp {
        #[arg(long, help = "Show client configuration instructions")]
        install: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = GlobalOptions {
        config: cli.config,
        dataset: cli.dataset,
    };

    match cli.command {
        Commands::Recommend {
            title,
            project_types,
            limit,
            json,
        } => commands::recommend::run(&title, &project_types, limit, json, &options),
        Commands::Index {
            input,
            output,
            status,
            json,
        } => commands::index::run(input.as_deref(), output.as_deref(), status, json, &options),
        Commands::Types { json } => commands::types::run(json),

        // MCP Server
        #[cfg(feature = "mcp")]
        Commands::Mcp { install } => {
            if install {
                print_mcp_install_instructions();
                Ok(())
            } else {
                run_mcp_server(&options)
            }
        }
    }
}

/// Logs go to stderr so stdout stays clean for JSON output and MCP
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "advisify=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(feature = "mcp")]
fn run_mcp_server(options: &GlobalOptions) -> anyhow::Result<()> {
    let config = options.load_config()?;
    let engine = commands::open_engine(&config)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(mcp::run_mcp_server(engine, &config))
}

#[cfg(feature = "mcp")]
fn print_mcp_install_instructions() {
    use colored::Colorize;

    let workdir = std::env::current_dir()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| "/path/to/your/advisers".to_string());

    let binary_path = std::env::current_exe()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| "advisify".to_string());

    println!("{}", "MCP Server Installation Guide".bold().cyan());
    println!();
    println!("Add the following to your MCP client configuration:");
    println!();
    println!(r#"{{
  "mcpServers": {{
    "advisify": {{
      "command": "{}",
      "args": ["mcp"],
      "cwd": "{}"
    }}
  }}
}}"#, binary_path, workdir);
    println!();
    println!("The server reads {} and the dataset it names from that directory.", "advisify.yaml".cyan());
    println!();
    println!("{}", "Available tools:".bold());
    println!("  • {} - Rank advisers for a thesis title", "recommend_advisers".green());
    println!("  • {} - List advisers in the catalog", "list_advisers".green());
    println!("  • {} - List project types", "list_project_types".green());
}
