//! sourceline - keep a workspace of external data sources current
//!
//! Checks each active source against its upstream, downloads or integrates
//! new releases and runs the parse and export stages on them.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "sourceline")]
#[command(about = "Keep a workspace of external data sources up to date")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./sourceline.toml or ~/.config/sourceline/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Workspace root (overrides the config file)
    #[arg(short, long, global = true)]
    workspace: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Compare every active source against its upstream
    Status(cmd::status::StatusArgs),
    /// Update, parse and export every active source
    Update,
    /// Integrate files placed by hand for one source
    Integrate(cmd::integrate::IntegrateArgs),
    /// List registered data sources
    Sources,
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let progress = sourceline_core::ProgressContext::new();

    // Status and run summaries are reported through the logger, so stay at
    // info even on a TTY; spinners suspend around each line.
    let multi = progress.is_tty().then(|| progress.multi());
    sourceline_core::init_logging(false, cli.debug, multi);

    let config = if let Some(path) = &cli.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };
    let root = config.workspace_dir(cli.workspace.as_deref());
    let registry = cmd::registry();

    match cli.command {
        Command::Status(args) => cmd::status::run(args, &root, &registry),
        Command::Update => cmd::update::run(&root, &registry, &progress),
        Command::Integrate(args) => cmd::integrate::run(args, &root, &registry, &progress),
        Command::Sources => cmd::sources::run(&root, &registry),
        Command::Config => {
            use comfy_table::{
                Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
            };

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Setting").fg(Color::Cyan),
                    Cell::new("Value").fg(Color::Cyan),
                ]);

            table.add_row(vec![
                "Config file",
                &config
                    .loaded_from
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "none (defaults)".to_string()),
            ]);
            table.add_row(vec![
                "Default workspace",
                &config.workspace.default_dir.display().to_string(),
            ]);
            table.add_row(vec!["Effective workspace", &root.display().to_string()]);
            table.add_row(vec!["Registered sources", &registry.len().to_string()]);

            eprintln!("\n{table}");
            Ok(())
        }
    }
}
