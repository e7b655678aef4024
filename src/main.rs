use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use claudesync::dropped::{self, DroppedFilePayload};
use claudesync::editor::{self, ConfigAction};
use claudesync::logger;
use claudesync::planner::{self, RemoteFileIndex, SyncMode, SyncOperation};
use claudesync::project::ProjectConfig;
use claudesync::scanner::{Scanner, ScanWarning};
use claudesync::selection::{self, ResolvedFile};
use claudesync::tree;

#[derive(Parser)]
#[command(name = "claudesync")]
#[command(about = "Sync a local file tree with a Claude.ai project knowledge base", long_about = None)]
#[command(version)]
struct Cli {
    /// Project root directory (defaults to the current directory)
    #[arg(short, long, global = true, default_value = ".")]
    path: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a project configuration in the project directory
    Init {
        /// Remote project name
        #[arg(short, long)]
        name: String,

        /// Remote project description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Scan the project and show what would be synced
    Status {
        /// List every file with its inclusion decision
        #[arg(long)]
        show_files: bool,
    },

    /// Print the aggregated size/inclusion tree as JSON
    Tree {
        /// Emit the flattened parallel-array form for the visualization layer
        #[arg(long)]
        flat: bool,
    },

    /// Diff the selected files against a remote file index
    Plan {
        /// JSON file mapping remote paths to content fingerprints
        remote_index: PathBuf,

        /// Sync mode: one-way or two-way
        #[arg(short, long, default_value = "one-way")]
        mode: SyncMode,

        /// Mark remote-only files as deletable (one-way mode)
        #[arg(long)]
        prune: bool,

        /// Emit the plan as JSON instead of human-readable output
        #[arg(long)]
        json: bool,
    },

    /// Edit include/exclude patterns
    Config {
        /// Action: add-include, remove-include, add-exclude or remove-exclude
        action: Option<String>,

        /// The pattern to add or remove
        pattern: Option<String>,

        /// Show the current configuration
        #[arg(long)]
        show: bool,
    },

    /// Match dropped file blobs against the scanned file universe
    ResolveDropped {
        /// JSON file with a list of {name, content, size} entries
        payload: PathBuf,
    },
}

fn main() -> Result<()> {
    logger::init_logger()?;
    logger::rotate_log_if_needed()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { name, description } => init_project(&cli.path, &name, &description),
        Commands::Status { show_files } => show_status(&cli.path, show_files),
        Commands::Tree { flat } => print_tree(&cli.path, flat),
        Commands::Plan {
            remote_index,
            mode,
            prune,
            json,
        } => print_plan(&cli.path, &remote_index, mode, prune, json),
        Commands::Config {
            action,
            pattern,
            show,
        } => edit_config(&cli.path, action.as_deref(), pattern.as_deref(), show),
        Commands::ResolveDropped { payload } => resolve_dropped(&cli.path, &payload),
    }
}

fn init_project(root: &Path, name: &str, description: &str) -> Result<()> {
    let config_path = ProjectConfig::config_path(root);
    if config_path.exists() {
        anyhow::bail!("Project already initialized: {}", config_path.display());
    }

    let config = ProjectConfig {
        name: name.to_string(),
        description: description.to_string(),
        ..Default::default()
    };
    config.save(root)?;

    println!("{} {}", "Initialized project".green(), name.bold());
    println!(
        "  {}",
        format!("config written to {}", config_path.display()).dimmed()
    );
    println!("  Add patterns with: claudesync config add-include 'src/**'");
    Ok(())
}

/// Scan and resolve with the stored project config.
fn scan_and_resolve(
    root: &Path,
) -> Result<(ProjectConfig, Vec<ResolvedFile>, Vec<ScanWarning>)> {
    let config = ProjectConfig::load(root)?;
    let outcome = Scanner::for_project(root, &config).scan()?;
    let resolved = selection::resolve(&outcome.files, &config);
    Ok((config, resolved, outcome.warnings))
}

fn show_status(root: &Path, show_files: bool) -> Result<()> {
    let (config, resolved, warnings) = scan_and_resolve(root)?;

    let included: Vec<_> = resolved.iter().filter(|f| f.included).collect();
    let included_size: u64 = included.iter().map(|f| f.record.size_bytes).sum();
    let total_size: u64 = resolved.iter().map(|f| f.record.size_bytes).sum();

    println!("{}", format!("Project: {}", config.name).bold());
    println!(
        "  {}: {} of {} scanned files ({} of {})",
        "In scope".cyan(),
        included.len(),
        resolved.len(),
        human_size(included_size),
        human_size(total_size)
    );

    if show_files {
        for file in &resolved {
            let marker = if file.included {
                "+".green()
            } else {
                "-".dimmed()
            };
            println!("  {} {}", marker, file.record.relative_path);
        }
    }

    if !warnings.is_empty() {
        println!("{}", format!("Warnings ({}):", warnings.len()).yellow());
        for warning in &warnings {
            println!("  {} {}: {}", "!".yellow(), warning.path, warning.message);
        }
    }

    Ok(())
}

fn print_tree(root: &Path, flat: bool) -> Result<()> {
    let (config, resolved, _warnings) = scan_and_resolve(root)?;
    let root_node = tree::build(&resolved, &config.name);

    let output = if flat {
        serde_json::to_string_pretty(&tree::flatten(&root_node))?
    } else {
        serde_json::to_string_pretty(&root_node)?
    };
    println!("{output}");
    Ok(())
}

fn print_plan(
    root: &Path,
    remote_index_path: &Path,
    mode: SyncMode,
    prune: bool,
    json: bool,
) -> Result<()> {
    let content = std::fs::read_to_string(remote_index_path).with_context(|| {
        format!("Failed to read remote index: {}", remote_index_path.display())
    })?;
    let remote: RemoteFileIndex =
        serde_json::from_str(&content).context("Failed to parse remote index")?;

    let (_config, resolved, _warnings) = scan_and_resolve(root)?;
    let plan = planner::plan(&resolved, &remote, mode);

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    for op in &plan.operations {
        match op {
            SyncOperation::Upload { path, .. } => println!("  {} {}", "upload".green(), path),
            SyncOperation::Noop { path } => println!("  {} {}", "noop  ".dimmed(), path),
            SyncOperation::Delete { path } => println!("  {} {}", "delete".red().bold(), path),
        }
    }

    // Deletions are destructive; they are never acted on implicitly.
    let deletions = plan.deletions().count();
    if deletions > 0 && !prune {
        println!(
            "{}",
            format!(
                "{deletions} remote file(s) would be deleted; pass --prune to mark them for deletion"
            )
            .yellow()
        );
    }

    if !plan.remote_additions.is_empty() {
        println!("{}", "Remote additions (left untouched):".bold());
        for path in &plan.remote_additions {
            println!("  {} {}", "remote".cyan(), path);
        }
    }

    if plan.is_settled() && plan.remote_additions.is_empty() {
        println!("{}", "Everything up to date".green());
    }

    Ok(())
}

fn edit_config(
    root: &Path,
    action: Option<&str>,
    pattern: Option<&str>,
    show: bool,
) -> Result<()> {
    let config = ProjectConfig::load(root)?;

    if show || action.is_none() {
        println!("{}", "Current Project Configuration:".bold());
        println!("  {}: {}", "Name".cyan(), config.name);
        println!("  {}: {:?}", "Includes".cyan(), config.includes);
        println!("  {}: {:?}", "Excludes".cyan(), config.excludes);
        println!("  {}: {:?}", "Push roots".cyan(), config.push_roots);
        println!("  {}: {}", "Use ignore files".cyan(), config.use_ignore_files);
        return Ok(());
    }

    let action: ConfigAction = action.context("an action argument is required")?.parse()?;
    let pattern = pattern.context("a pattern argument is required")?;

    // The editor returns a new config; the stored file is replaced only
    // after the edit validates.
    let next = editor::apply(&config, action, pattern)?;
    next.save(root)?;

    println!("{}", format!("Applied {action:?} {pattern:?}").green());
    Ok(())
}

fn resolve_dropped(root: &Path, payload_path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(payload_path)
        .with_context(|| format!("Failed to read payload: {}", payload_path.display()))?;
    let payload: Vec<DroppedFilePayload> =
        serde_json::from_str(&content).context("Failed to parse dropped-file payload")?;

    let config = ProjectConfig::load(root)?;
    let outcome = Scanner::for_project(root, &config).scan()?;

    let response = dropped::resolve_payload(&payload, &outcome.files);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn human_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}
