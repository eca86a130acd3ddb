use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indexmap::IndexMap;
use runcheck_engine::{
    DispatchForm, DispatchInputError, ListingSelection, WorkflowListing, analyze_workflow, build_listing, collect_workflow_files,
    extract_dispatch, parse_workflow, resolve_dispatch_inputs, snapshot_labels,
};
use runcheck_types::{AgentLabelSet, WorkflowEntry};
use tracing::debug;

mod config;
mod git_refs;
mod sources;

use config::{RuncheckConfig, load_config};
use sources::{ConfiguredAgents, DirectoryWorkflowSource, SharedCheckouts, read_workflow_file};

#[derive(Debug, Parser)]
#[command(name = "runcheck", version, about = "Static checks for automation workflow files")]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the workflows of a repository with their diagnostics.
    List(ListArgs),
    /// Evaluate individual workflow files.
    Check(CheckArgs),
    /// Validate a manual-run submission against a workflow's inputs.
    Dispatch(DispatchArgs),
}

#[derive(Debug, Args)]
struct LabelArgs {
    /// Extra agent label treated as online (repeatable).
    #[arg(long = "label", value_name = "LABEL")]
    labels: Vec<String>,
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Repository checkout to scan.
    #[arg(long, default_value = ".")]
    repo_root: PathBuf,
    /// Workflow file name to select; prints its manual-run form.
    #[arg(long)]
    workflow: Option<String>,
    #[command(flatten)]
    labels: LabelArgs,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct CheckArgs {
    #[arg(required = true)]
    files: Vec<PathBuf>,
    #[command(flatten)]
    labels: LabelArgs,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct DispatchArgs {
    file: PathBuf,
    /// Input value as KEY=VALUE (repeatable).
    #[arg(long = "input", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    inputs: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::List(args) => run_list(&config, &args),
        Command::Check(args) => run_check(&config, &args),
        Command::Dispatch(args) => run_dispatch(&args),
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn agent_labels(config: &RuncheckConfig, extra: &LabelArgs) -> Result<AgentLabelSet> {
    let labels = snapshot_labels(&ConfiguredAgents::new(&config.agents))?;
    Ok(labels.union(extra.labels.iter().cloned()))
}

fn run_list(config: &RuncheckConfig, args: &ListArgs) -> Result<ExitCode> {
    let repository = match &config.repository {
        Some(name) => name.clone(),
        None => repository_name(&args.repo_root)?,
    };
    let own = DirectoryWorkflowSource::new(&args.repo_root, &config.workflow_dirs);
    let shared_roots: HashMap<String, PathBuf> = config
        .global_workflows
        .iter()
        .map(|global| (global.required.repository.clone(), global.path.clone()))
        .collect();
    let shared = SharedCheckouts::new(shared_roots, &config.workflow_dirs);
    let required: Vec<_> = config.global_workflows.iter().map(|global| global.required.clone()).collect();

    let files = collect_workflow_files(&own, &shared, &repository, &required)?;
    let labels = agent_labels(config, &args.labels)?;
    debug!(repository = %repository, workflows = files.len(), labels = labels.len(), "listing workflows");

    let selection = ListingSelection {
        workflow: args.workflow.clone(),
        disabled: config.disabled_workflows.clone(),
    };
    let listing = build_listing(&files, &labels, &config.locale, &selection);

    let form = match listing.selected.as_ref().and_then(|selected| selected.dispatch.clone()) {
        Some(schema) => {
            let default_branch = config
                .default_branch
                .clone()
                .or_else(|| git_refs::head_branch(&args.repo_root))
                .unwrap_or_else(|| "main".to_string());
            let branches = git_refs::branch_names(&args.repo_root)?;
            let tags = git_refs::tag_names(&args.repo_root)?;
            Some(DispatchForm::new(schema, branches, &default_branch, tags))
        }
        None => None,
    };

    match args.format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "repository": repository,
                "workflows": listing.workflows,
                "selected": listing.selected,
                "dispatchForm": form,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => print_listing(&listing, form.as_ref()),
    }
    Ok(ExitCode::SUCCESS)
}

fn run_check(config: &RuncheckConfig, args: &CheckArgs) -> Result<ExitCode> {
    let entries = check_files(config, args)?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Text => {
            for entry in &entries {
                print_entry(entry);
            }
        }
    }

    if entries.iter().all(|entry| entry.diagnostic.is_none()) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn check_files(config: &RuncheckConfig, args: &CheckArgs) -> Result<Vec<WorkflowEntry>> {
    let labels = agent_labels(config, &args.labels)?;
    let mut entries = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let file = read_workflow_file(path)?;
        let analysis = analyze_workflow(&file.content, &labels);
        entries.push(WorkflowEntry {
            name: path.display().to_string(),
            global: false,
            err_msg: config.locale.render(&analysis.diagnostic),
            diagnostic: analysis.diagnostic,
        });
    }
    Ok(entries)
}

fn run_dispatch(args: &DispatchArgs) -> Result<ExitCode> {
    let file = read_workflow_file(&args.file)?;
    let document = parse_workflow(&file.content).with_context(|| format!("Failed to parse {}", args.file.display()))?;
    let schema = extract_dispatch(&document.on)
        .ok_or(DispatchInputError::NotDispatchable)
        .with_context(|| format!("Cannot dispatch {}", file.name))?;

    let submitted: IndexMap<String, String> = args.inputs.iter().cloned().collect();
    let resolved = resolve_dispatch_inputs(&schema, &submitted)?;
    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(ExitCode::SUCCESS)
}

fn print_listing(listing: &WorkflowListing, form: Option<&DispatchForm>) {
    if listing.workflows.is_empty() {
        println!("No workflows found");
    }
    for entry in &listing.workflows {
        print_entry(entry);
    }

    let Some(selected) = &listing.selected else {
        return;
    };
    println!();
    if selected.disabled {
        println!("{}: disabled", selected.name);
        return;
    }
    let Some(form) = form else {
        println!("{}: manual dispatch not supported", selected.name);
        return;
    };
    println!("{}: manual dispatch", selected.name);
    for input in &form.schema.inputs {
        let required = if input.required { " (required)" } else { "" };
        let kind = if input.r#type.is_empty() { "string" } else { input.r#type.as_str() };
        println!("  {} [{}]{} {}", input.name, kind, required, input.description);
        if !input.default.is_empty() {
            println!("    default: {}", input.default);
        }
        if !input.options.is_empty() {
            println!("    options: {}", input.options.join(", "));
        }
    }
    println!("  branches: {}", form.branches.join(", "));
    println!("  tags: {}", form.tags.join(", "));
}

fn print_entry(entry: &WorkflowEntry) {
    let global = if entry.global { " [global]" } else { "" };
    if entry.err_msg.is_empty() {
        println!("{}{}", entry.name, global);
    } else {
        println!("{}{}  ! {}", entry.name, global, entry.err_msg);
    }
}

fn repository_name(repo_root: &Path) -> Result<String> {
    let canonical = repo_root
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", repo_root.display()))?;
    canonical
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("cannot derive a repository name from {}", canonical.display()))
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw.split_once('=').ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    if key.trim().is_empty() {
        return Err(format!("missing input name in '{raw}'"));
    }
    Ok((key.trim().to_string(), value.to_string()))
}
