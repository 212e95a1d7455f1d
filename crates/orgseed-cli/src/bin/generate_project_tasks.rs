use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use orgseed_core::AppInfo;
use tracing::{Level, event};

use orgseed_cli::config::SeedConfig;
use orgseed_cli::logging::init_logging;
use orgseed_cli::org::{DryRunClient, SfCli};
use orgseed_cli::seed::{SeedOptions, run_seed};
use orgseed_cli::{local_today, run_rng};

/// Seed Project Task data in a CRM org via the Salesforce CLI.
#[derive(Debug, Parser)]
#[command(
    name = "generate-project-tasks",
    author,
    version,
    about = "Seed projects, tasks, subtasks and task relationships for every account"
)]
struct Cli {
    /// Optional YAML configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Target org alias or username.
    #[arg(long, value_name = "ORG")]
    org: Option<String>,

    /// Minimum number of top-level tasks per account.
    #[arg(long = "min", value_name = "COUNT")]
    min_tasks: Option<usize>,

    /// Maximum number of top-level tasks per account.
    #[arg(long = "max", value_name = "COUNT")]
    max_tasks: Option<usize>,

    /// Only print what would be created.
    #[arg(long)]
    dry_run: bool,

    /// Name fragment of the colleague who may own tasks on any account.
    #[arg(long = "owner-kevin", value_name = "NAME")]
    owner_unrestricted: Option<String>,

    /// Name fragment of the colleague who may only own tasks on their own account.
    #[arg(long = "owner-william", value_name = "NAME")]
    owner_restricted: Option<String>,

    /// Do not create task relationships.
    #[arg(long)]
    skip_relationships: bool,

    /// RNG seed for reproducible runs.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => SeedConfig::from_path(path)?,
        None => SeedConfig::default(),
    };

    if let Some(org) = cli.org {
        config.org = org;
    }
    if let Some(min) = cli.min_tasks {
        config.tasks.min = min;
    }
    if let Some(max) = cli.max_tasks {
        config.tasks.max = max;
    }
    if let Some(name) = cli.owner_unrestricted {
        config.owners.set_unrestricted_name(name);
    }
    if let Some(name) = cli.owner_restricted {
        config.owners.set_restricted_name(name);
    }

    config.validate().context("invalid options")?;

    let _logging_guard = init_logging(&config.logging)?;
    event!(
        target: "orgseed::seed",
        Level::INFO,
        app = AppInfo::name(),
        version = AppInfo::version(),
        org = %config.org,
        "starting run"
    );
    let options = SeedOptions::from_config(&config, cli.skip_relationships)?;
    let mut rng = run_rng(cli.seed);
    let today = local_today();
    let sf = SfCli::new(config.sf_binary.clone(), config.org.clone());

    let summary = if cli.dry_run {
        let mut client = DryRunClient::new(sf);
        let summary = run_seed(&mut client, &options, today, &mut rng)?;
        println!(
            "[dry-run] {} writes planned, none sent.",
            client.planned().len()
        );
        summary
    } else {
        let mut client = sf;
        run_seed(&mut client, &options, today, &mut rng)?
    };

    println!("Done.");
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
