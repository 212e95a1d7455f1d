use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use orgseed_core::AppInfo;
use tracing::{Level, event};

use orgseed_cli::config::SeedConfig;
use orgseed_cli::logging::init_logging;
use orgseed_cli::org::{DryRunClient, OrgClient, SfCli};
use orgseed_cli::split::{SplitOptions, SplitOutcome, run_split};
use orgseed_cli::{local_today, run_rng};

/// Split the tasks of one project across several projects of the same account.
#[derive(Debug, Parser)]
#[command(
    name = "split-tasks-to-projects",
    author,
    version,
    about = "Redistribute a project's tasks across sibling projects"
)]
struct Cli {
    /// Optional YAML configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Target org alias or username.
    #[arg(long, value_name = "ORG")]
    org: Option<String>,

    /// Project to split tasks from.
    #[arg(long, value_name = "ID")]
    project_id: String,

    /// Total number of projects to distribute across, the original included.
    #[arg(
        long,
        value_name = "COUNT",
        default_value_t = 4,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    num_projects: u16,

    /// Only print what would change.
    #[arg(long)]
    dry_run: bool,

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
    config.validate().context("invalid options")?;

    let _logging_guard = init_logging(&config.logging)?;
    event!(
        target: "orgseed::split",
        Level::INFO,
        app = AppInfo::name(),
        version = AppInfo::version(),
        org = %config.org,
        "starting run"
    );
    let options = SplitOptions {
        project_id: cli.project_id,
        num_projects: usize::from(cli.num_projects),
    };
    let mut rng = run_rng(cli.seed);
    let today = local_today();
    let sf = SfCli::new(config.sf_binary.clone(), config.org.clone());

    if cli.dry_run {
        let mut client = DryRunClient::new(sf);
        execute(&mut client, &options, today, &mut rng)?;
        println!("\n[dry-run] No changes made.");
    } else {
        let mut client = sf;
        if let Some(outcome) = execute(&mut client, &options, today, &mut rng)? {
            println!(
                "\nDone. Moved {} tasks across {} projects.",
                outcome.summary.tasks_moved, outcome.summary.total_projects
            );
            println!("{}", serde_json::to_string_pretty(&outcome.summary)?);
        }
    }

    Ok(())
}

fn execute<C: OrgClient>(
    client: &mut C,
    options: &SplitOptions,
    today: time::Date,
    rng: &mut rand::rngs::StdRng,
) -> anyhow::Result<Option<SplitOutcome>> {
    let outcome = run_split(client, options, today, rng)
        .with_context(|| format!("splitting project {}", options.project_id))?;

    let Some(outcome) = outcome else {
        println!("No tasks to redistribute.");
        return Ok(None);
    };

    println!(
        "Original project: {} (Account: {})",
        outcome.project_name, outcome.account_name
    );
    if outcome.projects_created > 0 {
        println!("Created {} additional projects.", outcome.projects_created);
    }
    let total: usize = outcome.shares.iter().map(|share| share.tasks).sum();
    println!(
        "\nDistributing {total} tasks across {} projects...",
        outcome.shares.len()
    );
    for (idx, share) in outcome.shares.iter().enumerate() {
        println!("  Project {}: {} tasks ({})", idx + 1, share.tasks, share.project_id);
    }
    Ok(Some(outcome))
}
