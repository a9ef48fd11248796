//! Operator CLI for La Serenissima tooling.
//!
//! One binary replaces the old drawer of one-off scripts: analysis
//! reports over the Simulation API, activity creation and processing,
//! and stratagem lifecycle operations against the Record Store.
//!
//! Configuration comes from one YAML file (see [`ToolingConfig`]) plus
//! environment overrides, loaded once here and passed down explicitly.
//! `--dry-run` swaps the hosted store for an in-memory one so a command's
//! wiring can be exercised without touching production rows.

mod reports;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use serenissima_api::ApiClient;
use serenissima_engine::stratagems::collective_delivery::{self, CreateCollectiveDelivery};
use serenissima_engine::{creators::Creator, processors::Processor, ToolingConfig, WindowRequest};
use serenissima_store::RecordStore;
use serenissima_types::{BuildingId, Username};

/// Operator tooling for La Serenissima.
#[derive(Parser, Debug)]
#[command(name = "serenissima", version, about)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Run store mutations against an in-memory backend instead of the
    /// hosted store.
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print an analysis report from a Simulation API snapshot.
    Report {
        /// Which report to print.
        #[command(subcommand)]
        kind: ReportKind,
    },
    /// Create one activity record in `created` status.
    CreateActivity(CreateActivityArgs),
    /// Run one processing pass over due activities.
    ProcessActivities,
    /// Stratagem lifecycle operations.
    Stratagem {
        /// Which operation to run.
        #[command(subcommand)]
        op: StratagemCommand,
    },
    /// Classify a relationship from its scores.
    Classify {
        /// Interaction strength score.
        #[arg(long)]
        strength: Decimal,
        /// Trust score.
        #[arg(long)]
        trust: Decimal,
    },
}

#[derive(Subcommand, Debug)]
enum ReportKind {
    /// Population, class breakdown, and wealth distribution.
    Citizens {
        /// Use a generated snapshot instead of calling the API.
        #[arg(long)]
        mock: bool,
    },
    /// Open problems by severity.
    Problems {
        /// Use a generated snapshot instead of calling the API.
        #[arg(long)]
        mock: bool,
    },
    /// Resource totals by type.
    Resources {
        /// Use a generated snapshot instead of calling the API.
        #[arg(long)]
        mock: bool,
    },
}

/// Activity types the CLI can create directly.
#[derive(ValueEnum, Debug, Clone, Copy)]
enum ActivityKind {
    /// Travel to a building.
    GotoLocation,
    /// Fish from the lagoon.
    Fishing,
    /// Inspect and operate a public dock.
    ManagePublicDock,
    /// Join a collective delivery stratagem.
    JoinCollectiveDelivery,
    /// Deliver resources under a stratagem.
    DeliverToBuilding,
}

#[derive(clap::Args, Debug)]
struct CreateActivityArgs {
    /// The acting citizen's username.
    #[arg(long)]
    citizen: String,

    /// The type of activity to create.
    #[arg(long, value_enum)]
    activity_type: ActivityKind,

    /// Target or source building id, where the type needs one.
    #[arg(long)]
    building: Option<String>,

    /// Stratagem business id, for collective delivery types.
    #[arg(long)]
    stratagem: Option<String>,

    /// Units to deliver, for `deliver-to-building`.
    #[arg(long, default_value_t = 1)]
    amount: u32,

    /// Expected catch, for `fishing`.
    #[arg(long, default_value_t = 3)]
    expected_catch: u32,

    /// Inspection fee in ducats, for `manage-public-dock`.
    #[arg(long, default_value_t = Decimal::ZERO)]
    fee: Decimal,

    /// Explicit duration in minutes, overriding the type default.
    #[arg(long)]
    duration_minutes: Option<u32>,
}

#[derive(Subcommand, Debug)]
enum StratagemCommand {
    /// Declare a new collective delivery.
    Create {
        /// The declaring and funding citizen.
        #[arg(long)]
        executor: String,
        /// The building deliveries converge on.
        #[arg(long)]
        target_building: String,
        /// The resource to collect (store name, e.g. `paper`).
        #[arg(long)]
        resource: String,
        /// Units needed for completion.
        #[arg(long)]
        target_amount: u32,
        /// Ducats paid per delivered unit.
        #[arg(long)]
        reward_per_unit: Decimal,
        /// Hours until the plan lapses.
        #[arg(long, default_value_t = 24)]
        duration_hours: i64,
    },
    /// Add a citizen to a stratagem's participants.
    Join {
        /// The stratagem's business id.
        #[arg(long)]
        stratagem: String,
        /// The joining citizen.
        #[arg(long)]
        citizen: String,
    },
    /// Evaluate conclusion: expiry, then target completion.
    Process {
        /// The stratagem's business id.
        #[arg(long)]
        stratagem: String,
    },
    /// Cancel an active stratagem (executor only).
    Cancel {
        /// The stratagem's business id.
        #[arg(long)]
        stratagem: String,
        /// The citizen requesting cancellation.
        #[arg(long)]
        actor: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.filter.clone())),
        )
        .with_target(true)
        .init();

    match cli.command {
        Command::Report { kind } => run_report(&config, kind).await,
        Command::CreateActivity(args) => {
            let store = open_store(&config, cli.dry_run)?;
            run_create_activity(&store, args).await
        }
        Command::ProcessActivities => {
            let store = open_store(&config, cli.dry_run)?;
            let report = Processor::new(&store).process_due().await?;
            println!(
                "Processed: {} applied, {} already terminal, {} failed",
                report.applied, report.already_terminal, report.failed
            );
            Ok(())
        }
        Command::Stratagem { op } => {
            let store = open_store(&config, cli.dry_run)?;
            run_stratagem(&store, op).await
        }
        Command::Classify { strength, trust } => {
            let title = serenissima_engine::social::determine_relationship_title(strength, trust);
            let description = serenissima_engine::social::describe_relationship(strength, trust, &[]);
            println!("{title}");
            println!("{description}");
            Ok(())
        }
    }
}

/// Load configuration from the given path, or environment-only defaults.
fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<ToolingConfig> {
    match path {
        Some(path) => ToolingConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(ToolingConfig::from_env()),
    }
}

/// Open the Record Store: hosted for real runs, in-memory for dry runs.
fn open_store(config: &ToolingConfig, dry_run: bool) -> anyhow::Result<RecordStore> {
    let store = if dry_run {
        RecordStore::in_memory()
    } else {
        RecordStore::http(&config.store_http()?)?
    };
    info!(backend = store.backend_name(), "Record Store opened");
    Ok(store)
}

async fn run_report(config: &ToolingConfig, kind: ReportKind) -> anyhow::Result<()> {
    let mut rng = rand::rng();
    let api = || {
        ApiClient::with_timeout(
            config.api.base_url.clone(),
            Duration::from_secs(config.api.timeout_secs),
        )
    };
    let output = match kind {
        ReportKind::Citizens { mock } => {
            let citizens = if mock {
                reports::mock_citizens(&mut rng)
            } else {
                api()?.citizens().await?
            };
            reports::render_citizens(&reports::summarize_citizens(&citizens))
        }
        ReportKind::Problems { mock } => {
            let problems = if mock {
                reports::mock_problems(&mut rng)
            } else {
                api()?.problems().await?
            };
            reports::render_problems(&reports::summarize_problems(&problems))
        }
        ReportKind::Resources { mock } => {
            let stacks = if mock {
                reports::mock_resources(&mut rng)
            } else {
                api()?.resources().await?
            };
            reports::render_resources(&reports::summarize_resources(&stacks))
        }
    };
    print!("{output}");
    Ok(())
}

async fn run_create_activity(store: &RecordStore, args: CreateActivityArgs) -> anyhow::Result<()> {
    let citizen = Username::from(args.citizen.as_str());
    let window = WindowRequest {
        explicit_start: None,
        explicit_duration_minutes: args.duration_minutes,
        route: None,
    };
    let creator = Creator::new(store);

    let building = args.building.map(|b| BuildingId::from(b.as_str()));
    let record = match args.activity_type {
        ActivityKind::GotoLocation => {
            let to = building.context("--building is required for goto-location")?;
            creator.goto_location(&citizen, &to, window, Vec::new()).await?
        }
        ActivityKind::Fishing => {
            creator
                .fishing(&citizen, building, window, args.expected_catch)
                .await?
        }
        ActivityKind::ManagePublicDock => {
            let dock = building.context("--building is required for manage-public-dock")?;
            creator
                .manage_public_dock(&citizen, &dock, window, args.fee)
                .await?
        }
        ActivityKind::JoinCollectiveDelivery => {
            let stratagem = args
                .stratagem
                .context("--stratagem is required for join-collective-delivery")?;
            creator.join_collective_delivery(&citizen, &stratagem).await?
        }
        ActivityKind::DeliverToBuilding => {
            let stratagem = args
                .stratagem
                .context("--stratagem is required for deliver-to-building")?;
            let from = building.context("--building is required for deliver-to-building")?;
            creator
                .deliver_to_building(&citizen, &stratagem, args.amount, &from, window)
                .await?
        }
    };
    println!("Created {}", record.fields.activity_id);
    Ok(())
}

async fn run_stratagem(store: &RecordStore, op: StratagemCommand) -> anyhow::Result<()> {
    let now = Utc::now();
    match op {
        StratagemCommand::Create {
            executor,
            target_building,
            resource,
            target_amount,
            reward_per_unit,
            duration_hours,
        } => {
            let resource = serde_json::from_value(serde_json::Value::String(resource.clone()))
                .with_context(|| format!("unknown resource {resource:?}"))?;
            let record = collective_delivery::create(
                store,
                CreateCollectiveDelivery {
                    executor: Username::from(executor.as_str()),
                    target_building: BuildingId::from(target_building.as_str()),
                    resource,
                    target_amount,
                    reward_per_unit,
                    duration_hours,
                },
                now,
            )
            .await?;
            println!("Declared {}", record.fields.stratagem_id);
        }
        StratagemCommand::Join { stratagem, citizen } => {
            let outcome = collective_delivery::join(
                store,
                &stratagem,
                &Username::from(citizen.as_str()),
                now,
            )
            .await?;
            println!("{outcome:?}");
        }
        StratagemCommand::Process { stratagem } => {
            let status = collective_delivery::conclude(store, &stratagem, now).await?;
            println!("{status:?}");
        }
        StratagemCommand::Cancel { stratagem, actor } => {
            collective_delivery::cancel(store, &stratagem, &Username::from(actor.as_str())).await?;
            println!("Cancelled {stratagem}");
        }
    }
    Ok(())
}
