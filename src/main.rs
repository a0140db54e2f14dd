use std::{path::PathBuf, process::ExitCode, sync::Arc};

use clap::{Args, Parser, Subcommand};
use slopify::{
    auth::{CredentialResolver, FileSecretStore, SecretStore},
    capabilities::GenerationClient,
    config::AppConfig,
    errors::{Result, SlopError},
    modes::{GenerationMode, IntensityLevel},
    orchestrator::{PipelineRequest, ProgressUpdate, SlopPipeline},
    store::{RecordStore, SlopRecord, SqliteRecordStore},
    util::{ArtifactStore, ArtifactWriter, format_local, now_utc},
};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::fmt::{format::Writer, time::FormatTime};

#[derive(Parser)]
#[command(name = "slopify")]
#[command(author, version, about = "Turn an ordinary photo into platform-flavored AI slop")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file
    #[arg(short, long, global = true, env = "SLOPIFY_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline on a photo
    Run(RunArgs),

    /// List stored slops, newest first
    List {
        #[arg(long)]
        favorites: bool,
    },

    /// Show a single slop
    Show {
        id: i64,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Toggle the favorite flag
    Favorite { id: i64 },

    /// Edit or regenerate a caption
    Caption(CaptionArgs),

    /// Delete a slop together with its images
    Delete(DeleteArgs),

    /// Gallery statistics
    Stats,

    /// List generation modes and intensity levels
    Modes,

    /// Manage the stored API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Photo path or file:// URI
    photo: String,

    #[arg(short, long, conflicts_with = "surprise")]
    mode: Option<String>,

    #[arg(short, long, conflicts_with = "surprise")]
    level: Option<String>,

    /// Extra hints about the photo
    #[arg(long)]
    context: Option<String>,

    /// Pick a random mode and level
    #[arg(long)]
    surprise: bool,
}

#[derive(Args)]
struct CaptionArgs {
    id: i64,

    #[command(flatten)]
    action: CaptionAction,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct CaptionAction {
    /// Replace the caption with this text
    #[arg(long)]
    set: Option<String>,

    /// Ask the model for a new caption
    #[arg(long)]
    regenerate: bool,
}

#[derive(Args)]
struct DeleteArgs {
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    id: Option<i64>,

    /// Delete every stored slop
    #[arg(long)]
    all: bool,
}

#[derive(Subcommand)]
enum KeyAction {
    /// Store a Google AI API key
    Set { secret: String },
    /// Remove the stored key
    Delete,
    /// Report which key would be used
    Status,
}

struct App {
    config: AppConfig,
    secrets: Arc<FileSecretStore>,
    artifacts: Arc<ArtifactWriter>,
    pipeline: SlopPipeline,
    records: SqliteRecordStore,
}

impl App {
    async fn build(config: AppConfig) -> Result<Self> {
        let secrets = Arc::new(FileSecretStore::new(&config.secret_path));
        let resolver =
            CredentialResolver::new(secrets.clone(), config.gemini.default_api_key.clone());
        let artifacts = Arc::new(ArtifactWriter::new(config.artifacts_dir.clone()).await?);
        let client = GenerationClient::new(&config.gemini, resolver, artifacts.clone())?;
        let pipeline = SlopPipeline::new(Arc::new(client), artifacts.clone());
        let records = SqliteRecordStore::open(&config.database_path)?;

        Ok(Self {
            config,
            secrets,
            artifacts,
            pipeline,
            records,
        })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(target: "cli", kind = ?err.kind(), "command failed");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = AppConfig::load_from(cli.config.as_deref())?;
    info!(target: "cli", data_dir = %config.data_dir.display(), "configuration loaded");
    let app = App::build(config).await?;

    match cli.command {
        Commands::Run(args) => run_pipeline(&app, args).await,
        Commands::List { favorites } => {
            let records = app.records.list(favorites)?;
            if records.is_empty() {
                println!("No slop yet.");
            }
            for record in &records {
                print_summary(record);
            }
            Ok(())
        }
        Commands::Show { id, json } => {
            let record = fetch(&app, id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                print_record(&record);
            }
            Ok(())
        }
        Commands::Favorite { id } => {
            fetch(&app, id)?;
            let favorite = app.records.toggle_favorite(id)?;
            println!(
                "#{id} {}",
                if favorite { "added to favorites" } else { "removed from favorites" }
            );
            Ok(())
        }
        Commands::Caption(args) => update_caption(&app, args).await,
        Commands::Delete(args) => delete(&app, args).await,
        Commands::Stats => {
            let stats = app.records.stats()?;
            println!("Total slops: {}", stats.total);
            println!("Favorites:   {}", stats.favorites);
            match stats.most_used_mode {
                Some(mode) => println!("Top mode:    {} {}", mode.profile().glyph, mode.label()),
                None => println!("Top mode:    -"),
            }
            Ok(())
        }
        Commands::Key { action } => manage_key(&app, action).await,
        Commands::Modes => {
            print_modes();
            Ok(())
        }
    }
}

async fn run_pipeline(app: &App, args: RunArgs) -> Result<()> {
    let (mode, level) = if args.surprise {
        (GenerationMode::random(), IntensityLevel::random())
    } else {
        (
            args.mode
                .as_deref()
                .map(str::parse::<GenerationMode>)
                .transpose()?
                .unwrap_or_default(),
            args.level
                .as_deref()
                .map(str::parse::<IntensityLevel>)
                .transpose()?
                .unwrap_or_default(),
        )
    };

    let request = PipelineRequest::new(&args.photo, level, mode, args.context.as_deref());
    println!("{} {} · {}", mode.profile().glyph, mode.label(), level.label());

    let (tx, mut rx) = mpsc::unbounded_channel::<ProgressUpdate>();
    let printer = tokio::spawn(async move {
        while let Some(update) = rx.recv().await {
            println!("  {}", update.message);
        }
    });

    let outcome = app.pipeline.run(&request, Some(&tx)).await;
    drop(tx);
    let _ = printer.await;

    let result = outcome?;
    let id = app.records.insert(&result, mode)?;
    print_record(&fetch(app, id)?);
    Ok(())
}

async fn update_caption(app: &App, args: CaptionArgs) -> Result<()> {
    let record = fetch(app, args.id)?;

    let caption = match args.action.set {
        Some(text) => text,
        None => app.pipeline.regenerate_caption(&record).await?,
    };

    app.records.update_caption(record.id, &caption)?;
    println!("{}", caption.trim());
    Ok(())
}

async fn delete(app: &App, args: DeleteArgs) -> Result<()> {
    let doomed = match args.id {
        Some(id) => vec![fetch(app, id)?],
        None => app.records.list(false)?,
    };

    for record in &doomed {
        app.artifacts.remove(&record.original_path).await?;
        app.artifacts.remove(&record.slop_path).await?;
    }

    match args.id {
        Some(id) => app.records.delete(id)?,
        None => app.records.delete_all()?,
    }

    println!("Deleted {} slop(s).", doomed.len());
    Ok(())
}

async fn manage_key(app: &App, action: KeyAction) -> Result<()> {
    match action {
        KeyAction::Set { secret } => {
            app.secrets.set(&secret).await?;
            println!("API key saved.");
        }
        KeyAction::Delete => {
            app.secrets.delete().await?;
            println!("API key removed.");
        }
        KeyAction::Status => {
            if app.secrets.has().await? {
                println!("Using the stored API key.");
            } else if app.config.gemini.default_api_key.is_some() {
                println!("Using the API key from the environment.");
            } else {
                return Err(SlopError::NoCredential);
            }
        }
    }
    Ok(())
}

fn fetch(app: &App, id: i64) -> Result<SlopRecord> {
    app.records.get(id)?.ok_or(SlopError::RecordNotFound(id))
}

fn print_summary(record: &SlopRecord) {
    let caption = record.caption.lines().next().unwrap_or_default();
    let caption: String = if caption.chars().count() > 60 {
        caption.chars().take(59).chain(['…']).collect()
    } else {
        caption.to_string()
    };

    println!(
        "#{:<4} {} {} {:<8} {:<7} {}",
        record.id,
        if record.is_favorite { "★" } else { " " },
        format_local(&record.created_at, "%Y-%m-%d %H:%M"),
        record.mode.key(),
        record.level.key(),
        caption
    );
}

fn print_record(record: &SlopRecord) {
    println!();
    println!(
        "#{} {} {} · {}{}",
        record.id,
        record.mode.profile().glyph,
        record.mode.label(),
        record.level.label(),
        if record.is_favorite { " ★" } else { "" }
    );
    println!("created:  {}", format_local(&record.created_at, "%Y-%m-%d %H:%M:%S"));
    println!("original: {}", record.original_path.display());
    println!("slop:     {}", record.slop_path.display());
    println!();
    println!("{}", record.caption);
}

fn print_modes() {
    println!("Modes:");
    for mode in GenerationMode::ALL {
        let profile = mode.profile();
        println!(
            "  {} {:<10} {:<20} {}",
            profile.glyph,
            mode.key(),
            profile.label,
            profile.description
        );
    }
    println!();
    println!("Levels:");
    for level in IntensityLevel::ALL {
        println!("  {:<8} {}", level.key(), level.label());
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .with_timer(LocalTimer)
        .init();
}

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", format_local(&now_utc(), "%Y-%m-%d %H:%M:%S%:z"))
    }
}
