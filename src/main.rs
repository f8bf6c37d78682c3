use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use volunteer_match_client::config::{LoggingSettings, Settings};
use volunteer_match_client::flows::{FlowOutcome, MatchFlow};
use volunteer_match_client::models::RawFormEntries;
use volunteer_match_client::services::{ApiClient, ApiError, StaticCookies, TerminalRenderer};

#[derive(Parser)]
#[command(name = "volunteer-match")]
#[command(about = "Validate events and request volunteer matches from the Volunteers R Us backend", long_about = None)]
struct Cli {
    /// Settings file; defaults to config/default.toml and config/local.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL, overrides the settings file
    #[arg(short, long)]
    base_url: Option<String>,

    /// Raw Cookie header to read the CSRF token from
    #[arg(long)]
    cookie: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List known events
    Events,
    /// List registered volunteers
    Volunteers,
    /// Match volunteers against an existing event
    Match {
        /// Event id as shown by `events`
        event_id: String,
    },
    /// Validate a new event and match volunteers against it
    Submit(FormInput),
    /// Validate a volunteer registration
    SubmitVolunteer(FormInput),
    /// Print the effective settings
    Config,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct FormInput {
    /// URL-encoded form body, e.g. `id=5&title=Beach&languages=English`
    #[arg(long)]
    form: Option<String>,

    /// File holding a URL-encoded form body
    #[arg(long)]
    file: Option<PathBuf>,
}

impl FormInput {
    fn read(&self) -> Result<RawFormEntries, Box<dyn std::error::Error>> {
        let body = match (&self.form, &self.file) {
            (Some(form), _) => form.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)?,
            (None, None) => String::new(),
        };
        Ok(RawFormEntries::from_urlencoded(&body)?)
    }
}

fn init_logging(logging: &LoggingSettings) {
    // LOG_LEVEL / LOG_FORMAT win over the settings file
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| logging.level.clone());
    let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| logging.format.clone());

    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr);

    match format.as_str() {
        "pretty" => subscriber.pretty().init(),
        "json" => subscriber.json().init(),
        _ => subscriber.init(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(2);
    });

    settings.apply_overrides(cli.base_url.clone(), cli.cookie.clone());

    init_logging(&settings.logging);

    if let Err(e) = settings.validate() {
        error!("{}", e);
        return ExitCode::from(2);
    }

    match run(cli.command, settings).await {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn connect(settings: &Settings) -> Result<Arc<ApiClient>, ApiError> {
    let cookies = Arc::new(StaticCookies::from_optional(settings.session.cookie.clone()));
    let api = ApiClient::new(&settings.api, settings.session.clone(), cookies)?;

    info!("Using backend at {}", api.base_url());

    Ok(Arc::new(api))
}

fn exit_code(outcome: FlowOutcome) -> ExitCode {
    info!("Finished with outcome {:?}", outcome);

    match outcome {
        FlowOutcome::Rendered { .. } | FlowOutcome::Validated | FlowOutcome::Skipped => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}

async fn run(command: Commands, settings: Settings) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let flow = |api| MatchFlow::new(api, TerminalRenderer::stdout());

    match command {
        Commands::Config => {
            print!("{}", settings.to_toml()?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Volunteers => {
            for v in connect(&settings)?.list_volunteers().await? {
                let skills: Vec<&str> = v.skills.iter().map(String::as_str).collect();
                println!("{} | skills=[{}]", v.name, skills.join(", "));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Events => {
            flow(connect(&settings)?).load_events().await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Match { event_id } => {
            let outcome = flow(connect(&settings)?).match_existing(&event_id).await?;
            Ok(exit_code(outcome))
        }
        Commands::Submit(input) => {
            let raw = input.read()?;
            let outcome = flow(connect(&settings)?).submit_event(&raw).await?;
            Ok(exit_code(outcome))
        }
        Commands::SubmitVolunteer(input) => {
            let raw = input.read()?;
            let outcome = flow(connect(&settings)?).submit_volunteer(&raw).await?;
            Ok(exit_code(outcome))
        }
    }
}
