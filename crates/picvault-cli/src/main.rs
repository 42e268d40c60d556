use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use picvault_core::picture_key::content_type_for_extension;
use picvault_core::{Config, UserId};
use picvault_db::{connect, run_migrations, PgProfileRepository};
use picvault_services::{PictureError, PictureOutcome, PictureService};
use picvault_storage::create_storage;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

mod telemetry;

#[derive(Parser, Debug)]
#[command(name = "picvault")]
#[command(about = "Manage user profile pictures in the configured object store")]
struct Args {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Picture(PictureCommand),
    /// Apply database migrations
    Migrate,
}

#[derive(Subcommand, Debug)]
enum PictureCommand {
    /// Create an empty profile record for a user if none exists
    Provision {
        #[arg(long, value_name = "USER_ID")]
        user: String,
    },
    /// Upload a picture and make it the user's current one
    Set {
        #[arg(long, value_name = "USER_ID")]
        user: String,

        /// Image file to upload
        #[arg(long, value_name = "PATH")]
        file: PathBuf,

        /// MIME type (guessed from the file extension when omitted)
        #[arg(long, value_name = "MIME")]
        content_type: Option<String>,
    },
    /// Print a time-limited link to the user's current picture
    Link {
        #[arg(long, value_name = "USER_ID")]
        user: String,

        /// Output format: json or text (default: text)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Delete the user's current picture
    Clear {
        #[arg(long, value_name = "USER_ID")]
        user: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    telemetry::init_telemetry(args.json_logs);

    match run(args.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<PictureError>() {
                Some(picture_error) => {
                    tracing::error!(error = ?e, code = picture_error.error_code(), "Command failed");
                    eprintln!("{}", picture_error.user_message());
                }
                None => eprintln!("error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        environment = %config.environment,
        production = config.is_production(),
        storage_backend = %config.storage_backend,
        "Configuration loaded"
    );
    let pool = connect(&config)
        .await
        .context("Failed to connect to database")?;

    match command {
        Command::Migrate => {
            run_migrations(&pool).await?;
            println!("Migrations applied.");
        }
        Command::Picture(command) => {
            let storage = create_storage(&config)
                .await
                .context("Failed to initialize storage backend")?;
            let service = PictureService::new(
                storage,
                Arc::new(PgProfileRepository::new(pool)),
                config.link_expiry,
            );
            run_picture(command, &service, config.max_picture_size_bytes).await?;
        }
    }

    Ok(())
}

async fn run_picture(
    command: PictureCommand,
    service: &PictureService,
    max_picture_size_bytes: usize,
) -> Result<()> {
    match command {
        PictureCommand::Provision { user } => {
            let user = parse_user(user)?;
            service.provision(&user).await?;
            println!("Profile ready for {}.", user);
        }
        PictureCommand::Set {
            user,
            file,
            content_type,
        } => {
            let user = parse_user(user)?;
            let content = read_picture(&file, max_picture_size_bytes).await?;
            let content_type = content_type.unwrap_or_else(|| guess_content_type(&file).to_string());

            let outcome = service.set_picture(&user, content, &content_type).await?;
            print_outcome(outcome);
        }
        PictureCommand::Link { user, format } => {
            let user = parse_user(user)?;
            let link = service.get_picture_link(&user).await?;

            match (format.as_str(), link) {
                ("json", link) => println!("{}", serde_json::to_string_pretty(&link)?),
                (_, Some(link)) => println!("{}", link.url),
                (_, None) => println!("no profile picture"),
            }
        }
        PictureCommand::Clear { user } => {
            let user = parse_user(user)?;
            let outcome = service.clear_picture(&user).await?;
            print_outcome(outcome);
        }
    }

    Ok(())
}

fn parse_user(raw: String) -> Result<UserId> {
    UserId::parse(raw).context("Invalid --user")
}

fn print_outcome(outcome: PictureOutcome) {
    println!("{}", outcome.message());
}

fn guess_content_type(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(content_type_for_extension)
        .unwrap_or("application/octet-stream")
}

/// Read an upload, enforcing the configured size bound before loading it.
async fn read_picture(path: &Path, max_bytes: usize) -> Result<Vec<u8>> {
    let meta = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("Cannot read {}", path.display()))?;

    if meta.len() > max_bytes as u64 {
        anyhow::bail!(
            "{} is {} bytes, larger than the {} byte limit",
            path.display(),
            meta.len(),
            max_bytes
        );
    }

    tokio::fs::read(path)
        .await
        .with_context(|| format!("Cannot read {}", path.display()))
}
