//! mp3-host command-line front end.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use mp3_host::api::github::GithubApi;
use mp3_host::commands::{self, synthesize::SynthesizeOptions, AppState};
use mp3_host::models::history::format_size;
use mp3_host::models::settings::DEFAULT_REPOSITORY_NAME;
use mp3_host::models::synthesis::SynthesisStatus;
use mp3_host::models::upload::UploadStatus;
use mp3_host::services::progress::UploadReporter;
use mp3_host::services::synthesis_engine::SynthesisReporter;

#[derive(Parser, Debug)]
#[command(name = "mp3-host")]
#[command(about = "Host MP3 files on GitHub and generate speech")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Directory holding settings.json and history.json
    #[arg(long, env = "MP3HOST_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show or change GitHub credentials
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Upload an MP3 file and print its public URL
    Upload { file: PathBuf },
    /// Generate speech from text
    Synthesize {
        text: String,
        /// Reference clip for the voice; the built-in sample is used otherwise
        #[arg(long)]
        reference: Option<PathBuf>,
        /// Where to write the generated audio
        #[arg(long)]
        out: Option<PathBuf>,
        /// Also upload the generated audio
        #[arg(long)]
        save: bool,
    },
    /// List or delete past uploads
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    Show,
    Set {
        /// GitHub personal access token with repo scope
        #[arg(long, env = "MP3HOST_TOKEN", hide_env_values = true)]
        token: String,
        /// Repository that receives uploads
        #[arg(long)]
        repo: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum HistoryAction {
    List,
    Delete { id: String },
}

/// Renders workflow state on stderr.
struct TerminalReporter;

impl UploadReporter for TerminalReporter {
    fn status(&self, status: &UploadStatus) {
        match status {
            UploadStatus::Uploading => eprintln!("Uploading..."),
            UploadStatus::Succeeded => eprintln!("\nDone!"),
            UploadStatus::Failed(_) => eprintln!(),
            UploadStatus::Validating => {}
        }
    }

    fn progress(&self, percent: f64) {
        eprint!(
            "\r[{:<20}] {:>3.0}%",
            "#".repeat((percent / 5.0) as usize),
            percent
        );
        let _ = std::io::stderr().flush();
    }
}

impl SynthesisReporter for TerminalReporter {
    fn status(&self, status: &SynthesisStatus) {
        match status {
            SynthesisStatus::Connecting => eprintln!("Connecting to speech service..."),
            SynthesisStatus::Synthesizing => eprintln!("Generating speech..."),
            SynthesisStatus::Succeeded => eprintln!("Speech generated."),
            SynthesisStatus::Idle | SynthesisStatus::Failed(_) => {}
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();
    log::debug!("CLI args: {:?}", args.command);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> mp3_host::error::Result<()> {
    let data_dir = args.data_dir.unwrap_or_else(commands::default_data_dir);
    let mut state = AppState::open(data_dir);

    match args.command {
        Command::Settings { action } => match action {
            SettingsAction::Show => {
                let credentials = commands::settings::get_settings(&state);
                let token = if credentials.token.is_empty() {
                    "(not set)"
                } else {
                    "(set)"
                };
                println!("token:      {}", token);
                match credentials.saved_repository() {
                    Some(repository) => println!("repository: {}", repository),
                    None => println!("repository: (not set, default {})", DEFAULT_REPOSITORY_NAME),
                }
                println!("data dir:   {}", state.data_dir().display());
            }
            SettingsAction::Set { token, repo } => {
                let credentials =
                    commands::settings::save_settings(&mut state, &token, repo.as_deref())?;
                println!("Settings saved.");
                let api = GithubApi::new(&credentials.token)?;
                // Settings stay saved even if the repository check fails.
                match commands::settings::ensure_repository(&api, &credentials).await {
                    Ok(check) if check.created => {
                        println!("Created repository {}/{}", check.username, check.repository)
                    }
                    Ok(check) => {
                        println!("Using repository {}/{}", check.username, check.repository)
                    }
                    Err(e) => eprintln!("Warning: {}", e),
                }
            }
        },
        Command::Upload { file } => {
            let outcome =
                commands::upload::upload_file(&mut state, &file, Arc::new(TerminalReporter))
                    .await?;
            println!("{}", outcome.url);
        }
        Command::Synthesize {
            text,
            reference,
            out,
            save,
        } => {
            let options = SynthesizeOptions {
                text,
                reference,
                out,
                save,
            };
            let report = commands::synthesize::synthesize(
                &mut state,
                options,
                &TerminalReporter,
                Arc::new(TerminalReporter),
            )
            .await?;
            println!("{}", report.download_path.display());
            if let Some(upload) = report.upload {
                println!("{}", upload?.url);
            }
        }
        Command::History { action } => match action {
            HistoryAction::List => {
                let entries = commands::history::get_history(&state);
                if entries.is_empty() {
                    println!("No uploads yet.");
                }
                for entry in entries {
                    println!(
                        "{}  {}  {:>9}  {}\n    {}",
                        entry.id,
                        entry.created_at.format("%Y-%m-%d %H:%M"),
                        format_size(entry.size_bytes),
                        entry.file_name,
                        entry.url
                    );
                }
            }
            HistoryAction::Delete { id } => {
                commands::history::delete_history(&mut state, &id)?;
                println!("Deleted {}", id);
            }
        },
    }
    Ok(())
}
