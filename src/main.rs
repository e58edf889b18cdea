use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use quick_explain::api::commands::{explain, preferences, session, settings as settings_cmd, system};
use quick_explain::api::AppState;
use quick_explain::core::host::InstallReason;
use quick_explain::core::popup::BridgeSurface;
use quick_explain::logging;
use quick_explain::shared::settings::AppSettings;
use quick_explain::shared::types::{Size, SourceId, Theme, ToneId, Viewport};
use quick_explain::AppResult;

#[derive(Parser)]
#[command(name = "quick-explain")]
#[command(about = "Short explanations of words and phrases from public reference sources", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging (RUST_LOG is honoured)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Explain a word or short phrase
    Explain(ExplainArgs),

    /// Send a liveness ping through the host message handler
    Ping,

    /// Answer a JSON host message, e.g. '{"type":"ping"}'
    Message {
        json: String,
    },

    /// Show or update stored preferences
    Prefs(PrefsArgs),

    /// Print the settings file location and contents
    Settings {
        /// Restore default settings first
        #[arg(long)]
        reset: bool,
    },

    /// Run first-install setup (stores default preferences)
    Install,

    /// Serve a popup session over stdio: host events in, surface commands out (JSON lines)
    Session(SessionArgs),
}

#[derive(Args)]
struct ExplainArgs {
    /// Text to explain
    #[arg(required = true, num_args = 1..)]
    text: Vec<String>,

    /// Source to use instead of the stored preference
    #[arg(long)]
    source: Option<SourceId>,
}

#[derive(Args)]
struct PrefsArgs {
    #[arg(long)]
    source: Option<SourceId>,

    #[arg(long)]
    tone: Option<ToneId>,

    #[arg(long)]
    theme: Option<Theme>,
}

#[derive(Args)]
struct SessionArgs {
    /// Host viewport width
    #[arg(long, default_value_t = 1280.0)]
    viewport_width: f64,

    /// Host viewport height
    #[arg(long, default_value_t = 800.0)]
    viewport_height: f64,

    /// Popup size assumed when placing it
    #[arg(long, default_value_t = 320.0)]
    popup_width: f64,

    #[arg(long, default_value_t = 140.0)]
    popup_height: f64,

    /// Host prefers a dark color scheme
    #[arg(long)]
    dark: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = settings_cmd::get_settings().await;
    let debug = cli.verbose || loaded.as_ref().is_ok_and(|s| s.debug_logging);
    logging::init(debug);

    let settings = loaded.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load settings, using defaults");
        AppSettings::default()
    });

    match run(cli.command, settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, settings: AppSettings) -> AppResult<()> {
    match command {
        Commands::Ping => {
            println!("{}", serde_json::to_string(&system::ping())?);
        }
        Commands::Message { json } => {
            println!("{}", serde_json::to_string(&system::handle_host_message(&json))?);
        }
        Commands::Explain(args) => {
            let state = AppState::from_settings(settings)?;
            let text = args.text.join(" ");
            let output = explain::explain_text(&state, &text, args.source).await?;

            println!("{} [{}]", output.explanation.title, output.source.label());
            println!();
            println!("{}", output.explanation.extract);
            if let Some(url) = &output.explanation.url {
                println!();
                println!("Read more: {}", url);
            }
        }
        Commands::Prefs(args) => {
            let state = AppState::from_settings(settings)?;
            let update = preferences::PreferencesUpdate {
                source: args.source,
                tone: args.tone,
                theme: args.theme,
            };
            let prefs = if update.is_empty() {
                preferences::get_preferences(&state)?
            } else {
                preferences::update_preferences(&state, update)?
            };

            println!("source: {} ({})", prefs.source, prefs.source.label());
            println!("tone:   {} ({})", prefs.tone, prefs.tone.label());
            println!("theme:  {}", prefs.theme);
        }
        Commands::Settings { reset } => {
            let current = if reset {
                settings_cmd::reset_settings().await?
            } else {
                settings
            };
            println!("# {}", settings_cmd::settings_path()?.display());
            println!("{}", serde_json::to_string_pretty(&current)?);
        }
        Commands::Install => {
            let state = AppState::from_settings(settings)?;
            system::install(&state, InstallReason::Install)?;
            println!("Default preferences stored.");
        }
        Commands::Session(args) => {
            let state = AppState::from_settings(settings)?;
            let surface = BridgeSurface::new(
                std::io::stdout(),
                Viewport {
                    width: args.viewport_width,
                    height: args.viewport_height,
                },
                Size {
                    width: args.popup_width,
                    height: args.popup_height,
                },
                args.dark,
            );
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            session::run_bridge_session(&state, input, surface).await?;
        }
    }

    Ok(())
}
