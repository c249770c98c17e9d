use std::path::Path;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use tms_runner::bindings::HostResult;
use tms_runner::config::RunnerConfig;
use tms_runner::core::initialize_logging;
use tms_runner::services::PanelBridge;
use tms_runner::ui::{ControlPanel, DebugReport, SettingsStore};

#[derive(Parser)]
#[command(
    name = "tms_runner",
    about = "Run scripts and demo commands in the embedded script host",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (.toml or .json); searched for when omitted
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load an external script into the host
    Run {
        /// Script path
        path: String,
    },

    /// Greet from the host
    Hello,

    /// Show the open project as JSON
    ProjectInfo,

    /// Show the active sequence name
    ActiveSequence,

    /// Add a marker at the playhead
    Marker {
        /// Marker note
        #[arg(trailing_var_arg = true)]
        note: Vec<String>,
    },

    /// Evaluate an expression in the host
    Eval {
        /// Expression text
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        expression: Vec<String>,
    },

    /// Print the debug report
    Debug,
}

fn load_config(path: Option<&str>) -> Result<RunnerConfig, String> {
    let mut config = match path {
        Some(path) if Path::new(path).extension().is_some_and(|ext| ext == "json") => {
            RunnerConfig::from_json_file(path).map_err(|e| e.to_string())?
        }
        Some(path) => RunnerConfig::from_toml_file(path).map_err(|e| e.to_string())?,
        None => RunnerConfig::load_or_default(),
    };
    config.apply_env_overrides();
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn report(result: &HostResult) -> ExitCode {
    match result {
        HostResult::Success(text) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        HostResult::Failure(_) => {
            eprintln!("{}", result.to_wire());
            ExitCode::FAILURE
        }
    }
}

async fn run(config: RunnerConfig, command: Commands) -> Result<ExitCode, String> {
    let store = SettingsStore::open(&config.panel.settings_path).map_err(|e| e.to_string())?;
    let bridge = PanelBridge::connect_async(config.host.clone())
        .await
        .map_err(|e| e.to_string())?;
    let mut panel = ControlPanel::new(bridge, &store.mode());
    tracing::debug!(target: "panel", host = %panel.state().host_label, mode = %panel.state().mode_label, "Panel ready");

    let code = match command {
        Commands::Run { path } => {
            panel.set_jsx_path(path);
            match panel.run_external_script().await {
                Some(result) if result.is_success() => {
                    println!("{}", panel.state().jsx_log);
                    ExitCode::SUCCESS
                }
                Some(_) => {
                    eprintln!("{}", panel.state().jsx_log);
                    ExitCode::FAILURE
                }
                None => {
                    eprintln!("{}", panel.state().toast.as_deref().unwrap_or_default());
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Hello => report(&panel.hello().await),
        Commands::ProjectInfo => report(&panel.project_info().await),
        Commands::ActiveSequence => report(&panel.active_sequence().await),
        Commands::Marker { note } => {
            panel.set_marker_note(note.join(" "));
            report(&panel.add_marker().await)
        }
        Commands::Eval { expression } => {
            report(&panel.bridge().evaluate(&expression.join(" ")).await)
        }
        Commands::Debug => {
            let env = panel.bridge().host_environment().to_json();
            println!("{}", DebugReport::collect(env, &config.panel, &store));
            ExitCode::SUCCESS
        }
    };

    panel.shutdown();
    Ok(code)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = initialize_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(config, cli.command).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("tms_runner failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
