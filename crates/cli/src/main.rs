//! pyrun - classify Python environments and run code against them

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pyrun_core::application::{EnvironmentClassifier, ExecutorFactory};
use pyrun_core::port::SpawnOptions;
use pyrun_core::AppError;
use pyrun_infra_system::{
    AmbientEnvVarResolver, DirWorkspaceResolver, PipfileMatcher, StaticConfigSource,
    TokioFileProbe, TokioProcessRunner,
};

const DEFAULT_INTERPRETER: &str = "python3";

#[derive(Parser)]
#[command(name = "pyrun")]
#[command(about = "Classify Python environments and run code against them", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Default interpreter used when a subcommand omits the path
    #[arg(long, env = "PYRUN_PYTHON", default_value = DEFAULT_INTERPRETER)]
    python: String,

    /// Emit machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify the environment kind of an interpreter
    Classify {
        /// Interpreter path
        path: String,

        /// File or directory the classification is scoped to
        #[arg(long)]
        resource: Option<PathBuf>,

        /// Workspace folders considered for the pipenv check (defaults to
        /// the current directory)
        #[arg(long = "workspace")]
        workspaces: Vec<PathBuf>,
    },

    /// Probe interpreter metadata (version, prefixes, architecture)
    Info {
        /// Interpreter path (defaults to --python)
        path: Option<String>,
    },

    /// Run the interpreter with the given arguments
    Run {
        /// Interpreter path
        path: String,

        /// Arguments passed through to the interpreter
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run a module (python -m) with the given arguments
    RunModule {
        /// Interpreter path
        path: String,

        /// Module name
        module: String,

        /// Arguments passed through to the module
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let runner = Arc::new(TokioProcessRunner::new());
    let file_probe = Arc::new(TokioFileProbe::new());
    let factory = ExecutorFactory::new(
        runner.clone(),
        file_probe.clone(),
        Arc::new(StaticConfigSource::new(cli.python.clone())),
        Arc::new(AmbientEnvVarResolver),
    );

    match cli.command {
        Commands::Classify {
            path,
            resource,
            workspaces,
        } => {
            let folders = if workspaces.is_empty() {
                std::env::current_dir().map(|cwd| vec![cwd]).unwrap_or_default()
            } else {
                workspaces
            };
            let classifier = EnvironmentClassifier::new(
                runner,
                file_probe,
                Arc::new(DirWorkspaceResolver::new(folders)),
                Arc::new(PipfileMatcher),
            );

            let kind = classifier.classify(&path, resource.as_deref()).await;
            if cli.json {
                println!("{}", json!({ "path": path, "kind": kind }));
            } else {
                println!("{} {}", path.bold(), kind.to_string().green());
            }
        }

        Commands::Info { path } => {
            let path = path.unwrap_or(cli.python);
            let executor = factory.for_interpreter(&path);
            match executor.probe_metadata().await {
                Some(meta) => {
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&meta)?);
                    } else {
                        println!("{}", meta.version.bold());
                        println!("  path:         {}", meta.path);
                        println!("  version_info: {}", meta.version_info);
                        println!("  sys_prefix:   {}", meta.sys_prefix);
                        println!("  architecture: {:?}", meta.architecture);
                    }
                }
                None => {
                    // Best-effort probe: unavailable is an answer, not an error.
                    if cli.json {
                        println!("{}", json!({ "path": path, "available": false }));
                    } else {
                        println!("{} {}", path.bold(), "metadata unavailable".yellow());
                    }
                }
            }
        }

        Commands::Run { path, args } => {
            let executor = factory.for_interpreter(&path);
            let result = executor.execute(&args, SpawnOptions::default()).await?;
            print!("{}", result.stdout);
            eprint!("{}", result.stderr);
        }

        Commands::RunModule { path, module, args } => {
            let executor = factory.for_interpreter(&path);
            match executor.execute_module(&module, &args, SpawnOptions::default()).await {
                Ok(result) => {
                    print!("{}", result.stdout);
                    eprint!("{}", result.stderr);
                }
                Err(AppError::ModuleNotInstalled(name)) => {
                    eprintln!("{} module '{}' is not installed", "error:".red().bold(), name);
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    Ok(())
}

fn init_logging() {
    let log_format = std::env::var("PYRUN_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("pyrun=warn"))
        .expect("Failed to create env filter");

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
}
