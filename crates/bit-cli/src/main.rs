mod commands;
mod errors;

use bit_core::CreateOptions;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "bit", version, about = "Source-component manager")]
struct Cli {
    /// Consumer directory containing bit.json.
    #[arg(short = 'C', long, default_value = ".", global = true)]
    dir: PathBuf,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create a consumer manifest in the target directory.
    Init {
        /// Overwrite an existing bit.json.
        #[arg(short, long, default_value_t = false)]
        force: bool,
    },
    /// Create a new local component.
    Create {
        /// Component name, optionally prefixed with its box (`box/name`).
        name: String,
        #[arg(long = "box")]
        box_name: Option<String>,
        #[arg(long)]
        compiler: Option<String>,
        #[arg(long)]
        tester: Option<String>,
        /// Create even if the component exists in the external library.
        #[arg(short, long, default_value_t = false)]
        force: bool,
    },
    /// Show a component's manifest.
    Show {
        name: String,
        /// Read the component from a remote scope instead of the workspace.
        #[arg(long)]
        remote: Option<String>,
    },
    /// Manage consumer dependencies.
    Dependency {
        #[command(subcommand)]
        action: DependencyAction,
    },
    /// Manage remote scopes.
    Remote {
        #[command(subcommand)]
        action: RemoteAction,
    },
    /// Export components to a remote scope.
    Export {
        /// Name of a configured remote.
        remote: String,
        /// Component ids or `box/*` patterns (default: all).
        ids: Vec<String>,
        /// Replace exported components with scope dependencies.
        #[arg(short, long, default_value_t = false)]
        eject: bool,
    },
    /// Generate shell completions.
    Completions {
        /// Shell to generate for.
        shell: Shell,
    },
}

#[derive(Debug, Subcommand)]
enum DependencyAction {
    /// Add or update a dependency constraint.
    Add { id: String, version: String },
    /// Remove a dependency.
    Remove { id: String },
    /// List dependencies.
    List,
}

#[derive(Debug, Subcommand)]
enum RemoteAction {
    /// Register a remote scope location.
    Add { name: String, location: String },
    /// Remove a remote scope.
    Remove { name: String },
    /// List remote scopes.
    List,
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("BIT_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let dir = cli.dir;
    let json_output = cli.json;

    let result = match cli.command {
        Commands::Init { force } => commands::init::run(&dir, force, json_output),
        Commands::Create {
            name,
            box_name,
            compiler,
            tester,
            force,
        } => {
            let opts = CreateOptions {
                box_name: box_name.as_deref(),
                compiler: compiler.as_deref(),
                tester: tester.as_deref(),
                force,
            };
            commands::create::run(&dir, &name, &opts, json_output)
        }
        Commands::Show { name, remote } => {
            commands::show::run(&dir, &name, remote.as_deref(), json_output)
        }
        Commands::Dependency { action } => match action {
            DependencyAction::Add { id, version } => {
                commands::dependency::add(&dir, &id, &version, json_output)
            }
            DependencyAction::Remove { id } => commands::dependency::remove(&dir, &id, json_output),
            DependencyAction::List => commands::dependency::list(&dir, json_output),
        },
        Commands::Remote { action } => match action {
            RemoteAction::Add { name, location } => {
                commands::remote::add(&dir, &name, &location, json_output)
            }
            RemoteAction::Remove { name } => commands::remote::remove(&dir, &name, json_output),
            RemoteAction::List => commands::remote::list(&dir, json_output),
        },
        Commands::Export { remote, ids, eject } => {
            commands::export::run(&dir, &remote, &ids, eject, json_output)
        }
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            match errors::classify(&err) {
                Some(msg) => eprintln!("{msg}"),
                None => eprintln!("error: {err}"),
            }
            ExitCode::from(errors::exit_code(&err))
        }
    }
}
