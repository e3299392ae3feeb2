mod commands;
mod config;
mod diagnostics;
mod error;
mod freshness;
mod hasher;
mod index;
mod indexfile;
mod info;
mod navtree;
mod scanner;
mod sources;
mod types;
mod watch;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::commands::Context;

/// Environment variable holding a `tracing` filter directive, e.g. `navdex=debug`.
const LOG_ENV: &str = "NAVDEX_LOG";

#[derive(Parser)]
#[command(name = "navdex", version, about = "Symbol index for generated documentation navtrees")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use this config file instead of `.navdex.toml`; its directory becomes the project root
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load navtree files and write the index file
    Build,
    /// Verify the index sources are unchanged (exit 0 fresh, 1 stale, 2 missing)
    Check,
    /// List every member named <NAME> across all scopes
    Find {
        /// Member name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the members of a scope in declaration order
    Entries {
        /// Scope name, full (`TgBot::Api`) or short (`Api`)
        scope: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the index file
    Export {
        /// Output format: toml or json
        #[arg(long, default_value = "toml")]
        format: String,
    },
    /// Output a comprehensive reference for navdex
    Info {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the anchors documenting <NAME> in <SCOPE>
    Lookup {
        /// Scope name, full (`TgBot::Api`) or short (`Api`)
        scope: String,
        /// Member name; overloads yield one anchor each
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List scopes in registration order
    Scopes {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage the navtree sources in `.navdex.toml`
    Source {
        #[command(subcommand)]
        action: SourceAction,
    },
    /// Show freshness of every source and index totals
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Build, then rebuild whenever a source changes
    Watch,
}

#[derive(Subcommand)]
enum SourceAction {
    /// Add a navtree file or directory
    Add {
        /// Path relative to the project root
        path: String,
    },
    /// List configured sources
    List,
    /// Remove a navtree file or directory
    Remove {
        /// Path as written in the config
        path: String,
    },
}

/// Install the stderr subscriber when `NAVDEX_LOG` is set.
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    if std::env::var_os(LOG_ENV).is_some() {
        let filter = EnvFilter::from_env(LOG_ENV);
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(filter)
            .try_init();
    }
}

/// Resolve the project root and config from the `--config` flag.
///
/// # Errors
///
/// Returns config loading errors.
fn load_context(explicit: Option<PathBuf>) -> Result<Context, error::Error> {
    return match explicit {
        Some(path) => {
            let config = config::Config::load_explicit(&path)?;
            let root = path
                .parent()
                .filter(|p| return !p.as_os_str().is_empty())
                .map_or_else(|| return PathBuf::from("."), std::path::Path::to_path_buf);
            Ok(Context { config, config_path: path, root })
        },
        None => {
            let root = PathBuf::from(".");
            let config = config::Config::load(&root)?;
            let config_path = root.join(config::CONFIG_FILE);
            Ok(Context { config, config_path, root })
        },
    };
}

/// Run a subcommand that needs the loaded config.
///
/// # Errors
///
/// Returns whatever the subcommand returns.
fn dispatch(command: Commands, ctx: &Context) -> Result<ExitCode, error::Error> {
    match command {
        Commands::Build => commands::build(ctx)?,
        Commands::Check => return commands::check(ctx),
        Commands::Entries { scope, json } => commands::entries(ctx, &scope, json)?,
        Commands::Export { format } => commands::export(ctx, &format)?,
        Commands::Find { name, json } => commands::find(ctx, &name, json)?,
        Commands::Info { json } => commands::info(ctx, json),
        Commands::Lookup { scope, name, json } => commands::lookup(ctx, &scope, &name, json)?,
        Commands::Scopes { json } => commands::scopes(ctx, json)?,
        Commands::Source { action } => match action {
            SourceAction::Add { path } => sources::cmd_add(&ctx.config_path, &path)?,
            SourceAction::List => sources::cmd_list(&ctx.config),
            SourceAction::Remove { path } => sources::cmd_remove(&ctx.config_path, &path)?,
        },
        Commands::Status { json } => commands::status(ctx, json)?,
        Commands::Watch => return watch::run(ctx),
    }
    return Ok(ExitCode::SUCCESS);
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let result = load_context(cli.config).and_then(|ctx| return dispatch(cli.command, &ctx));
    return match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(3_u8)
        },
    };
}
