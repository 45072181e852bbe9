mod companion;
mod config;
mod web;

use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use righton_core::EchoState;
use righton_store::memory_file::load_memory;
use righton_store::paths::{config_path, ensure_parent};
use righton_store::seed::seed_demo_data;
use righton_store::{Store, database_path, resolve_base_dir};

use companion::{Companion, NoPacer, Pacer, Pulse, SleepPacer, farewell};
use config::{CompanionConfig, Config, ServerConfig};
use web::WebState;
use web::session::SessionStore;

#[derive(Parser)]
#[command(name = "righton", about = "JinxEcho companion and the RightOn bubble forum")]
struct Cli {
    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    /// Config file (default: <data dir>/righton.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Talk with JinxEcho on this terminal
    Echo {
        /// Skip the pauses between lines
        #[arg(long)]
        fast: bool,

        /// Start from the saved memory file
        #[arg(long)]
        resume: bool,

        /// Memory file path (default: ./.jinxecho_memory.json)
        #[arg(long)]
        memory_file: Option<PathBuf>,
    },

    /// Run the RightOn web app
    Serve {
        /// Listen address (default: 0.0.0.0:5000)
        #[arg(long)]
        bind: Option<SocketAddr>,

        /// SQLite database path
        #[arg(long)]
        db: Option<PathBuf>,

        /// Do not insert demo data into an empty database
        #[arg(long)]
        no_seed: bool,
    },

    /// Insert demo data into an empty database
    Seed {
        /// SQLite database path
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => Config::load(path, true),
        None => Config::load(&config_path(&resolve_base_dir(None)), false),
    }
}

fn open_store(server: &ServerConfig, db: Option<PathBuf>) -> Result<(Store, PathBuf)> {
    let path = db
        .or_else(|| server.database.clone())
        .unwrap_or_else(|| database_path(&resolve_base_dir(None)));
    ensure_parent(&path).context("failed to prepare data directory")?;
    let store =
        Store::open(&path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok((store, path))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Echo {
            fast,
            resume,
            memory_file,
        } => cmd_echo(config.companion, fast, resume, memory_file).await,
        Commands::Serve { bind, db, no_seed } => cmd_serve(config.server, bind, db, no_seed).await,
        Commands::Seed { db } => cmd_seed(&config.server, db),
    }
}

// ---------------------------------------------------------------------------
// echo
// ---------------------------------------------------------------------------

fn resume_state(path: &Path) -> EchoState {
    match load_memory(path) {
        Ok(Some(memory)) => {
            tracing::info!("resumed memory from {}", path.display());
            EchoState::with_memory(memory)
        }
        Ok(None) => EchoState::new(),
        Err(e) => {
            tracing::warn!("starting fresh, could not resume memory: {e}");
            EchoState::new()
        }
    }
}

async fn cmd_echo(
    config: CompanionConfig,
    fast: bool,
    resume: bool,
    memory_file: Option<PathBuf>,
) -> Result<()> {
    let memory_path = memory_file.unwrap_or(config.memory_file);
    let state = if resume || config.resume {
        resume_state(&memory_path)
    } else {
        EchoState::new()
    };
    let pacer: Box<dyn Pacer + Send> = if fast || !config.pacing {
        Box::new(NoPacer)
    } else {
        Box::new(SleepPacer::new())
    };

    let (pulse_tx, pulse_rx) = watch::channel(Pulse::of(&state));
    let session = tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        Companion::new(stdin.lock(), std::io::stdout(), pacer, state)
            .with_memory_file(memory_path)
            .with_pulse(pulse_tx)
            .run()
    });

    tokio::select! {
        joined = session => {
            joined
                .context("companion session panicked")?
                .context("terminal I/O failed")?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl-C")?;
            let pulse = *pulse_rx.borrow();
            print!("{}", farewell(pulse));
            std::io::stdout().flush()?;
            // The session thread is parked on stdin and cannot be joined.
            std::process::exit(0);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// serve / seed
// ---------------------------------------------------------------------------

async fn cmd_serve(
    config: ServerConfig,
    bind: Option<SocketAddr>,
    db: Option<PathBuf>,
    no_seed: bool,
) -> Result<()> {
    let (store, db_path) = open_store(&config, db)?;
    tracing::info!("opened store at {}", db_path.display());

    if config.seed_demo_data && !no_seed {
        seed_demo_data(&store).context("failed to seed demo data")?;
    }

    let addr = bind.unwrap_or(config.bind);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let local = listener.local_addr()?;
    println!("RightOn listening on http://{local}");
    tracing::info!(%local, "server started");

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Ctrl-C received, draining connections");
                    shutdown.cancel();
                }
                Err(e) => tracing::warn!("failed to listen for Ctrl-C: {e}"),
            }
        }
    });

    let sessions = SessionStore::new(config.session_idle_ttl(), config.max_sessions);
    let state = WebState::new(store).with_sessions(sessions).into_shared();
    web::serve(listener, state, shutdown)
        .await
        .context("server error")?;
    tracing::info!("server stopped");
    Ok(())
}

fn cmd_seed(config: &ServerConfig, db: Option<PathBuf>) -> Result<()> {
    let (store, path) = open_store(config, db)?;
    match seed_demo_data(&store).context("failed to seed demo data")? {
        Some(report) => println!(
            "seeded {}: {} users, {} connections, {} bubbles, {} posts",
            path.display(),
            report.users,
            report.connections,
            report.bubbles,
            report.posts
        ),
        None => println!("{} already has users, nothing seeded", path.display()),
    }
    Ok(())
}
