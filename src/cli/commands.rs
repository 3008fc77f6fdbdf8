use anyhow::Context as _;
use clap::{Parser, Subcommand};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

use crate::config::ServerConfig;
use crate::context::Context;
use crate::engine::Engine;
use crate::logging::{init_logging_with_config, LogConfig};
use crate::middleware::{logger, request_span};
use crate::runtime_config::RuntimeConfig;

/// Command-line interface for grove
#[derive(Parser)]
#[command(name = "grove", version)]
#[command(about = "grove HTTP routing engine demo server", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the demo application
    Serve {
        /// YAML server configuration file
        #[arg(short, long, env = "GROVE_CONFIG")]
        config: Option<PathBuf>,

        /// Address and port to bind, overriding the config file
        #[arg(long)]
        addr: Option<String>,

        /// Directory of static files, overriding the config file
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// Glob of HTML templates, overriding the config file
        #[arg(long)]
        templates: Option<String>,
    },
    /// Print the demo route table
    Routes {
        /// YAML server configuration file
        #[arg(short, long, env = "GROVE_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Deserialize, Serialize)]
struct Login {
    username: String,
    password: String,
}

pub(crate) fn resolve_config(
    path: Option<&PathBuf>,
    addr: Option<String>,
    static_dir: Option<PathBuf>,
    templates: Option<String>,
) -> anyhow::Result<ServerConfig> {
    let mut config = match path {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(addr) = addr {
        config.addr = addr;
    }
    if static_dir.is_some() {
        config.static_dir = static_dir;
    }
    if templates.is_some() {
        config.templates = templates;
    }
    Ok(config)
}

fn index(c: &mut Context) {
    c.html(StatusCode::OK, "<h1>Hello grove</h1>");
}

fn hello_query(c: &mut Context) {
    let name = c.query("name").unwrap_or_default().to_string();
    c.string(
        StatusCode::OK,
        format!("hello {name}, you're at {}\n", c.path()),
    );
}

fn hello_param(c: &mut Context) {
    let name = c.param("name").unwrap_or_default().to_string();
    c.string(
        StatusCode::OK,
        format!("hello {name}, you're at {}\n", c.path()),
    );
}

fn login(c: &mut Context) {
    let login: Result<Login, _> = serde_json::from_slice(c.body());
    match login {
        Ok(login) => c.json(StatusCode::OK, &json!({ "username": login.username })),
        Err(_) => match (c.post_form("username"), c.post_form("password")) {
            (Some(username), Some(_)) => c.json(StatusCode::OK, &json!({ "username": username })),
            _ => c.json(
                StatusCode::BAD_REQUEST,
                &json!({ "error": "username and password are required" }),
            ),
        },
    }
}

/// Assemble the demo application described by `config`.
///
/// # Errors
///
/// Fails if the configured templates cannot be loaded or a route is invalid.
pub fn build_engine(config: &ServerConfig) -> anyhow::Result<Engine> {
    let mut engine = Engine::new();
    engine.use_middleware(request_span());

    let has_index = match &config.templates {
        Some(glob) => {
            engine.load_html_glob(glob)?;
            engine
                .templates_mut()
                .names()
                .iter()
                .any(|n| n == "index.tmpl")
        }
        None => false,
    };
    if has_index {
        engine.get("/", |c| {
            let path = c.path().to_string();
            c.html_template(StatusCode::OK, "index.tmpl", &json!({ "path": path }));
        })?;
    } else {
        engine.get("/", index)?;
    }
    engine.get("/hello", hello_query)?;
    engine.get("/hello/:name", hello_param)?;

    if let Some(dir) = &config.static_dir {
        engine.static_files(&config.static_prefix, dir.clone())?;
    }

    let mut v1 = engine.group("/v1")?;
    v1.use_middleware(logger());
    v1.get("/hello", hello_query)?;
    v1.post("/login", login)?;

    Ok(engine)
}

#[cfg(unix)]
fn wait_for_shutdown_signal() -> anyhow::Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals =
        Signals::new([SIGINT, SIGTERM]).context("failed to install signal handlers")?;
    if let Some(signal) = signals.forever().next() {
        info!(signal, "Shutdown signal received");
    }
    Ok(())
}

#[cfg(not(unix))]
fn wait_for_shutdown_signal() -> anyhow::Result<()> {
    loop {
        std::thread::park();
    }
}

/// Execute the CLI command provided by the user
///
/// # Errors
///
/// Returns an error if logging cannot be initialised, the configuration or
/// templates cannot be loaded, or the server fails to bind.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging_with_config(&LogConfig::from_env())?;

    match cli.command {
        Commands::Serve {
            config,
            addr,
            static_dir,
            templates,
        } => {
            let config = resolve_config(config.as_ref(), addr, static_dir, templates)?;
            RuntimeConfig::from_env().apply();

            let table = build_engine(&config)?.seal();
            let handle = table
                .start(config.addr.as_str())
                .with_context(|| format!("failed to bind {}", config.addr))?;
            wait_for_shutdown_signal()?;
            handle.stop();
            Ok(())
        }
        Commands::Routes { config } => {
            let config = resolve_config(config.as_ref(), None, None, None)?;
            for (method, pattern) in build_engine(&config)?.seal().routes() {
                println!("{method:<7} {pattern}");
            }
            Ok(())
        }
    }
}
