//! termfolio - terminal portfolio
//!
//! USAGE:
//!   termfolio                       # interactive terminal
//!   termfolio --exec "<line>"       # run one line, print the new records
//!   termfolio serve [--port N]      # HTTP presentation
//!   termfolio doctor                # check config, key, network
//!   termfolio history [--clear]     # show or clear command history
//!   termfolio config set <k> <v>    # non-interactive config

use anyhow::{Context, Result};
use std::sync::Arc;

use termfolio::client::{self, OpenRouterClient};
use termfolio::commands::Registry;
use termfolio::config::{self, Config};
use termfolio::delegate::AiDelegate;
use termfolio::history::{HistoryStore, JsonFileStorage};
use termfolio::interpreter::Interpreter;
use termfolio::logging;
use termfolio::profile::Profile;
use termfolio::record::RecordKind;
use termfolio::server;
use termfolio::session::{Outcome, Session};
use termfolio::ui::{self, UiOptions};

// ═══════════════════════════════════════════════════════════════
// CLI
// ═══════════════════════════════════════════════════════════════

#[derive(Debug)]
enum Command {
    Interactive { no_boot: bool },
    Exec { line: String },
    Serve { port: Option<u16> },
    Doctor,
    History { clear: bool },
    ConfigSet { key: String, value: String },
    Help,
}

fn parse_args() -> Result<Command> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        return Ok(Command::Help);
    }

    match args.first().map(|s| s.as_str()) {
        Some("doctor") => return Ok(Command::Doctor),
        Some("history") => {
            return Ok(Command::History {
                clear: args.iter().any(|a| a == "--clear"),
            })
        }
        Some("config") if args.get(1).map(|s| s.as_str()) == Some("set") => {
            return Ok(Command::ConfigSet {
                key: args.get(2).cloned().unwrap_or_default(),
                value: args.get(3).cloned().unwrap_or_default(),
            });
        }
        Some("serve") => {
            let port = match args.iter().position(|a| a == "--port" || a == "-p") {
                Some(i) => {
                    let raw = args.get(i + 1).context("--port needs a value")?;
                    Some(raw.parse().with_context(|| format!("Invalid port: {}", raw))?)
                }
                None => None,
            };
            return Ok(Command::Serve { port });
        }
        _ => {}
    }

    let mut no_boot = false;
    let mut exec = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--no-boot" => no_boot = true,
            "--exec" | "-e" => {
                i += 1;
                exec = Some(args.get(i).cloned().context("--exec needs a command line")?);
            }
            other => anyhow::bail!("Unknown argument: {} (see --help)", other),
        }
        i += 1;
    }

    Ok(match exec {
        Some(line) => Command::Exec { line },
        None => Command::Interactive { no_boot },
    })
}

fn print_help() {
    println!(r#"termfolio - terminal portfolio with an AI assistant

USAGE:
    termfolio                       # interactive terminal
    termfolio --exec "<line>"       # run one line and print the result
    termfolio serve [--port N]      # HTTP presentation (default port 3000)
    termfolio doctor                # check config, key, network
    termfolio history [--clear]     # show or clear command history
    termfolio config set <key> <v>  # key | model | typing | timeout

FLAGS:
    -e, --exec <line>       Run one command line non-interactively
    -p, --port <n>          Port for `serve`
        --no-boot           Skip the boot splash
    -h, --help              Show this help

FILES:
    ~/.config/termfolio/config.json        API key, model, preferences
    ~/.config/termfolio/profile.json       Portfolio content override
    ~/.local/state/termfolio/              History and log

ENVIRONMENT:
    OPENROUTER_API_KEY      Override API key from config
    RUST_LOG                Log filter (default: info)

CONTROLS (interactive mode):
    Up/Down     Recall history
    Tab         Complete command name
    PgUp/PgDn   Scroll transcript
    Esc         Quit
"#);
}

// ═══════════════════════════════════════════════════════════════
// MAIN
// ═══════════════════════════════════════════════════════════════

#[tokio::main]
async fn main() -> Result<()> {
    let command = parse_args()?;

    if let Err(e) = config::log_path().and_then(|p| logging::init(&p)) {
        eprintln!("warning: logging disabled: {:#}", e);
    }

    match command {
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Doctor => run_doctor().await,
        Command::ConfigSet { key, value } => run_config_set(&key, &value),
        Command::History { clear } => run_history(clear),
        Command::Exec { line } => run_exec(&line).await,
        Command::Serve { port } => {
            let cfg = Config::load()?;
            let session = build_session(&cfg)?;
            server::run_server(session, port.unwrap_or(cfg.port)).await
        }
        Command::Interactive { no_boot } => {
            let cfg = Config::load()?;
            let session = build_session(&cfg)?;
            let options = UiOptions {
                typing_delay: cfg.typing_delay(),
                boot_splash: cfg.boot_splash && !no_boot,
            };
            ui::run_tui(session, options).await
        }
    }
}

/// Wire profile, history, and the assistant into a fresh session
fn build_session(cfg: &Config) -> Result<Session> {
    let profile = Arc::new(Profile::load_or_builtin(&config::profile_path()?)?);

    let mut delegate = AiDelegate::new(profile.clone()).with_timeout(cfg.request_timeout());
    match cfg.resolve_api_key() {
        Some(key) => {
            let backend = OpenRouterClient::new(&key, &cfg.model());
            delegate = delegate.with_backend(Arc::new(backend));
        }
        None => tracing::info!("no API key, assistant in demo mode"),
    }

    let storage = JsonFileStorage::default_location()?;
    let history = HistoryStore::hydrate(Box::new(storage));

    let interpreter = Interpreter::new(Registry::builtin(), profile, delegate);
    Ok(Session::new(interpreter, history))
}

// ═══════════════════════════════════════════════════════════════
// COMMANDS
// ═══════════════════════════════════════════════════════════════

async fn run_exec(line: &str) -> Result<()> {
    let cfg = Config::load()?;
    let mut session = build_session(&cfg)?;
    let mark = session.transcript().len();

    if session.run(line).await == Outcome::Ignored {
        return Ok(());
    }

    let mut failed = false;
    for record in session.records_after(mark) {
        match record.kind {
            RecordKind::Command => println!("$ {}", record.content),
            RecordKind::Error => {
                failed = true;
                eprintln!("{}", record.content);
            }
            RecordKind::Output | RecordKind::Ai => println!("{}", record.content),
        }
    }

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

async fn run_doctor() -> Result<()> {
    println!("termfolio doctor\n");

    let cfg = Config::load()?;
    println!("[✓] Config: {}", config::config_path()?.display());

    let has_key = cfg.resolve_api_key().is_some();
    println!(
        "[{}] API key: {}",
        if has_key { "✓" } else { "✗" },
        if has_key { "configured" } else { "missing (assistant runs in demo mode)" }
    );
    println!("[✓] Model: {}", cfg.model());

    let profile_path = config::profile_path()?;
    let profile = Profile::load_or_builtin(&profile_path)?;
    println!(
        "[✓] Profile: {} ({})",
        profile.name,
        if profile_path.exists() { profile_path.display().to_string() } else { "built-in".into() }
    );

    let storage = JsonFileStorage::default_location()?;
    let path = storage.path().to_path_buf();
    let history = HistoryStore::hydrate(Box::new(storage));
    println!("[✓] History: {} entries in {}", history.len(), path.display());

    println!("[✓] Log: {}", config::log_path()?.display());

    print!("[?] Network: checking...");
    match client::check_connectivity().await {
        Ok(()) => println!("\r[✓] Network: connected         "),
        Err(e) => println!("\r[✗] Network: {}", e),
    }

    Ok(())
}

fn run_config_set(key: &str, value: &str) -> Result<()> {
    let mut cfg = Config::load()?;
    cfg.set(key, value)?;
    cfg.save()?;
    println!("Saved {} to {}", key, config::config_path()?.display());
    Ok(())
}

fn run_history(clear: bool) -> Result<()> {
    let storage = JsonFileStorage::default_location()?;
    let mut history = HistoryStore::hydrate(Box::new(storage));

    if clear {
        history.clear()?;
        println!("History cleared");
        return Ok(());
    }

    for (i, entry) in history.entries().iter().enumerate() {
        println!("{:>4}  {}", i + 1, entry);
    }
    Ok(())
}
