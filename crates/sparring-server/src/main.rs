use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use coordination::modes::{icon_for, label_for};
use coordination::{ChatTurn, Conversation, DebateOrchestrator, Mode, Transcript};
use sparring_server::{build_generator, ServerConfig};
use tokio::sync::mpsc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API server (the default)
    Serve {
        /// Listen port (overrides PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Send a single message and print the reply
    Ask {
        /// contrarian or agreeable
        #[arg(long, default_value = "contrarian")]
        mode: Mode,
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// Run a two-speaker debate in the terminal; Ctrl-C stops it
    Debate {
        #[arg(long)]
        topic: String,
        /// Stop after this many turns (default: run until Ctrl-C)
        #[arg(long)]
        turns: Option<u32>,
        /// Pause between turns in milliseconds (overrides DEBATE_TURN_DELAY_MS)
        #[arg(long)]
        delay_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("warning: failed to load .env: {e}");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let mut config = ServerConfig::from_env();

    match args.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            sparring_server::serve(&config).await
        }
        Command::Ask { mode, message } => ask(&config, mode, &message.join(" ")).await,
        Command::Debate {
            topic,
            turns,
            delay_ms,
        } => {
            if let Some(ms) = delay_ms {
                config.turn_delay = Duration::from_millis(ms);
            }
            debate(&config, &topic, turns).await
        }
    }
}

async fn ask(config: &ServerConfig, mode: Mode, message: &str) -> Result<()> {
    if mode == Mode::Debate {
        bail!("use the `debate` subcommand for debate mode");
    }
    let mut conversation = Conversation::new(build_generator(config)?);
    let turn = conversation.send(mode, message).await?;

    println!("{} {}: {}", icon_for(mode), label_for(mode), turn.content);
    if turn.is_error() {
        bail!("message exchange failed");
    }
    Ok(())
}

async fn debate(config: &ServerConfig, topic: &str, turns: Option<u32>) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<ChatTurn>();
    let mut orchestrator =
        DebateOrchestrator::with_config(build_generator(config)?, config.debate(turns))
            .with_turn_sink(tx);

    let stop = orchestrator.start(topic)?;
    info!(topic, turns = ?turns, delay_ms = config.turn_delay.as_millis() as u64, "debate starting");
    println!("{} Debate: {topic}\n", icon_for(Mode::Debate));

    let printer = tokio::spawn(async move {
        while let Some(turn) = rx.recv().await {
            let who = turn.speaker.map(|s| s.role_name()).unwrap_or("debate");
            println!("[{who}] {}\n", turn.content);
        }
    });

    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, stopping debate after the current step");
            stop.stop();
        }
    });

    let mut transcript = Transcript::new();
    let outcome = orchestrator.run(&mut transcript).await;
    ctrl_c.abort();
    // closes the turn channel so the printer drains and exits
    drop(orchestrator);
    printer.await?;

    println!("{}", outcome.summary_line());
    if transcript.error_count() > 0 {
        bail!("debate halted on a failed turn");
    }
    Ok(())
}
