//! FalconCare application binary - composition root.
//!
//! 1. Parse CLI arguments and install tracing
//! 2. Load configuration from TOML
//! 3. Pick the remote backend (HTTP webhook or offline)
//! 4. Open a conversation and render it while reading commands from stdin

mod cli;
mod render;

use std::sync::Arc;

use clap::Parser;
use falcon_chat::{ChatError, ChatOrchestrator, Dialer, HttpBackend, OfflineBackend, RemoteBackend};
use falcon_core::FalconConfig;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use cli::CliArgs;
use render::{Command, Renderer, HELP};

/// Dialer for the terminal: there is no phone, so print the number.
struct CliDialer;

impl Dialer for CliDialer {
    fn dial(&self, number: &str) {
        println!("  📞 Dialing {} ... please call this number from your phone.", number);
        tracing::info!(number, "Dial requested");
    }
}

fn report(result: Result<(), ChatError>) {
    match result {
        Ok(()) | Err(ChatError::InputRejected) => {}
        Err(e) => eprintln!("  ! {}", e),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Tracing. RUST_LOG wins; otherwise the configured level is applied once
    // the config is loaded.
    let env_filter = EnvFilter::try_from_default_env();
    let level_from_env = env_filter.is_ok();
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter.unwrap_or_else(|_| {
            EnvFilter::new(args.log_level.as_deref().unwrap_or("info"))
        }))
        .with_filter_reloading();
    let filter = builder.reload_handle();
    builder.init();

    tracing::info!("Starting FalconCare v{}", env!("CARGO_PKG_VERSION"));

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = FalconConfig::load_or_default(&config_file);
    args.apply_overrides(&mut config);
    if !level_from_env {
        filter.reload(EnvFilter::new(&config.general.log_level))?;
    }

    // Backend.
    let remote: Arc<dyn RemoteBackend> = if config.remote.enabled {
        tracing::info!(endpoint = %config.remote.endpoint, "Using remote backend");
        Arc::new(HttpBackend::new(&config.remote)?)
    } else {
        tracing::info!("Remote backend disabled, answering locally");
        Arc::new(OfflineBackend)
    };

    let chat = ChatOrchestrator::open(&config, remote).with_dialer(Arc::new(CliDialer));

    // Render task: prints new messages and the typing indicator.
    let mut rx = chat.subscribe();
    let render = tokio::spawn(async move {
        let mut renderer = Renderer::default();
        loop {
            let closed = {
                let state = rx.borrow_and_update();
                for line in renderer.render(&state) {
                    println!("{}", line);
                }
                state.is_closed()
            };
            if closed || rx.changed().await.is_err() {
                break;
            }
        }
    });

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Empty => {}
            Command::Quit => break,
            Command::Help => println!("{}", HELP),
            Command::Unknown(cmd) => eprintln!("  ! Unknown command {}. Type /help.", cmd),
            Command::Submit(text) => report(chat.submit(&text)),
            Command::Press(n) => {
                let button = chat
                    .snapshot()
                    .last_bot_message()
                    .and_then(|m| m.buttons().get(n - 1).cloned());
                match button {
                    Some(button) => report(chat.press(&button).map(|_| ())),
                    None => eprintln!("  ! The latest reply has no button {}", n),
                }
            }
            Command::Suggest(n) => {
                let suggestion = chat
                    .snapshot()
                    .last_bot_message()
                    .and_then(|m| m.suggestions().get(n - 1).cloned());
                match suggestion {
                    Some(text) => report(chat.submit(&text)),
                    None => eprintln!("  ! The latest reply has no suggestion {}", n),
                }
            }
        }
    }

    chat.close();
    let _ = render.await;
    tracing::info!("FalconCare stopped");

    Ok(())
}
