//! # homework-bot
//!
//! Polls the Practicum homework-review API and forwards status changes to a
//! Telegram chat.
//!
//! Every cycle fetches the homeworks whose status changed since the last
//! successful poll, validates the payload, translates each status into a
//! human-readable verdict, and sends one message per homework. A failed cycle
//! is logged and retried after the same fixed period. Nothing but a missing
//! credential at startup stops the loop.
//!
//! ## Quick Start
//!
//! ```no_run
//! use homework_bot::{Config, run_until_shutdown};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     run_until_shutdown(&config).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Homework API client
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Chat notifications
pub mod notifier;
/// The polling-and-notification loop
pub mod poll_loop;
/// Core types
pub mod types;
/// Payload validation
pub mod validation;
/// Status-to-verdict translation
pub mod verdict;

// Re-export commonly used types
pub use client::{HomeworkSource, PracticumClient};
pub use config::{ApiConfig, Config, Credentials, PollConfig, TelegramConfig};
pub use error::{Error, Result, ValidationError};
pub use notifier::{Messenger, Notifier, TelegramBot};
pub use poll_loop::{Clock, CycleReport, LoopState, PollLoop, SystemClock};
pub use types::{ApiResponse, Cursor, Homework, HomeworkStatus};

use std::sync::Arc;

/// Wire the production components together from a config
///
/// # Errors
///
/// Returns an error if either HTTP client cannot be built.
pub fn build_poll_loop(config: &Config) -> Result<PollLoop> {
    let source = PracticumClient::new(&config.api, &config.credentials.practicum_token)?;
    let bot = TelegramBot::new(&config.telegram, &config.credentials.telegram_token)?;
    let notifier = Notifier::new(Arc::new(bot), config.credentials.telegram_chat_id.clone());

    Ok(PollLoop::new(
        Arc::new(source),
        notifier,
        Arc::new(SystemClock),
        &config.polling,
    ))
}

/// Run the poll loop until a termination signal arrives
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// A cycle in flight when the signal arrives is dropped; the cursor is not
/// persisted, so nothing else needs flushing.
///
/// # Errors
///
/// Returns an error if the poll loop cannot be built.
pub async fn run_until_shutdown(config: &Config) -> Result<()> {
    let poll_loop = build_poll_loop(config)?;

    tokio::select! {
        _ = poll_loop.run() => {}
        _ = wait_for_signal() => {
            tracing::info!("Shutting down homework bot");
        }
    }
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
