//! The polling-and-notification loop
//!
//! One cycle fetches homeworks changed since the cursor, validates the payload,
//! sends one notification per homework (or a single "no homeworks" message),
//! and advances the cursor to the response's `current_date`. Cycles never
//! overlap. Any error is caught at the cycle boundary and logged, and the loop
//! then sleeps for the fixed retry period before trying again.
//!
//! # Example
//!
//! ```no_run
//! use homework_bot::client::PracticumClient;
//! use homework_bot::notifier::{Notifier, TelegramBot};
//! use homework_bot::poll_loop::{PollLoop, SystemClock};
//! use homework_bot::Config;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let source = PracticumClient::new(&config.api, &config.credentials.practicum_token)?;
//! let bot = TelegramBot::new(&config.telegram, &config.credentials.telegram_token)?;
//! let notifier = Notifier::new(Arc::new(bot), config.credentials.telegram_chat_id.clone());
//!
//! let poll_loop = PollLoop::new(Arc::new(source), notifier, Arc::new(SystemClock), &config.polling);
//!
//! // Runs until the process is terminated
//! poll_loop.run().await;
//! # Ok(())
//! # }
//! ```

use crate::client::HomeworkSource;
use crate::config::PollConfig;
use crate::error::Result;
use crate::notifier::Notifier;
use crate::types::Cursor;
use crate::validation::check_response;
use crate::verdict::{NO_HOMEWORKS_MESSAGE, parse_status};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};


/// Source of wall-clock time and sleeping
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current time as epoch seconds
    fn now(&self) -> i64;

    /// Pause the loop for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Real clock backed by the system time and the tokio timer
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Where the loop currently is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// Constructed, no cycle has run yet
    Starting,
    /// A cycle is in flight
    Running,
    /// Waiting out the retry period
    Sleeping,
}

/// Summary of one successful cycle
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CycleReport {
    /// Cursor the fetch was made with
    pub from_date: Cursor,
    /// Number of homeworks in the response
    pub homeworks: usize,
    /// Notifications attempted (one per homework, or one "no homeworks" message)
    pub notifications: usize,
    /// Notifications the chat service accepted
    pub delivered: usize,
    /// New cursor, if the response advanced it
    pub advanced_to: Option<Cursor>,
}

/// Polls the homework API and forwards status changes to the chat
pub struct PollLoop {
    /// Where homework payloads come from
    source: Arc<dyn HomeworkSource>,

    /// Chat the notifications go to
    notifier: Notifier,

    /// Time source and sleeper
    clock: Arc<dyn Clock>,

    /// Pause between cycles
    retry_period: Duration,

    /// Lower bound of the next fetch window
    cursor: Cursor,

    /// Current loop state
    state: LoopState,
}

impl PollLoop {
    /// Create a loop whose cursor starts at the clock's current time
    pub fn new(
        source: Arc<dyn HomeworkSource>,
        notifier: Notifier,
        clock: Arc<dyn Clock>,
        config: &PollConfig,
    ) -> Self {
        let cursor = Cursor(clock.now());
        Self {
            source,
            notifier,
            clock,
            retry_period: config.retry_period,
            cursor,
            state: LoopState::Starting,
        }
    }

    /// Start from an explicit cursor instead of the current time
    pub fn with_cursor(mut self, cursor: Cursor) -> Self {
        self.cursor = cursor;
        self
    }

    /// Lower bound of the next fetch window
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Current loop state
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Pause between cycles
    pub fn retry_period(&self) -> Duration {
        self.retry_period
    }

    /// Run one fetch-validate-notify-advance cycle
    ///
    /// Homeworks are notified in API order. Delivery failures do not abort
    /// the cycle. The cursor only moves if every step succeeds and the
    /// response carries a truthy `current_date`.
    ///
    /// # Errors
    ///
    /// Returns the first fetch, validation or formatting error. Notifications
    /// sent before the error stay sent, and the cursor is left unchanged.
    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        self.state = LoopState::Running;
        let from_date = self.cursor;
        debug!(from_date = %from_date, "Cycle started");

        let payload = self.source.fetch(from_date).await?;
        let response = check_response(&payload)?;

        let mut notifications = 0;
        let mut delivered = 0;
        if response.homeworks.is_empty() {
            debug!("No homework status changes");
            notifications += 1;
            delivered += usize::from(self.notifier.send(NO_HOMEWORKS_MESSAGE).await);
        } else {
            for homework in &response.homeworks {
                let message = parse_status(homework)?;
                notifications += 1;
                delivered += usize::from(self.notifier.send(&message).await);
            }
        }

        let advanced_to = response.next_cursor();
        if let Some(next) = advanced_to {
            self.cursor = next;
        }

        Ok(CycleReport {
            from_date,
            homeworks: response.homeworks.len(),
            notifications,
            delivered,
            advanced_to,
        })
    }

    /// Run one cycle, log its outcome, then sleep for the retry period
    ///
    /// Never fails: a cycle error is logged and swallowed. The sleep happens
    /// whether or not the cycle succeeded.
    pub async fn tick(&mut self) -> Option<CycleReport> {
        let report = match self.run_cycle().await {
            Ok(report) => {
                info!(
                    from_date = %report.from_date,
                    homeworks = report.homeworks,
                    delivered = report.delivered,
                    notifications = report.notifications,
                    cursor = %self.cursor,
                    "Cycle completed"
                );
                Some(report)
            }
            Err(e) => {
                error!(
                    error = %e,
                    code = e.error_code(),
                    transient = e.is_transient(),
                    cursor = %self.cursor,
                    "Cycle failed"
                );
                None
            }
        };

        self.state = LoopState::Sleeping;
        debug!(period = ?self.retry_period, "Sleeping until next cycle");
        self.clock.sleep(self.retry_period).await;
        report
    }

    /// Run cycles forever
    pub async fn run(mut self) {
        info!(
            cursor = %self.cursor,
            period = ?self.retry_period,
            chat_id = %self.notifier.chat_id(),
            "Poll loop started"
        );
        loop {
            let _ = self.tick().await;
        }
    }
}
