use crate::cert::{warning_threshold, ScanResult};
use crate::cluster::SecretSource;
use crate::notify::{MailTransport, Notifier};
use crate::scan::ExpiryScanner;
use crate::utils::errors::Result;
use crate::watch::config::WatchConfig;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// A single cycle; its error is returned to the caller
    Once,
    /// Cycles on every interval until cancelled; errors are logged
    Loop,
}

impl RunMode {
    pub fn from_config(config: &WatchConfig) -> Self {
        if config.run_once {
            Self::Once
        } else {
            Self::Loop
        }
    }
}

/// Runs scan-and-notify cycles
pub struct CycleDriver<S, T> {
    scanner: ExpiryScanner<S>,
    notifier: Notifier<T>,
    interval: Duration,
    warning_days: u32,
}

impl<S: SecretSource, T: MailTransport> CycleDriver<S, T> {
    pub fn new(
        scanner: ExpiryScanner<S>,
        notifier: Notifier<T>,
        interval: Duration,
        warning_days: u32,
    ) -> Self {
        Self {
            scanner,
            notifier,
            interval,
            warning_days,
        }
    }

    /// Wire a driver from the runtime configuration
    pub fn from_config(source: S, transport: T, config: &WatchConfig) -> Self {
        let scanner = ExpiryScanner::new(source).with_policy(config.invalid_certificates);
        let notifier = Notifier::new(
            transport,
            config.sender.clone(),
            config.recipient.clone(),
            config.cluster_name.clone(),
        );
        Self::new(scanner, notifier, config.interval, config.warning_days)
    }

    pub async fn execute(&self, mode: RunMode, cancel: CancellationToken) -> Result<()> {
        match mode {
            RunMode::Once => self.run_once().await,
            RunMode::Loop => {
                self.run(cancel).await;
                Ok(())
            }
        }
    }

    /// One scan-and-notify cycle against the current time
    pub async fn run_once(&self) -> Result<()> {
        self.run_cycle_at(Utc::now()).await.map(|_| ())
    }

    /// One cycle with `now` fixed for the whole scan. Returns what was reported.
    pub async fn run_cycle_at(&self, now: DateTime<Utc>) -> Result<ScanResult> {
        let threshold = warning_threshold(now, self.warning_days);
        tracing::debug!("Reporting certificates expiring before {}", threshold);

        let records = self.scanner.scan(threshold).await?;
        self.notifier.notify(&records).await?;
        Ok(records)
    }

    /// Run a cycle now and then on every interval until `cancel` fires.
    ///
    /// Cancellation is only observed between cycles; a running cycle always
    /// completes. Failed cycles are logged and the loop carries on.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tracing::info!("Starting certificate check...");
            if let Err(e) = self.run_once().await {
                tracing::error!("Certificate check failed: {e}");
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("Terminating main controller loop");
                    return;
                }
                _ = ticker.tick() => {}
            }
        }
    }
}
