use crate::cli::args::Cli;
use crate::cluster::KubeSecretSource;
use crate::notify::SmtpMailer;
use crate::utils::errors::Result;
use crate::watch::{CycleDriver, RunMode};
use std::io;
use tokio_util::sync::CancellationToken;

pub async fn handle_command(cli: Cli) -> Result<()> {
    // Initialize logging - always to stderr
    if !cli.quiet {
        let log_level = match cli.verbose {
            0 => "certificate_watcher=info",  // Default: info
            1 => "certificate_watcher=debug", // -v: debug level
            _ => "certificate_watcher=trace", // -vv+: trace level
        };

        tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_env_filter(log_level)
            .init();
    }

    let config = cli.watch_config()?;
    let mode = RunMode::from_config(&config);
    tracing::info!(
        "Watching tls secrets: interval={:?}, warning_days={}, cluster={:?}, mode={:?}",
        config.interval,
        config.warning_days,
        config.cluster_name,
        mode
    );

    let source = KubeSecretSource::connect(config.kubeconfig.as_deref()).await?;
    let mailer = SmtpMailer::new(&config.smtp)?;
    let driver = CycleDriver::from_config(source, mailer, &config);

    let cancel = CancellationToken::new();
    spawn_shutdown_listener(cancel.clone())?;

    driver.execute(mode, cancel).await
}

/// Cancel `cancel` on SIGTERM or Ctrl-C
fn spawn_shutdown_listener(cancel: CancellationToken) -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::spawn(async move {
            tokio::select! {
                _ = terminate.recv() => tracing::info!("Received SIGTERM. Terminating..."),
                _ = tokio::signal::ctrl_c() => tracing::info!("Received interrupt. Terminating..."),
            }
            cancel.cancel();
        });
    }

    #[cfg(not(unix))]
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received interrupt. Terminating...");
        }
        cancel.cancel();
    });

    Ok(())
}
