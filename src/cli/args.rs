use crate::notify::{SmtpSettings, SmtpTls};
use crate::scan::InvalidCertificatePolicy;
use crate::utils::errors::{Result, WatcherError};
use crate::watch::WatchConfig;
use clap::Parser;
use lettre::message::Mailbox;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "certificate-watcher")]
#[command(version = "1.0.0")]
#[command(about = "Watch tls secrets in a k8s cluster")]
#[command(long_about = None)]
pub struct Cli {
    /// K8s config file to use (in-cluster or ~/.kube/config when omitted)
    #[arg(long, env = "CERTIFICATE_WATCHER_KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// Interval between two execution cycles (e.g. 90s, 30m, 1h, 7d)
    #[arg(long, env = "CERTIFICATE_WATCHER_INTERVAL", default_value = "1h", value_parser = parse_interval)]
    pub interval: Duration,

    /// Days from certificate expiration date that will trigger a warning notification
    #[arg(long, env = "CERTIFICATE_WATCHER_WARNING_DAYS", default_value_t = 30)]
    pub warning_days: u32,

    /// SMTP host for email notifications
    #[arg(long, env = "CERTIFICATE_WATCHER_SMTP_HOST")]
    pub smtp_host: Option<String>,

    /// SMTP port to use for notifications
    #[arg(long, env = "CERTIFICATE_WATCHER_SMTP_PORT", default_value_t = 25)]
    pub smtp_port: u16,

    /// SMTP username (no authentication when omitted)
    #[arg(long, env = "CERTIFICATE_WATCHER_SMTP_USER")]
    pub smtp_user: Option<String>,

    /// SMTP password
    #[arg(long, env = "CERTIFICATE_WATCHER_SMTP_PASSWORD", default_value = "", hide_env_values = true)]
    pub smtp_password: String,

    /// How to secure the SMTP connection
    #[arg(long, env = "CERTIFICATE_WATCHER_SMTP_TLS", value_enum, default_value_t = SmtpTls::Opportunistic)]
    pub smtp_tls: SmtpTls,

    /// Email address to send cert expiration warnings to
    #[arg(long, env = "CERTIFICATE_WATCHER_NOTIFY_EMAIL")]
    pub notify_email: Option<String>,

    /// Email address from which to send cert expiration warnings
    #[arg(long, env = "CERTIFICATE_WATCHER_SENDER_EMAIL")]
    pub sender_email: Option<String>,

    /// Name of cluster to use in notifications
    #[arg(long, env = "CERTIFICATE_WATCHER_CLUSTER_NAME", default_value = "")]
    pub cluster_name: String,

    /// Run a single check and exit
    #[arg(long, env = "CERTIFICATE_WATCHER_ONCE")]
    pub once: bool,

    /// Log and skip secrets holding an unreadable certificate instead of failing the check
    #[arg(long, env = "CERTIFICATE_WATCHER_SKIP_INVALID_CERTS")]
    pub skip_invalid_certs: bool,

    /// Increase logging verbosity (-v DEBUG, -vv TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable logging
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Validate the arguments into the runtime configuration
    pub fn watch_config(&self) -> Result<WatchConfig> {
        let host = required(self.smtp_host.as_deref(), "--smtp-host")?;
        let recipient = required(self.notify_email.as_deref(), "--notify-email")?;
        let sender = required(self.sender_email.as_deref(), "--sender-email")?;

        validate_address(&recipient, "--notify-email")?;
        validate_address(&sender, "--sender-email")?;

        let username = self
            .smtp_user
            .as_deref()
            .map(str::trim)
            .filter(|user| !user.is_empty())
            .map(str::to_string);

        let invalid_certificates = if self.skip_invalid_certs {
            InvalidCertificatePolicy::Skip
        } else {
            InvalidCertificatePolicy::Abort
        };

        Ok(WatchConfig {
            interval: self.interval,
            warning_days: self.warning_days,
            cluster_name: self.cluster_name.trim().to_string(),
            smtp: SmtpSettings {
                host,
                port: self.smtp_port,
                username,
                password: self.smtp_password.clone(),
                tls: self.smtp_tls,
            },
            sender,
            recipient,
            run_once: self.once,
            kubeconfig: self.kubeconfig.clone(),
            invalid_certificates,
        })
    }
}

fn required(value: Option<&str>, flag: &str) -> Result<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(WatcherError::Config(format!("{flag} is required"))),
    }
}

fn validate_address(address: &str, flag: &str) -> Result<()> {
    address
        .parse::<Mailbox>()
        .map(|_| ())
        .map_err(|e| WatcherError::Config(format!("{flag}: invalid email address {address}: {e}")))
}

/// Parse an interval such as `3600`, `45s`, `30m`, `1h30m` or `7d`
pub fn parse_interval(value: &str) -> std::result::Result<Duration, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("interval must not be empty".to_string());
    }

    let mut total: u64 = 0;
    let mut digits = String::new();

    for c in value.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }

        let unit: u64 = match c {
            's' => 1,
            'm' => 60,
            'h' => 60 * 60,
            'd' => 24 * 60 * 60,
            _ => return Err(format!("invalid unit '{c}' in interval {value}")),
        };
        if digits.is_empty() {
            return Err(format!("missing number before '{c}' in interval {value}"));
        }

        let amount: u64 = digits
            .parse()
            .map_err(|e| format!("invalid interval {value}: {e}"))?;
        total = amount
            .checked_mul(unit)
            .and_then(|secs| total.checked_add(secs))
            .ok_or_else(|| format!("interval {value} is too large"))?;
        digits.clear();
    }

    // Bare trailing number counts as seconds
    if !digits.is_empty() {
        let amount: u64 = digits
            .parse()
            .map_err(|e| format!("invalid interval {value}: {e}"))?;
        total = total
            .checked_add(amount)
            .ok_or_else(|| format!("interval {value} is too large"))?;
    }

    if total == 0 {
        return Err("interval must be greater than zero".to_string());
    }

    Ok(Duration::from_secs(total))
}
