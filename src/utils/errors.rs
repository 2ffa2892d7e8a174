use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatcherError {
    #[error("Certificate decode error: {0}")]
    Decode(String),

    #[error("Certificate parsing error: {0}")]
    Parse(String),

    #[error("Kubernetes API error: {0}")]
    Cluster(#[from] kube::Error),

    #[error("Scan failed ({context}): {source}")]
    Scan {
        context: String,
        #[source]
        source: Box<WatcherError>,
    },

    #[error("Notification error: {0}")]
    Notify(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WatcherError {
    /// Wrap an error raised while scanning, naming where it happened
    pub fn scan(context: impl Into<String>, source: WatcherError) -> Self {
        Self::Scan {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// True for failures caused by the certificate material itself
    pub fn is_certificate_error(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::Parse(_))
    }
}

pub type Result<T> = std::result::Result<T, WatcherError>;
