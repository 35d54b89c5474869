use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Boxed source error carried inside [`Error`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Offload,
    Config,
    Publish,
    DataStore,
    Service,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Offload => write!(f, "offload"),
            ErrorKind::Config => write!(f, "config"),
            ErrorKind::Publish => write!(f, "publish"),
            ErrorKind::DataStore => write!(f, "data store"),
            ErrorKind::Service => write!(f, "service"),
        }
    }
}

pub struct ErrorInner {
    pub kind: ErrorKind,
    pub source: Option<BoxError>,
    pub message: Option<String>,
}

pub struct Error {
    pub inner: Box<ErrorInner>,
}

impl Error {
    pub fn new<E>(kind: ErrorKind, source: Option<E>) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            inner: Box::new(ErrorInner {
                kind,
                source: source.map(Into::into),
                message: None,
            }),
        }
    }

    pub(crate) fn with_message<E>(kind: ErrorKind, message: String, source: Option<E>) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            inner: Box::new(ErrorInner {
                kind,
                source: source.map(Into::into),
                message: Some(message),
            }),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.inner.kind
    }

    pub fn is_offload(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Offload)
    }

    pub fn is_config(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Config)
    }

    pub fn is_publish(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Publish)
    }

    pub fn is_data_store(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::DataStore)
    }

    /// Returns the offload rule violation behind this error, if any.
    pub fn offload_error(&self) -> Option<&OffloadError> {
        self.inner
            .source
            .as_ref()
            .and_then(|source| source.downcast_ref::<OffloadError>())
    }

    /// Returns the configuration failure behind this error, if any.
    pub fn config_error(&self) -> Option<&ConfigError> {
        self.inner
            .source
            .as_ref()
            .and_then(|source| source.downcast_ref::<ConfigError>())
    }

    pub fn data_store_error(&self) -> Option<&DataStoreError> {
        self.inner
            .source
            .as_ref()
            .and_then(|source| source.downcast_ref::<DataStoreError>())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_struct("payload_offload::Error");
        f.field("kind", &self.inner.kind);
        if let Some(ref message) = self.inner.message {
            f.field("message", message);
        }
        if let Some(ref source) = self.inner.source {
            f.field("source", source);
        }
        f.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref message) = self.inner.message {
            write!(f, "{} error: {}", self.inner.kind, message)?;
        } else {
            write!(f, "{} error", self.inner.kind)?;
        }

        if let Some(ref source) = self.inner.source {
            write!(f, ": {source}")?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .source
            .as_ref()
            .map(|e| &**e as &(dyn StdError + 'static))
    }
}

impl From<OffloadError> for Error {
    fn from(err: OffloadError) -> Self {
        Error::new(ErrorKind::Offload, Some(err))
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::new(ErrorKind::Config, Some(err))
    }
}

impl From<PublishError> for Error {
    fn from(err: PublishError) -> Self {
        Error::new(ErrorKind::Publish, Some(err))
    }
}

impl From<DataStoreError> for Error {
    fn from(err: DataStoreError) -> Self {
        Error::new(ErrorKind::DataStore, Some(err))
    }
}

/// Violations of the offload rules. All of them are caller-fatal.
#[derive(Debug, Error)]
pub enum OffloadError {
    #[error("no destination to publish to: pass one in the request or bind the publisher to one")]
    MissingDestination,
    #[error("message structure `json` cannot be offloaded")]
    UnsupportedStructure,
    #[error("message attribute name {0} is reserved for payload offloading")]
    ReservedAttributeCollision(String),
    #[error("number of message attributes [{count}] exceeds the maximum allowed for large-payload messages [{max}]")]
    TooManyAttributes { count: usize, max: usize },
    #[error("message attributes size {size} is greater than the message size threshold {threshold}, consider including the payload in the message body")]
    AttributesTooLarge { size: usize, threshold: usize },
    #[error("payload offloading misconfigured: {0}")]
    OffloadMisconfigured(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("config load failed: {0}")]
    Load(#[source] BoxError),
    #[error("config parse failed: {0}")]
    Parse(#[source] BoxError),
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("publish failed: {0}")]
    PublishFailed(#[source] BoxError),
}

#[derive(Debug, Error)]
pub enum DataStoreError {
    #[error("{0}")]
    SaveFailed(#[source] BoxError),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidData(#[source] BoxError),
    #[error("invalid object key: {0}")]
    InvalidKey(String),
}

impl Error {
    pub fn missing_destination() -> Self {
        Error::from(OffloadError::MissingDestination)
    }

    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Error::from(ConfigError::InvalidConfiguration(reason.into()))
    }

    pub fn offload_misconfigured(reason: impl Into<String>) -> Self {
        Error::from(OffloadError::OffloadMisconfigured(reason.into()))
    }

    pub fn publish_failed<E: Into<BoxError>>(source: E) -> Self {
        Error::from(PublishError::PublishFailed(source.into()))
    }

    pub fn service<E: Into<BoxError>>(message: impl Into<String>, source: E) -> Self {
        Error::with_message(ErrorKind::Service, message.into(), Some(source))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => {
                Error::from(DataStoreError::NotFound(err.to_string()))
            }
            _ => Error::new(ErrorKind::Service, Some(err)),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::from(DataStoreError::InvalidData(Box::new(err)))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::from(ConfigError::Parse(Box::new(err)))
    }
}
