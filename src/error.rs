use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// The error taxonomy for the election node.
///
/// Errors raised inside a role loop (`SendFailed`, `MalformedPacket`,
/// `PingTimeout`, `StaleTerm`) are logged and swallowed by the loop itself;
/// they never reach a caller. Construction and the control API
/// (`Run`/`AddMember`/`DelMember`) propagate their errors normally.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Bad `ListenAddr`/`Cluster` entry, or a rejected `Logger`.
    ConfigInvalid(String),
    /// `Run` called while the node is not `Shutdown`.
    AlreadyRunning,
    /// The datagram socket failed to bind.
    BindFailed(String),
    /// `AddMember` on an address already in the registry.
    AlreadyExists(String),
    /// `DelMember`/`requeue` on an address not in the registry.
    NotFound(String),
    /// A decoded packet did not parse into a known message kind.
    MalformedPacket(String),
    /// A datagram send failed.
    SendFailed(String),
    /// A follower's heartbeat probe did not get a reply in time.
    PingTimeout,
    /// A message carried a term below the locally observed term.
    StaleTerm,
    /// Anything else (I/O, address parsing) not worth its own variant.
    Internal(String),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConfigInvalid(s) => write!(f, "invalid configuration: {}", s),
            Error::AlreadyRunning => write!(f, "node is already running"),
            Error::BindFailed(s) => write!(f, "failed to bind listen address: {}", s),
            Error::AlreadyExists(s) => write!(f, "member already exists: {}", s),
            Error::NotFound(s) => write!(f, "member not found: {}", s),
            Error::MalformedPacket(s) => write!(f, "malformed packet: {}", s),
            Error::SendFailed(s) => write!(f, "send failed: {}", s),
            Error::PingTimeout => write!(f, "ping timed out"),
            Error::StaleTerm => write!(f, "message carried a stale term"),
            Error::Internal(s) => write!(f, "{}", s),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Internal(err.to_string())
    }
}

impl From<std::net::AddrParseError> for Error {
    fn from(err: std::net::AddrParseError) -> Self {
        Error::ConfigInvalid(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::MalformedPacket(err.to_string())
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for Error {
    fn from(err: tokio::sync::mpsc::error::SendError<T>) -> Self {
        Error::Internal(err.to_string())
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for Error {
    fn from(err: tokio::sync::oneshot::error::RecvError) -> Self {
        Error::Internal(err.to_string())
    }
}
