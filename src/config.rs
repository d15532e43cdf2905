use std::net::SocketAddr;

use crate::error::{Error, Result};
use crate::timing::Timing;

/// Node configuration.
///
/// Diagnostic output goes through the `log` facade rather than a
/// `Config`-level sink: the host process installs whatever `log::Log`
/// implementation it wants (the CLI binary installs `env_logger` against
/// stderr). Validation checks the two things that remain meaningful: a
/// non-empty, parseable `listen_addr`, and parseable `cluster` entries.
#[derive(Clone, Debug)]
pub struct Config {
    pub listen_addr: String,
    pub cluster: Vec<String>,
    /// When false (the default), datagrams from senders outside the peer
    /// registry are dropped before decoding. Set true to accept from any
    /// sender, e.g. while a newcomer is still being added as a member.
    pub accept_unknown_senders: bool,
    pub timing: Timing,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:55031".to_string(),
            cluster: Vec::new(),
            accept_unknown_senders: false,
            timing: Timing::default(),
        }
    }
}

/// A `Config` that has passed `validate()`: its `listen_addr` and every
/// `cluster` entry are known to parse as socket addresses.
pub struct ValidConfig {
    pub listen_addr: SocketAddr,
    pub cluster: Vec<SocketAddr>,
    pub accept_unknown_senders: bool,
    pub timing: Timing,
}

impl Config {
    pub fn validate(&self) -> Result<ValidConfig> {
        if self.listen_addr.is_empty() {
            return Err(Error::ConfigInvalid("listen_addr must not be empty".into()));
        }
        let listen_addr: SocketAddr = self
            .listen_addr
            .parse()
            .map_err(|e: std::net::AddrParseError| Error::ConfigInvalid(e.to_string()))?;

        let mut cluster = Vec::with_capacity(self.cluster.len());
        for addr in &self.cluster {
            let parsed: SocketAddr = addr
                .parse()
                .map_err(|e: std::net::AddrParseError| Error::ConfigInvalid(e.to_string()))?;
            cluster.push(parsed);
        }

        self.timing.assert_ordered();

        Ok(ValidConfig {
            listen_addr,
            cluster,
            accept_unknown_senders: self.accept_unknown_senders,
            timing: self.timing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_listen_addr() {
        let cfg = Config { listen_addr: String::new(), ..Config::default() };
        assert!(matches!(cfg.validate(), Err(Error::ConfigInvalid(_))));
    }

    #[test]
    fn rejects_unparseable_listen_addr() {
        let cfg = Config { listen_addr: "not-an-address".into(), ..Config::default() };
        assert!(matches!(cfg.validate(), Err(Error::ConfigInvalid(_))));
    }

    #[test]
    fn rejects_unparseable_cluster_entry() {
        let cfg = Config {
            cluster: vec!["also-not-an-address".into()],
            ..Config::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::ConfigInvalid(_))));
    }

    #[test]
    fn accepts_defaults() {
        assert!(Config::default().validate().is_ok());
    }
}
