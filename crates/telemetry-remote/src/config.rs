//! SSH connection configuration.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Credentials offered to the remote host, in the order `ssh2` tries them.
pub enum AuthMethod {
    Password(String),
    PrivateKey {
        path: PathBuf,
        passphrase: Option<String>,
    },
    Agent,
}

/// A host-key verification callback: given the host string and the raw key
/// bytes presented by the server, return whether to trust it.
pub type HostKeyCallback = Arc<dyn Fn(&str, &[u8]) -> bool + Send + Sync>;

/// How the transport verifies the remote host's identity.
///
/// There is deliberately no `Default`: callers must pick one, so that
/// skipping verification is always a conscious choice recorded in code,
/// never a config field silently left at its zero value.
pub enum HostKeyPolicy {
    /// A custom callback, consulted before any other mode.
    Callback(HostKeyCallback),
    /// Verify against a `known_hosts` file, which must exist at construction
    /// time.
    KnownHosts(PathBuf),
    /// Skip verification entirely. For test environments only.
    InsecureIgnore,
}

/// Reconnection backoff parameters.
#[derive(Debug, Clone, Copy)]
pub struct ReconnectConfig {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// `0` means unbounded.
    pub max_attempts: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5 * 60),
            max_attempts: 0,
        }
    }
}

/// Full configuration for one remote SSH-backed platform.
pub struct SshConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub auth: AuthMethod,
    pub host_key_policy: Option<HostKeyPolicy>,
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
    pub keepalive_interval: Duration,
    pub keepalive_timeout: Duration,
    pub reconnect: ReconnectConfig,
    /// Skip `uname`-based OS auto-detection and use this instead.
    pub forced_os: Option<crate::os_detect::RemoteOs>,
}

impl SshConfig {
    /// Start building a config for `user@host`, defaulting port 22 and the
    /// other timing parameters to the values in the spec's component design.
    pub fn new(host: impl Into<String>, username: impl Into<String>, auth: AuthMethod) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: username.into(),
            auth,
            host_key_policy: None,
            connect_timeout: Duration::from_secs(10),
            command_timeout: Duration::from_secs(5),
            keepalive_interval: Duration::from_secs(30),
            keepalive_timeout: Duration::from_secs(15),
            reconnect: ReconnectConfig::default(),
            forced_os: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_host_key_policy(mut self, policy: HostKeyPolicy) -> Self {
        self.host_key_policy = Some(policy);
        self
    }

    pub fn with_forced_os(mut self, os: crate::os_detect::RemoteOs) -> Self {
        self.forced_os = Some(os);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let cfg = SshConfig::new("example.com", "deploy", AuthMethod::Agent);
        assert_eq!(cfg.port, 22);
        assert_eq!(cfg.connect_timeout, Duration::from_secs(10));
        assert_eq!(cfg.command_timeout, Duration::from_secs(5));
        assert_eq!(cfg.keepalive_interval, Duration::from_secs(30));
        assert_eq!(cfg.keepalive_timeout, Duration::from_secs(15));
        assert_eq!(cfg.reconnect.initial_delay, Duration::from_secs(1));
        assert_eq!(cfg.reconnect.max_delay, Duration::from_secs(300));
        assert_eq!(cfg.reconnect.max_attempts, 0);
        assert!(cfg.host_key_policy.is_none());
    }
}
