//! The SSH transport: connection lifecycle, keepalive, reconnection, and
//! command execution.
//!
//! `ssh2` is a blocking library, so every blocking operation runs inside
//! `tokio::task::spawn_blocking`, wrapped in a `tokio::time::timeout` to
//! enforce the configured bound. The transport owns a small dedicated
//! `tokio` runtime so it works whether or not the embedding application is
//! itself async.

use crate::backoff::BackoffState;
use crate::config::{AuthMethod, HostKeyPolicy, SshConfig};
use crate::os_detect::{self, RemoteOs};
use crate::state::ConnectionStateMachine;
use log::{debug, error, warn};
use parking_lot::RwLock;
use std::io::Read;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use telemetry_metrics::{CancellationToken, ConnectionState, ConnectionStats, Error, Result};
use tokio::task::JoinSet;

struct LastError {
    message: String,
    at: SystemTime,
}

struct Inner {
    config: SshConfig,
    state: Arc<ConnectionStateMachine>,
    session: RwLock<Option<ssh2::Session>>,
    connected_since: RwLock<Option<SystemTime>>,
    last_error: RwLock<Option<LastError>>,
    sessions_created: AtomicU64,
    keepalives_sent: AtomicU64,
    keepalives_failed: AtomicU64,
    reconnect_attempts: AtomicU64,
    total_reconnects: AtomicU64,
}

// ssh2::Session wraps raw libssh2 pointers and isn't Send by default; we
// only ever touch it from one task at a time, serialized by `session`'s
// RwLock, so sharing it across the blocking pool is sound.
unsafe impl Send for Inner {}
unsafe impl Sync for Inner {}

impl Inner {
    fn record_error(&self, message: impl Into<String>) {
        *self.last_error.write() = Some(LastError {
            message: message.into(),
            at: SystemTime::now(),
        });
    }
}

/// A live (or reconnecting) SSH connection to one remote host.
pub struct SshTransport {
    inner: Arc<Inner>,
    runtime: tokio::runtime::Runtime,
    cancellation: CancellationToken,
    background: std::sync::Mutex<Option<JoinSet<()>>>,
    detected_os: RwLock<Option<RemoteOs>>,
}

impl SshTransport {
    pub fn new(config: SshConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(|e| Error::io("ssh.runtime", e))?;

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                state: Arc::new(ConnectionStateMachine::new()),
                session: RwLock::new(None),
                connected_since: RwLock::new(None),
                last_error: RwLock::new(None),
                sessions_created: AtomicU64::new(0),
                keepalives_sent: AtomicU64::new(0),
                keepalives_failed: AtomicU64::new(0),
                reconnect_attempts: AtomicU64::new(0),
                total_reconnects: AtomicU64::new(0),
            }),
            runtime,
            cancellation: CancellationToken::new(),
            background: std::sync::Mutex::new(Some(JoinSet::new())),
            detected_os: RwLock::new(None),
        })
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.state.current()
    }

    pub fn on_state_change<F>(&self, callback: F)
    where
        F: Fn(ConnectionState, ConnectionState) + Send + Sync + 'static,
    {
        self.inner.state.on_change(callback);
    }

    /// The remote OS detected during `connect`, or the `forced_os` override
    /// if one was configured. `None` before the first successful connect.
    pub fn detected_os(&self) -> Option<RemoteOs> {
        *self.detected_os.read()
    }

    pub fn stats(&self) -> ConnectionStats {
        let last_error = self.inner.last_error.read();
        ConnectionStats {
            state: self.inner.state.current(),
            connected_since: *self.inner.connected_since.read(),
            reconnect_attempts: self.inner.reconnect_attempts.load(Ordering::SeqCst),
            total_reconnects: self.inner.total_reconnects.load(Ordering::SeqCst),
            sessions_created: self.inner.sessions_created.load(Ordering::SeqCst),
            sessions_reused: 0,
            keepalives_sent: self.inner.keepalives_sent.load(Ordering::SeqCst),
            keepalives_failed: self.inner.keepalives_failed.load(Ordering::SeqCst),
            last_error: last_error.as_ref().map(|e| e.message.clone()),
            last_error_at: last_error.as_ref().map(|e| e.at),
        }
    }

    /// Dial, authenticate, detect the remote OS, and start the keepalive and
    /// reconnect background tasks.
    pub fn connect(&self) -> Result<RemoteOs> {
        if !self.inner.state.transition(ConnectionState::Disconnected, ConnectionState::Connecting) {
            return Err(Error::connection("ssh.connect", "already connecting or connected"));
        }

        match self.dial_and_authenticate() {
            Ok(session) => {
                *self.inner.session.write() = Some(session);
                *self.inner.connected_since.write() = Some(SystemTime::now());
                self.inner
                    .state
                    .transition(ConnectionState::Connecting, ConnectionState::Connected);

                let os = self.detect_os()?;
                *self.detected_os.write() = Some(os);

                self.spawn_background_tasks();
                Ok(os)
            }
            Err(e) => {
                self.inner.record_error(e.to_string());
                self.inner
                    .state
                    .transition(ConnectionState::Connecting, ConnectionState::Disconnected);
                Err(e)
            }
        }
    }

    pub fn close(&self) -> Result<()> {
        self.cancellation.cancel();
        if let Some(mut set) = self.background.lock().unwrap_or_else(|e| e.into_inner()).take() {
            self.runtime.block_on(async {
                while set.join_next().await.is_some() {}
            });
        }
        *self.inner.session.write() = None;
        *self.inner.connected_since.write() = None;
        self.inner.state.force(ConnectionState::Disconnected);
        Ok(())
    }

    /// Run `command` on the remote host and return trimmed stdout.
    pub fn run_command(&self, command: &str) -> Result<String> {
        if self.inner.state.current() != ConnectionState::Connected {
            return Err(Error::connection("ssh.run_command", "not connected"));
        }

        let timeout = self.inner.config.command_timeout;
        let inner = self.inner.clone();
        let command = command.to_string();
        let cancellation = self.cancellation.clone();

        let result = self.runtime.block_on(async move {
            tokio::select! {
                _ = cancellation.cancelled() => Err(Error::Cancelled { operation: "ssh.run_command" }),
                r = tokio::time::timeout(timeout, tokio::task::spawn_blocking(move || {
                    exec_on_session(&inner, &command)
                })) => {
                    match r {
                        Ok(Ok(inner_result)) => inner_result,
                        Ok(Err(_join_error)) => Err(Error::io("ssh.run_command", std::io::Error::other("blocking task panicked"))),
                        Err(_elapsed) => Err(Error::Timeout { operation: "ssh.run_command", elapsed: timeout }),
                    }
                }
            }
        });

        if let Err(ref e) = result {
            if Error::looks_like_connection_error(&e.to_string()) {
                self.trigger_reconnect(e.to_string());
            }
        }
        result
    }

    fn detect_os(&self) -> Result<RemoteOs> {
        if let Some(forced) = self.inner.config.forced_os {
            return Ok(forced);
        }

        let uname = self.run_command_ignoring_state("uname -s").ok();
        if let Ok(os) = os_detect::classify(uname.as_deref(), None) {
            return Ok(os);
        }

        let windows_probe = self.run_command_ignoring_state("echo %OS%").ok();
        os_detect::classify(None, windows_probe.as_deref())
    }

    /// Like `run_command`, but usable while the state machine is still
    /// transitioning to `Connected` (used only by `detect_os` right after a
    /// successful dial, before the public surface is open for business).
    fn run_command_ignoring_state(&self, command: &str) -> Result<String> {
        let inner = self.inner.clone();
        let command = command.to_string();
        let timeout = self.inner.config.command_timeout;
        self.runtime.block_on(async move {
            match tokio::time::timeout(timeout, tokio::task::spawn_blocking(move || exec_on_session(&inner, &command))).await {
                Ok(Ok(r)) => r,
                Ok(Err(_)) => Err(Error::io("ssh.detect_os", std::io::Error::other("blocking task panicked"))),
                Err(_) => Err(Error::Timeout { operation: "ssh.detect_os", elapsed: timeout }),
            }
        })
    }

    fn trigger_reconnect(&self, reason: String) {
        if !self
            .inner
            .state
            .transition(ConnectionState::Connected, ConnectionState::Reconnecting)
        {
            return;
        }
        warn!("ssh transport to {} broke: {reason}; entering reconnect loop", self.inner.config.host);
        self.inner.record_error(reason);
    }

    fn spawn_background_tasks(&self) {
        let mut guard = self.background.lock().unwrap_or_else(|e| e.into_inner());
        let Some(set) = guard.as_mut() else { return };

        set.spawn_on(self.keepalive_task(), self.runtime.handle());
        set.spawn_on(self.reconnect_task(), self.runtime.handle());
    }

    fn keepalive_task(&self) -> impl std::future::Future<Output = ()> + Send + 'static {
        let inner = self.inner.clone();
        let cancellation = self.cancellation.clone();
        let interval = self.inner.config.keepalive_interval;
        let timeout = self.inner.config.keepalive_timeout;

        async move {
            loop {
                tokio::select! {
                    _ = cancellation.cancelled() => return,
                    _ = tokio::time::sleep(interval) => {}
                }

                if inner.state.current() != ConnectionState::Connected {
                    continue;
                }

                let probe_inner = inner.clone();
                let sent = tokio::time::timeout(timeout, tokio::task::spawn_blocking(move || send_keepalive(&probe_inner))).await;

                match sent {
                    Ok(Ok(Ok(()))) => {
                        inner.keepalives_sent.fetch_add(1, Ordering::SeqCst);
                    }
                    _ => {
                        inner.keepalives_sent.fetch_add(1, Ordering::SeqCst);
                        inner.keepalives_failed.fetch_add(1, Ordering::SeqCst);
                        error!("keepalive to {} failed or timed out", inner.config.host);
                        if inner.state.transition(ConnectionState::Connected, ConnectionState::Reconnecting) {
                            inner.record_error("keepalive failure");
                        }
                    }
                }
            }
        }
    }

    fn reconnect_task(&self) -> impl std::future::Future<Output = ()> + Send + 'static {
        let inner = self.inner.clone();
        let cancellation = self.cancellation.clone();

        async move {
            let mut backoff = BackoffState::new(&inner.config.reconnect);
            loop {
                tokio::select! {
                    _ = cancellation.cancelled() => return,
                    _ = tokio::time::sleep(Duration::from_millis(200)) => {}
                }

                if inner.state.current() != ConnectionState::Reconnecting {
                    continue;
                }

                let attempts = inner.reconnect_attempts.fetch_add(1, Ordering::SeqCst) + 1;
                if crate::backoff::exhausted(&inner.config.reconnect, attempts) {
                    warn!("giving up reconnecting to {} after {attempts} attempts", inner.config.host);
                    inner.state.transition(ConnectionState::Reconnecting, ConnectionState::Disconnected);
                    return;
                }

                let delay = backoff.next(&inner.config.reconnect);
                warn!("reconnecting to {} in {delay:?} (attempt {attempts})", inner.config.host);

                tokio::select! {
                    _ = cancellation.cancelled() => return,
                    _ = tokio::time::sleep(delay) => {}
                }

                let dial_inner = inner.clone();
                let dialed = tokio::task::spawn_blocking(move || dial_blocking(&dial_inner.config)).await;

                match dialed {
                    Ok(Ok(session)) => {
                        *inner.session.write() = Some(session);
                        *inner.connected_since.write() = Some(SystemTime::now());
                        inner.total_reconnects.fetch_add(1, Ordering::SeqCst);
                        backoff.reset();
                        inner.state.transition(ConnectionState::Reconnecting, ConnectionState::Connected);
                        debug!("reconnected to {}", inner.config.host);
                    }
                    _ => {
                        inner.record_error("reconnect dial failed");
                    }
                }
            }
        }
    }

    fn dial_and_authenticate(&self) -> Result<ssh2::Session> {
        dial_blocking(&self.inner.config)
    }
}

fn resolve_addr(host: &str, port: u16) -> Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()
        .map_err(|e| Error::connection("ssh.resolve", e.to_string()))?
        .next()
        .ok_or_else(|| Error::connection("ssh.resolve", format!("no address for {host}")))
}

fn dial_blocking(config: &SshConfig) -> Result<ssh2::Session> {
    let addr = resolve_addr(&config.host, config.port)?;
    let tcp = TcpStream::connect_timeout(&addr, config.connect_timeout)
        .map_err(|e| Error::connection("ssh.dial", e.to_string()))?;
    tcp.set_read_timeout(Some(config.command_timeout))
        .map_err(|e| Error::io("ssh.dial", e))?;

    let mut session = ssh2::Session::new().map_err(|e| Error::connection("ssh.dial", e.to_string()))?;
    session.set_tcp_stream(tcp);
    session.handshake().map_err(|e| Error::connection("ssh.handshake", e.to_string()))?;

    verify_host_key(&session, config)?;
    authenticate(&session, config)?;

    if !session.authenticated() {
        return Err(Error::connection("ssh.auth", "authentication did not complete"));
    }

    session.set_blocking(true);
    session
        .set_keepalive(true, config.keepalive_interval.as_secs().max(1) as u32);

    Ok(session)
}

fn verify_host_key(session: &ssh2::Session, config: &SshConfig) -> Result<()> {
    let Some(policy) = config.host_key_policy.as_ref() else {
        return Err(Error::connection(
            "ssh.host_key",
            "no host key verification policy configured",
        ));
    };

    let (key, _key_type) = session
        .host_key()
        .ok_or_else(|| Error::connection("ssh.host_key", "server presented no host key"))?;

    match policy {
        HostKeyPolicy::Callback(callback) => {
            if callback(&config.host, key) {
                Ok(())
            } else {
                Err(Error::connection("ssh.host_key", "rejected by custom callback"))
            }
        }
        HostKeyPolicy::KnownHosts(path) => {
            if !path.exists() {
                return Err(Error::connection(
                    "ssh.host_key",
                    format!("known_hosts file not found: {}", path.display()),
                ));
            }
            let mut known_hosts = session
                .known_hosts()
                .map_err(|e| Error::connection("ssh.host_key", e.to_string()))?;
            known_hosts
                .read_file(path, ssh2::KnownHostFileKind::OpenSSH)
                .map_err(|e| Error::connection("ssh.host_key", e.to_string()))?;

            match known_hosts.check_port(&config.host, config.port, key) {
                ssh2::CheckResult::Match => Ok(()),
                ssh2::CheckResult::NotFound => Err(Error::connection(
                    "ssh.host_key",
                    format!("{} not present in known_hosts", config.host),
                )),
                ssh2::CheckResult::Mismatch => Err(Error::connection(
                    "ssh.host_key",
                    format!("host key mismatch for {}", config.host),
                )),
                ssh2::CheckResult::Failure => {
                    Err(Error::connection("ssh.host_key", "known_hosts check failed"))
                }
            }
        }
        HostKeyPolicy::InsecureIgnore => Ok(()),
    }
}

fn authenticate(session: &ssh2::Session, config: &SshConfig) -> Result<()> {
    match &config.auth {
        AuthMethod::Agent => session
            .userauth_agent(&config.username)
            .map_err(|e| Error::connection("ssh.auth", format!("agent auth failed: {e}"))),
        AuthMethod::Password(password) => session
            .userauth_password(&config.username, password)
            .map_err(|e| Error::connection("ssh.auth", format!("password auth failed: {e}"))),
        AuthMethod::PrivateKey { path, passphrase } => session
            .userauth_pubkey_file(&config.username, None, path, passphrase.as_deref())
            .map_err(|e| Error::connection("ssh.auth", format!("key auth failed: {e}"))),
    }
}

fn send_keepalive(inner: &Inner) -> Result<()> {
    let guard = inner.session.read();
    let session = guard
        .as_ref()
        .ok_or_else(|| Error::connection("ssh.keepalive", "no active session"))?;
    session
        .keepalive_send()
        .map(|_| ())
        .map_err(|e| Error::connection("ssh.keepalive", e.to_string()))
}

fn exec_on_session(inner: &Inner, command: &str) -> Result<String> {
    let guard = inner.session.read();
    let session = guard
        .as_ref()
        .ok_or_else(|| Error::connection("ssh.exec", "no active session"))?;

    let mut channel = session
        .channel_session()
        .map_err(|e| Error::connection("ssh.exec", format!("channel open failed: {e}")))?;
    drop(guard);
    inner.sessions_created.fetch_add(1, Ordering::SeqCst);

    channel
        .exec(command)
        .map_err(|e| Error::connection("ssh.exec", format!("exec failed: {e}")))?;

    let mut stdout = String::new();
    channel
        .read_to_string(&mut stdout)
        .map_err(|e| Error::io("ssh.exec", e))?;

    let mut stderr = String::new();
    channel
        .stderr()
        .read_to_string(&mut stderr)
        .map_err(|e| Error::io("ssh.exec", e))?;

    channel.wait_close().ok();
    let exit_status = channel.exit_status().unwrap_or(0);

    if exit_status != 0 {
        return Err(Error::connection(
            "ssh.exec",
            format!("`{command}` exited with status {exit_status}: {}", stderr.trim()),
        ));
    }

    Ok(stdout.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_addr_fails_closed_for_garbage_host() {
        let result = resolve_addr("this.host.does.not.resolve.invalid", 22);
        assert!(result.is_err());
    }
}
