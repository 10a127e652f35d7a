//! The seam between providers and the transport: providers depend on this
//! trait, not on [`crate::transport::SshTransport`] directly, so tests can
//! substitute a fixed-output double instead of dialing a real host.

use telemetry_metrics::Result;

pub trait CommandRunner: Send + Sync {
    /// Run `command` on the remote host and return its trimmed stdout.
    fn run(&self, command: &str) -> Result<String>;
}

impl CommandRunner for crate::transport::SshTransport {
    fn run(&self, command: &str) -> Result<String> {
        self.run_command(command)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::CommandRunner;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use telemetry_metrics::{Error, Result};

    /// A `CommandRunner` double keyed on the exact command string, for
    /// provider unit tests.
    #[derive(Default)]
    pub struct FakeRunner {
        responses: Mutex<HashMap<String, String>>,
    }

    impl FakeRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set(&self, command: impl Into<String>, output: impl Into<String>) -> &Self {
            self.responses.lock().insert(command.into(), output.into());
            self
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, command: &str) -> Result<String> {
            self.responses
                .lock()
                .get(command)
                .cloned()
                .ok_or_else(|| Error::not_found("fake_runner.run", command.to_string()))
        }
    }
}
