//! Remote OS auto-detection: `uname -s`, falling back to a Windows-style
//! `echo %OS%` probe for hosts with no `uname`.

use telemetry_metrics::{Error, Result};

/// The family of remote hosts this crate has a provider set for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOs {
    Linux,
    Darwin,
}

/// Classify the output of `uname -s` / the Windows fallback probe.
///
/// `uname_output` is `None` when the `uname -s` command itself failed
/// (typical on Windows, which has no `uname`); `windows_probe_output` is the
/// `echo %OS%` fallback's output in that case.
pub fn classify(uname_output: Option<&str>, windows_probe_output: Option<&str>) -> Result<RemoteOs> {
    if let Some(output) = uname_output {
        let trimmed = output.trim();
        if trimmed == "Linux" {
            return Ok(RemoteOs::Linux);
        }
        if trimmed == "Darwin" {
            return Ok(RemoteOs::Darwin);
        }
    }

    if let Some(output) = windows_probe_output {
        if output.contains("Windows") {
            return Err(Error::unsupported("os_detect.windows"));
        }
    }

    Err(Error::unsupported("os_detect.classify"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_linux() {
        assert_eq!(classify(Some("Linux\n"), None).unwrap(), RemoteOs::Linux);
    }

    #[test]
    fn classifies_darwin() {
        assert_eq!(classify(Some("Darwin\n"), None).unwrap(), RemoteOs::Darwin);
    }

    #[test]
    fn windows_is_explicitly_unsupported() {
        let err = classify(None, Some("Windows_NT\n")).unwrap_err();
        assert!(matches!(err, Error::Unsupported { .. }));
    }

    #[test]
    fn unrecognized_output_is_unsupported() {
        let err = classify(Some("SunOS\n"), None).unwrap_err();
        assert!(matches!(err, Error::Unsupported { .. }));
    }
}
