use std::sync::Arc;

use crate::domain::CeremonyError;

/// Text shown by the native biometric prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiometricPrompt {
    pub reason: String,
    /// Label of the "use PIN instead" button, where the platform has one.
    pub fallback_label: Option<String>,
}

impl BiometricPrompt {
    pub fn new(reason: &str) -> Self {
        Self {
            reason: reason.to_string(),
            fallback_label: None,
        }
    }

    pub fn with_fallback(mut self, label: &str) -> Self {
        self.fallback_label = Some(label.to_string());
        self
    }
}

/// Blocking native biometric bridge (fingerprint / Touch ID).
pub trait NativeBiometric: Send + Sync {
    fn is_available(&self) -> bool;

    /// `Ok(false)` when the user failed or dismissed the prompt.
    fn authenticate(&self, prompt: &BiometricPrompt) -> Result<bool, CeremonyError>;
}

/// LocalAuthentication through a `swift` subprocess.
#[cfg(target_os = "macos")]
pub struct LocalAuthenticationBridge;

#[cfg(target_os = "macos")]
impl NativeBiometric for LocalAuthenticationBridge {
    fn is_available(&self) -> bool {
        let script = r#"
import Foundation
import LocalAuthentication

let context = LAContext()
var error: NSError?
let available = context.canEvaluatePolicy(.deviceOwnerAuthenticationWithBiometrics, error: &error)
exit(available ? 0 : 1)
"#;
        swift::run(script).unwrap_or(false)
    }

    fn authenticate(&self, prompt: &BiometricPrompt) -> Result<bool, CeremonyError> {
        let fallback = match &prompt.fallback_label {
            Some(label) => format!("context.localizedFallbackTitle = \"{}\"", escape(label)),
            None => String::new(),
        };
        let script = format!(
            r#"
import Foundation
import LocalAuthentication

let context = LAContext()
{fallback}
var error: NSError?

guard context.canEvaluatePolicy(.deviceOwnerAuthenticationWithBiometrics, error: &error) else {{
    exit(1)
}}

let semaphore = DispatchSemaphore(value: 0)
var authResult = false

context.evaluatePolicy(.deviceOwnerAuthenticationWithBiometrics, localizedReason: "{reason}") {{ success, _ in
    authResult = success
    semaphore.signal()
}}

semaphore.wait()
exit(authResult ? 0 : 1)
"#,
            reason = escape(&prompt.reason),
        );

        swift::run(&script)
    }
}

#[cfg(target_os = "macos")]
fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(target_os = "macos")]
mod swift {
    use std::io::Write;
    use std::process::{Command, Stdio};

    use crate::domain::CeremonyError;

    /// Runs a script through `swift -`; exit status 0 means success.
    pub fn run(script: &str) -> Result<bool, CeremonyError> {
        let mut child = Command::new("swift")
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CeremonyError::Bridge(format!("failed to spawn swift: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(script.as_bytes())
                .map_err(|e| CeremonyError::Bridge(format!("failed to feed swift: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| CeremonyError::Bridge(format!("swift did not finish: {e}")))?;

        if !output.status.success() {
            tracing::debug!(
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "swift exited unsuccessfully"
            );
        }
        Ok(output.status.success())
    }
}

/// Bridge for hosts without a biometric API reachable from this process.
pub struct UnavailableBiometric;

impl NativeBiometric for UnavailableBiometric {
    fn is_available(&self) -> bool {
        false
    }

    fn authenticate(&self, _prompt: &BiometricPrompt) -> Result<bool, CeremonyError> {
        Err(CeremonyError::NotSupported(
            "no biometric bridge on this host".to_string(),
        ))
    }
}

pub fn native_biometric() -> Arc<dyn NativeBiometric> {
    #[cfg(target_os = "macos")]
    {
        Arc::new(LocalAuthenticationBridge)
    }
    #[cfg(not(target_os = "macos"))]
    {
        Arc::new(UnavailableBiometric)
    }
}
