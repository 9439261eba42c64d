// Local recognizer fallback
//
// Runs an external recognizer process: the captured clip goes to stdin, the
// transcript is read from stdout. The process is killed if the future is
// dropped, so the fallback timeout abandons it cleanly.

use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use super::backend::TranscriptionBackend;
use super::response::{SourceEngine, TranscriptionResult};
use crate::audio::EncodedAudio;
use crate::error::TranscriptionError;

/// External recognizer command
///
/// `{locale}` and `{mime}` in the arguments are substituted per call.
pub struct LocalCommandBackend {
    program: String,
    args: Vec<String>,
}

impl LocalCommandBackend {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait::async_trait]
impl TranscriptionBackend for LocalCommandBackend {
    async fn transcribe(&self, audio: &EncodedAudio, locale: &str) -> Result<TranscriptionResult, TranscriptionError> {
        let args: Vec<String> = self
            .args
            .iter()
            .map(|arg| arg.replace("{locale}", locale).replace("{mime}", audio.mime_type()))
            .collect();

        debug!("Running local recognizer: {} {:?}", self.program, args);

        let mut child = Command::new(&self.program)
            .args(&args)
            .env("LOQA_LOCALE", locale)
            .env("LOQA_AUDIO_MIME", audio.mime_type())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TranscriptionError::Fallback(format!("failed to start {}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            let bytes = audio.bytes.clone();
            tokio::spawn(async move {
                // The recognizer may exit without reading everything
                if let Err(e) = stdin.write_all(&bytes).await {
                    debug!("Local recognizer closed stdin early: {}", e);
                }
            });
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| TranscriptionError::Fallback(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(TranscriptionError::Fallback(format!(
                "{} exited with {}: {}",
                self.program, output.status, stderr
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout);
        let result = TranscriptionResult::success(text.trim(), SourceEngine::LocalFallback);
        info!("Local recognizer finished: {:?}", result.status());

        Ok(result)
    }

    fn name(&self) -> &str {
        "local recognizer"
    }
}
