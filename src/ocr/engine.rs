use image::{ImageBuffer, Luma};
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use super::setup::ensure_tesseract;
use crate::config::ScanConfig;
use crate::error::{CardError, Result};

/// How often a running engine process is checked for exit, cancel and deadline.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Shared flag for aborting in-flight recognition.
///
/// Clones share the same flag; cancelling one cancels all. A child token
/// is also cancelled when its parent is, but cancelling the child leaves
/// the parent untouched.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    parent: Option<Box<CancelToken>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that observes this one but can be cancelled on its own.
    pub fn child(&self) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            parent: Some(Box::new(self.clone())),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
            || self.parent.as_ref().is_some_and(|p| p.is_cancelled())
    }
}

/// A text-recognition engine: grayscale raster in, plain multi-line text out.
///
/// `region` names the raster ("header", "body") for error reporting.
/// Implementations make a single attempt and should return promptly once
/// `cancel` is tripped.
pub trait Recognizer: Send + Sync {
    fn recognize(
        &self,
        raster: &ImageBuffer<Luma<u8>, Vec<u8>>,
        region: &str,
        cancel: &CancelToken,
    ) -> Result<String>;
}

/// Runs the external `tesseract` binary on each raster.
#[derive(Clone, Debug)]
pub struct TesseractRecognizer {
    pub executable: PathBuf,
    pub tessdata: Option<PathBuf>,
    pub lang: String,
    pub psm: u32,
    /// Per-call deadline; the process is killed when it is exceeded
    pub timeout: Option<Duration>,
}

impl TesseractRecognizer {
    /// Locates Tesseract (downloading language data if needed) and applies config.
    pub fn from_config(config: &ScanConfig) -> Result<Self> {
        let paths = ensure_tesseract(&config.tesseract_lang)?;
        Ok(Self {
            executable: paths.executable,
            tessdata: Some(paths.tessdata),
            lang: config.tesseract_lang.clone(),
            psm: config.tesseract_psm,
            timeout: config.recognition_timeout(),
        })
    }

    /// Waits for the child, killing it on cancel or deadline.
    fn wait_with_deadline(&self, child: &mut Child, cancel: &CancelToken) -> Result<ExitStatus> {
        let started = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }

            if cancel.is_cancelled() {
                let _ = child.kill();
                let _ = child.wait();
                return Err(CardError::Cancelled);
            }

            if let Some(limit) = self.timeout {
                if started.elapsed() >= limit {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(CardError::Timeout(limit));
                }
            }

            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Recognizer for TesseractRecognizer {
    fn recognize(
        &self,
        raster: &ImageBuffer<Luma<u8>, Vec<u8>>,
        region: &str,
        cancel: &CancelToken,
    ) -> Result<String> {
        let (w, h) = raster.dimensions();
        if w == 0 || h == 0 {
            return Err(CardError::recognition(region, "empty raster"));
        }
        if cancel.is_cancelled() {
            return Err(CardError::Cancelled);
        }

        // Input PNG and output text live here; removed when dropped
        let work_dir = tempfile::tempdir()?;
        let input_path = work_dir.path().join(format!("{}.png", region));
        let output_base = work_dir.path().join(region);
        raster.save(&input_path)?;

        let mut command = Command::new(&self.executable);
        command
            .arg(&input_path)
            .arg(&output_base)
            .arg("-l")
            .arg(&self.lang)
            .arg("--psm")
            .arg(self.psm.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        if let Some(tessdata) = &self.tessdata {
            command.arg("--tessdata-dir").arg(tessdata);
        }

        let mut child = command.spawn()?;

        // Drained while the engine runs so a chatty process never blocks on a full pipe
        let stderr_reader = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut buf = String::new();
                let _ = pipe.read_to_string(&mut buf);
                buf
            })
        });

        let status = self.wait_with_deadline(&mut child, cancel)?;
        let stderr = stderr_reader
            .and_then(|reader| reader.join().ok())
            .unwrap_or_default();

        if !status.success() {
            return Err(CardError::recognition(
                region,
                format!("Tesseract failed ({}): {}", status, stderr.trim()),
            ));
        }

        // Tesseract appends .txt to the output base
        let text_path = output_base.with_extension("txt");
        let text = std::fs::read_to_string(&text_path).map_err(|e| {
            CardError::recognition(region, format!("failed to read Tesseract output: {}", e))
        })?;

        if text.trim().is_empty() {
            return Err(CardError::recognition(region, "no text recognized"));
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recognizer_with(executable: &str) -> TesseractRecognizer {
        TesseractRecognizer {
            executable: PathBuf::from(executable),
            tessdata: None,
            lang: "eng".to_string(),
            psm: 6,
            timeout: Some(Duration::from_secs(5)),
        }
    }

    /// Writes an executable shell script standing in for the engine.
    #[cfg(unix)]
    fn fake_engine(dir: &std::path::Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-tesseract");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// Retries while another test thread still holds a freshly written
    /// script open (ETXTBSY), which only affects spawning, not the engine.
    #[cfg(unix)]
    fn recognize_with(recognizer: &TesseractRecognizer, cancel: &CancelToken) -> Result<String> {
        let raster: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::new(4, 4);
        for _ in 0..20 {
            match recognizer.recognize(&raster, "body", cancel) {
                Err(CardError::Io(e)) if e.raw_os_error() == Some(26) => {
                    thread::sleep(Duration::from_millis(10));
                }
                other => return other,
            }
        }
        recognizer.recognize(&raster, "body", cancel)
    }

    #[test]
    fn test_child_token_does_not_cancel_parent() {
        let parent = CancelToken::new();
        let child = parent.child();

        child.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());

        let other = parent.child();
        parent.cancel();
        assert!(other.is_cancelled());
    }

    #[cfg(unix)]
    #[test]
    fn test_engine_output_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let engine = fake_engine(dir.path(), r#"printf 'Ruth, Babe (1927)\n' > "$2.txt""#);
        let recognizer = recognizer_with(engine.to_str().unwrap());

        let text = recognize_with(&recognizer, &CancelToken::new()).unwrap();
        assert_eq!(text.trim(), "Ruth, Babe (1927)");
    }

    #[cfg(unix)]
    #[test]
    fn test_slow_engine_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let engine = fake_engine(dir.path(), "exec sleep 10");
        let mut recognizer = recognizer_with(engine.to_str().unwrap());
        recognizer.timeout = Some(Duration::from_millis(50));

        let started = Instant::now();
        let result = recognize_with(&recognizer, &CancelToken::new());
        assert!(matches!(result, Err(CardError::Timeout(limit)) if limit == Duration::from_millis(50)));
        assert!(started.elapsed() < Duration::from_secs(5), "child should be killed");
    }

    #[cfg(unix)]
    #[test]
    fn test_running_engine_cancelled_from_another_thread() {
        let dir = tempfile::tempdir().unwrap();
        let engine = fake_engine(dir.path(), "exec sleep 10");
        let mut recognizer = recognizer_with(engine.to_str().unwrap());
        recognizer.timeout = None;

        let token = CancelToken::new();
        let canceller = {
            let token = token.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(100));
                token.cancel();
            })
        };

        let started = Instant::now();
        let result = recognize_with(&recognizer, &token);
        canceller.join().unwrap();

        assert!(matches!(result, Err(CardError::Cancelled)));
        assert!(started.elapsed() < Duration::from_secs(5), "child should be killed");
    }

    #[cfg(unix)]
    #[test]
    fn test_chatty_failing_engine_does_not_hang() {
        let dir = tempfile::tempdir().unwrap();
        // Far more than a pipe buffer holds
        let engine = fake_engine(
            dir.path(),
            "head -c 300000 /dev/zero | tr '\\000' 'x' >&2\necho 'bad image' >&2\nexit 3",
        );
        let mut recognizer = recognizer_with(engine.to_str().unwrap());
        recognizer.timeout = Some(Duration::from_secs(30));

        let started = Instant::now();
        let err = recognize_with(&recognizer, &CancelToken::new()).unwrap_err();
        match err {
            CardError::Recognition { region, reason } => {
                assert_eq!(region, "body");
                assert!(reason.contains("bad image"));
            }
            other => panic!("expected recognition error, got {:?}", other),
        }
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_cancel_token_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_empty_raster_rejected() {
        let raster: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::new(0, 0);
        let err = recognizer_with("tesseract")
            .recognize(&raster, "header", &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, CardError::Recognition { ref region, .. } if region == "header"));
    }

    #[test]
    fn test_cancelled_before_spawn() {
        let raster: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::new(4, 4);
        let token = CancelToken::new();
        token.cancel();
        let err = recognizer_with("tesseract")
            .recognize(&raster, "body", &token)
            .unwrap_err();
        assert!(matches!(err, CardError::Cancelled));
    }

    #[test]
    fn test_missing_executable_is_error() {
        let raster: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::new(4, 4);
        let result = recognizer_with("/nonexistent/card-scan-tesseract")
            .recognize(&raster, "body", &CancelToken::new());
        assert!(matches!(result, Err(CardError::Io(_))));
    }
}
