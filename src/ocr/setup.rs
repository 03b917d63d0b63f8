use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{CardError, Result};
use crate::log;
use crate::paths::{get_local_bin_dir, get_tessdata_dir};

const TESSDATA_REPO: &str = "https://github.com/tesseract-ocr/tessdata/raw/main";

const COMMON_EXECUTABLES: &[&str] = &[
    "/usr/bin/tesseract",
    "/usr/local/bin/tesseract",
    "/opt/homebrew/bin/tesseract",
    r"C:\Program Files\Tesseract-OCR\tesseract.exe",
    r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
];

const SYSTEM_TESSDATA: &[&str] = &[
    "/usr/share/tesseract-ocr/5/tessdata",
    "/usr/share/tesseract-ocr/4.00/tessdata",
    "/usr/share/tessdata",
    "/usr/local/share/tessdata",
    "/opt/homebrew/share/tessdata",
    r"C:\Program Files\Tesseract-OCR\tessdata",
    r"C:\Program Files (x86)\Tesseract-OCR\tessdata",
];

pub struct TesseractPaths {
    pub executable: PathBuf,
    pub tessdata: PathBuf,
}

fn traineddata_name(lang: &str) -> String {
    format!("{}.traineddata", lang)
}

fn has_traineddata(dir: &Path, lang: &str) -> bool {
    dir.join(traineddata_name(lang)).exists()
}

/// Returns a Tesseract binary placed in `bin_dir`, if any.
fn local_executable(bin_dir: &Path) -> Option<PathBuf> {
    let name = if cfg!(windows) { "tesseract.exe" } else { "tesseract" };
    let path = bin_dir.join(name);
    path.is_file().then_some(path)
}

/// Finds the Tesseract executable: our local data dir, PATH, then common
/// install paths.
pub fn find_tesseract_executable() -> Result<PathBuf> {
    if let Some(local) = local_executable(&get_local_bin_dir()) {
        return Ok(local);
    }

    if let Ok(output) = Command::new("tesseract").arg("--version").output() {
        if output.status.success() {
            return Ok(PathBuf::from("tesseract"));
        }
    }

    COMMON_EXECUTABLES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
        .ok_or_else(|| {
            CardError::recognition(
                "engine",
                format!(
                    "Tesseract not found. Install Tesseract-OCR and add it to PATH, or place it in {}",
                    get_local_bin_dir().display()
                ),
            )
        })
}

/// Finds a tessdata directory holding `<lang>.traineddata`.
///
/// Checks our local data dir, `TESSDATA_PREFIX`, then system locations.
pub fn find_tessdata_dir(lang: &str) -> Option<PathBuf> {
    let local = get_tessdata_dir();
    if has_traineddata(&local, lang) {
        return Some(local);
    }

    if let Ok(prefix) = std::env::var("TESSDATA_PREFIX") {
        let p = PathBuf::from(&prefix);
        if has_traineddata(&p, lang) {
            return Some(p);
        }
        let p = p.join("tessdata");
        if has_traineddata(&p, lang) {
            return Some(p);
        }
    }

    SYSTEM_TESSDATA
        .iter()
        .map(PathBuf::from)
        .find(|p| has_traineddata(p, lang))
}

/// Ensures Tesseract and its language data are available.
///
/// The executable must already be installed; missing language data is
/// downloaded into the local data dir.
pub fn ensure_tesseract(lang: &str) -> Result<TesseractPaths> {
    let executable = find_tesseract_executable()?;

    let tessdata = match find_tessdata_dir(lang) {
        Some(dir) => dir,
        None => {
            log(&format!("{} not found locally, downloading...", traineddata_name(lang)));
            let dir = get_tessdata_dir();
            fs::create_dir_all(&dir)?;
            download_tessdata(&dir, lang)?;
            dir
        }
    };

    log(&format!(
        "Tesseract ready: {} (tessdata: {})",
        executable.display(),
        tessdata.display()
    ));

    Ok(TesseractPaths {
        executable,
        tessdata,
    })
}

/// Downloads `<lang>.traineddata` from the tessdata repository.
fn download_tessdata(tessdata_dir: &Path, lang: &str) -> Result<()> {
    let url = format!("{}/{}", TESSDATA_REPO, traineddata_name(lang));
    let target = tessdata_dir.join(traineddata_name(lang));

    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(300))
        .build()?;

    let response = client
        .get(&url)
        .header("User-Agent", "card-scan")
        .send()?
        .error_for_status()?;

    let bytes = response.bytes()?;
    let mut file = fs::File::create(&target)?;
    file.write_all(&bytes)?;

    log(&format!(
        "Downloaded {} ({} bytes)",
        traineddata_name(lang),
        bytes.len()
    ));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_has_traineddata() {
        let dir = tempdir().unwrap();
        assert!(!has_traineddata(dir.path(), "eng"));

        fs::write(dir.path().join("eng.traineddata"), b"x").unwrap();
        assert!(has_traineddata(dir.path(), "eng"));
        assert!(!has_traineddata(dir.path(), "jpn"));
    }

    #[test]
    fn test_local_executable() {
        let dir = tempdir().unwrap();
        assert_eq!(local_executable(dir.path()), None);

        let name = if cfg!(windows) { "tesseract.exe" } else { "tesseract" };
        fs::write(dir.path().join(name), b"x").unwrap();
        assert_eq!(local_executable(dir.path()), Some(dir.path().join(name)));
    }
}
