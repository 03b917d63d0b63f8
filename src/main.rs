//! Card Scan command-line tool.
//!
//! Extracts ratings from a player card image with Tesseract and prints the
//! record as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use card_scan::config::{get_config, init_config, ScanConfig};
use card_scan::ocr::{CancelToken, TesseractRecognizer};
use card_scan::{assemble, log, paths, CardExtractor, ExtractedCardRecord, ImageSource};

#[derive(Parser, Debug)]
#[command(
    name = "card-scan",
    version,
    about = "Extract gameplay ratings from a baseball player card image"
)]
struct Cli {
    /// Config file (default: config.json next to the executable)
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline and print the record as JSON
    Extract {
        /// Image file or http(s) URL
        image: String,

        /// Write JSON here instead of stdout
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,

        /// Per-region recognition deadline in seconds (overrides config)
        #[arg(long = "timeout-secs")]
        timeout_secs: Option<u64>,
    },

    /// Print the raw recognized header and body text
    Text {
        /// Image file or http(s) URL
        image: String,
    },

    /// Decode already-recognized text files without running OCR
    Decode {
        /// Header region text
        #[arg(long = "header")]
        header: PathBuf,

        /// Body region text
        #[arg(long = "body")]
        body: PathBuf,
    },
}

fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = panic_info
            .location()
            .map(|loc| format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_default();
        log(&format!("[PANIC]{} {}", location, msg));
    }));
}

fn build_extractor(config: &ScanConfig) -> Result<CardExtractor<TesseractRecognizer>> {
    let recognizer =
        TesseractRecognizer::from_config(config).context("Failed to set up Tesseract")?;
    Ok(CardExtractor::new(recognizer, config))
}

fn print_record(record: &ExtractedCardRecord, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(record).context("Failed to serialize record")?;
    match output {
        Some(path) => {
            fs::write(path, json.as_bytes())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log(&format!("Record saved: {}", path.display()));
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn main() -> Result<()> {
    install_panic_hook();
    let cli = Cli::parse();

    paths::ensure_directories().context("Failed to create log directory")?;
    init_config(cli.config.as_deref());

    match cli.command {
        Command::Extract {
            image,
            output,
            timeout_secs,
        } => {
            let mut config = get_config().clone();
            if let Some(secs) = timeout_secs {
                config.recognition_timeout_secs = Some(secs);
            }
            let extractor = build_extractor(&config)?;
            let record = extractor
                .extract_source(&ImageSource::parse(&image), &CancelToken::new())
                .with_context(|| format!("Extraction failed for {}", image))?;
            print_record(&record, output.as_deref())?;
        }
        Command::Text { image } => {
            let extractor = build_extractor(get_config())?;
            let img = ImageSource::parse(&image)
                .load()
                .with_context(|| format!("Failed to load {}", image))?;
            let texts = extractor.recognize_regions(&img, &CancelToken::new())?;
            println!("--- header ---\n{}", texts.header.trim_end());
            println!("--- body ---\n{}", texts.body.trim_end());
        }
        Command::Decode { header, body } => {
            let header_text = fs::read_to_string(&header)
                .with_context(|| format!("Failed to read {}", header.display()))?;
            let body_text = fs::read_to_string(&body)
                .with_context(|| format!("Failed to read {}", body.display()))?;
            print_record(&assemble(&header_text, &body_text), None)?;
        }
    }

    Ok(())
}
