use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::Value;

use autocrop_core::bridge::autocrop_module::AutoCropModule;
use autocrop_core::bridge::bridge_error::{BridgeError, ErrorCode};
use autocrop_core::bridge::media_scanner::{MediaIndex, MediaScanner};
use autocrop_core::bridge::promise::{promise, Promise, Settlement};
use autocrop_core::detection::infrastructure::model_resolver::ModelResolver;
use autocrop_core::library::gallery_exporter::GalleryExporter;
use autocrop_core::library::saved_faces::SavedFaces;
use autocrop_core::shared::config::AutoCropConfig;
use autocrop_core::shared::constants::BLAZEFACE_MODEL_NAME;

/// Longest wait for a media scan callback.
const SCAN_TIMEOUT: Duration = Duration::from_secs(30);

/// Face detection and auto-cropping for portraits.
#[derive(Parser)]
#[command(name = "autocrop")]
struct Cli {
    /// Config file (default: <config dir>/AutoCrop/config.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Face detection model file; skips the model cache.
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, global = true)]
    confidence: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect a face and save a copy with the face boxed.
    Detect { uri: String },
    /// Detect a face, then crop it and mark the eyes.
    Crop { uri: String },
    /// Detect and crop in one step; prints the output path.
    ProcessImage { uri: String },
    /// Register a file with the media index.
    Scan { path: String },
    /// Check that the module and face detector are working.
    SelfTest,
    /// Keep a processed image in the saved-faces library.
    Save { uri: String },
    /// Copy a processed image to the pictures directory and index it.
    Export { uri: String },
    /// List saved faces, newest first.
    History,
}

fn main() {
    env_logger::init();

    match run() {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

/// `Ok(false)` when a bridge call was rejected.
fn run() -> Result<bool, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let ok = match cli.command {
        Command::Save { uri } => {
            let saved = SavedFaces::new(config.saved_faces_dir.clone()).save(&uri)?;
            print_json(&serde_json::to_value(saved)?);
            true
        }
        Command::History => {
            let history = SavedFaces::new(config.saved_faces_dir.clone()).history();
            print_json(&serde_json::to_value(history)?);
            true
        }
        Command::Export { uri } => {
            let exported = GalleryExporter::new(config.pictures_dir.clone()).export(&uri)?;
            let scanner: Arc<dyn MediaScanner> =
                Arc::new(MediaIndex::new(config.media_index_path.clone()));
            let module = AutoCropModule::new(None, Some(scanner));
            let path = exported.to_string_lossy().into_owned();
            report(call_with_timeout(|p| module.scan_file(&path, p)))
        }
        Command::Detect { uri } => {
            with_module(&config, |m| report(call(|p| m.detect_face(&uri, p))))
        }
        Command::Crop { uri } => with_module(&config, |m| {
            report(call(|p| m.detect_face(&uri, p))) && report(call(|p| m.process_face(p)))
        }),
        Command::ProcessImage { uri } => {
            with_module(&config, |m| report(call(|p| m.process_image(&uri, p))))
        }
        Command::Scan { path } => with_module(&config, |m| {
            report(call_with_timeout(|p| m.scan_file(&path, p)))
        }),
        Command::SelfTest => with_module(&config, |m| {
            report(call(|p| m.test_module(p))) && report(call(|p| m.test_face_detector(p)))
        }),
    };
    Ok(ok)
}

fn with_module(config: &AutoCropConfig, op: impl FnOnce(&AutoCropModule) -> bool) -> bool {
    let module = AutoCropModule::from_config(config);
    log::debug!("{} ready", module.name());
    let ok = op(&module);
    module.invalidate();
    ok
}

fn load_config(cli: &Cli) -> Result<AutoCropConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => AutoCropConfig::load(path)?,
        None => AutoCropConfig::load_or_default()?,
    };

    if let Some(model) = &cli.model {
        config.processor.model_path = Some(model.clone());
    }
    if let Some(confidence) = cli.confidence {
        config.processor.confidence = confidence;
    }
    config.validate()?;

    if config.processor.model_path.is_none() {
        resolve_model(&mut config);
    }
    Ok(config)
}

/// Fetches the model up front so downloads can report progress. Failures
/// are left for module construction to report.
fn resolve_model(config: &mut AutoCropConfig) {
    let processor = &config.processor;
    let resolved = ModelResolver::with_default_cache().and_then(|resolver| {
        resolver.resolve(
            BLAZEFACE_MODEL_NAME,
            processor.model_url.as_deref(),
            processor.bundled_model_dir.as_deref(),
            Some(Box::new(download_progress)),
        )
    });
    match resolved {
        Ok(path) => config.processor.model_path = Some(path),
        Err(e) => log::debug!("Model not resolved ahead of time: {e}"),
    }
}

fn call(op: impl FnOnce(Promise)) -> Settlement {
    let (promise, handle) = promise();
    op(promise);
    handle.wait()
}

fn call_with_timeout(op: impl FnOnce(Promise)) -> Settlement {
    let (promise, handle) = promise();
    op(promise);
    handle.wait_timeout(SCAN_TIMEOUT).unwrap_or_else(|| {
        Err(BridgeError::new(
            ErrorCode::Scan,
            format!("Scan did not complete within {}s", SCAN_TIMEOUT.as_secs()),
        ))
    })
}

/// Prints a resolved value on stdout or a rejection on stderr.
fn report(settlement: Settlement) -> bool {
    match settlement {
        Ok(value) => match serde_json::to_value(value) {
            Ok(json) => {
                print_json(&json);
                true
            }
            Err(e) => {
                eprintln!("Error: {e}");
                false
            }
        },
        Err(rejection) => {
            match serde_json::to_string(&rejection) {
                Ok(json) => eprintln!("{json}"),
                Err(_) => eprintln!("{rejection}"),
            }
            false
        }
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(_) => println!("{value}"),
    }
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face detection model... {pct}%");
    } else {
        eprint!("\rDownloading face detection model... {downloaded} bytes");
    }
}
