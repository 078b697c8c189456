use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::Parser;

use doorbell_core::annotation::domain::annotation_engine::AnnotationEngine;
use doorbell_core::annotation::infrastructure::image_overlay_renderer::ImageOverlayRenderer;
use doorbell_core::detection::domain::detection_aggregator::DetectionAggregator;
use doorbell_core::detection::infrastructure::http_face_searcher::HttpFaceSearcher;
use doorbell_core::detection::infrastructure::http_label_detector::HttpLabelDetector;
use doorbell_core::detection::infrastructure::provider_endpoint::ProviderEndpoint;
use doorbell_core::identity::domain::identity_directory::IdentityDirectory;
use doorbell_core::identity::domain::identity_resolver::IdentityResolver;
use doorbell_core::identity::infrastructure::json_identity_directory::JsonIdentityDirectory;
use doorbell_core::ledger::domain::dedup_ledger::DedupLedger;
use doorbell_core::ledger::infrastructure::file_dedup_ledger::FileDedupLedger;
use doorbell_core::ledger::infrastructure::in_memory_dedup_ledger::InMemoryDedupLedger;
use doorbell_core::notification::domain::notification_dispatcher::NotificationDispatcher;
use doorbell_core::notification::infrastructure::slack_notifier::SlackNotifier;
use doorbell_core::pipeline::pipeline_logger::LogPipelineLogger;
use doorbell_core::pipeline::pipeline_state::Outcome;
use doorbell_core::pipeline::process_snapshot_use_case::{DedupMode, ProcessSnapshotUseCase};
use doorbell_core::shared::settings::Settings;
use doorbell_core::storage::domain::storage_event::parse_storage_event;
use doorbell_core::storage::infrastructure::file_object_store::FileObjectStore;

/// Annotate a newly stored doorbell snapshot and post it to a chat channel.
#[derive(Parser)]
#[command(name = "doorbell")]
struct Cli {
    /// Storage event JSON file ("-" reads standard input).
    event: PathBuf,

    /// Settings file (defaults to the per-user Doorbell settings).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding one sub-directory per bucket.
    #[arg(long)]
    objects_root: Option<PathBuf>,

    /// Directory of processed-image markers.
    #[arg(long, conflicts_with = "no_ledger")]
    ledger_dir: Option<PathBuf>,

    /// Keep the ledger in memory only (nothing persists between runs).
    #[arg(long)]
    no_ledger: bool,

    /// JSON file mapping face ids to people.
    #[arg(long)]
    directory: Option<PathBuf>,

    /// Object-detection endpoint.
    #[arg(long)]
    labels_url: Option<String>,

    /// Face-search endpoint.
    #[arg(long)]
    faces_url: Option<String>,

    /// API key sent to both recognition endpoints.
    #[arg(long, env = "DOORBELL_PROVIDER_API_KEY", hide_env_values = true)]
    provider_key: Option<String>,

    /// TrueType/OpenType font for overlay labels (defaults to the bundled DejaVu Sans).
    #[arg(long)]
    font: Option<PathBuf>,

    /// Minimum object confidence requested from the provider (0-100).
    #[arg(long)]
    min_confidence: Option<f32>,

    /// Confidence an object must exceed to be drawn (0-100).
    #[arg(long)]
    overlay_confidence: Option<f32>,

    /// JPEG quality for re-encoded images (1-100).
    #[arg(long)]
    quality: Option<u8>,

    /// Destination channel id (overrides SLACK_CHANNEL).
    #[arg(long)]
    channel: Option<String>,

    /// Face collection id (overrides COLLECTION_NAME).
    #[arg(long)]
    collection: Option<String>,

    /// Chat file-upload endpoint.
    #[arg(long)]
    upload_url: Option<String>,

    /// Run object detection and face search in parallel.
    #[arg(long)]
    concurrent: bool,

    /// Check the ledger before detection and record after delivery instead
    /// of claiming the image up front.
    #[arg(long)]
    check_then_record: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = apply_overrides(Settings::load(cli.config.as_deref())?, &cli);
    settings.validate()?;

    let event = read_event(&cli)?;
    let object = parse_storage_event(&event)?;
    log::info!("Processing {object}");

    let mut use_case = build_use_case(&cli, &settings)?;
    match use_case.execute(&object)? {
        Outcome::Skipped { fingerprint } => {
            println!("Skipped {object}: image {fingerprint} was already processed");
        }
        Outcome::Delivered {
            summary, recorded, ..
        } => {
            println!("Delivered {object}: {summary}");
            if !recorded {
                eprintln!("Warning: delivery was not recorded in the ledger");
            }
        }
    }
    Ok(())
}

fn apply_overrides(mut settings: Settings, cli: &Cli) -> Settings {
    if let Some(v) = &cli.channel {
        settings.channel_id = v.clone();
    }
    if let Some(v) = &cli.collection {
        settings.collection_id = v.clone();
    }
    if let Some(v) = cli.min_confidence {
        settings.object_min_confidence = v;
    }
    if let Some(v) = cli.overlay_confidence {
        settings.overlay_min_confidence = v;
    }
    if let Some(v) = cli.quality {
        settings.quality = v;
    }
    if cli.font.is_some() {
        settings.font_path = cli.font.clone();
    }
    if cli.labels_url.is_some() {
        settings.labels_url = cli.labels_url.clone();
    }
    if cli.faces_url.is_some() {
        settings.faces_url = cli.faces_url.clone();
    }
    if cli.provider_key.is_some() {
        settings.provider_api_key = cli.provider_key.clone();
    }
    if cli.objects_root.is_some() {
        settings.object_root = cli.objects_root.clone();
    }
    if cli.ledger_dir.is_some() {
        settings.ledger_dir = cli.ledger_dir.clone();
    }
    if cli.directory.is_some() {
        settings.identity_directory = cli.directory.clone();
    }
    settings.concurrent_detection |= cli.concurrent;
    settings
}

fn read_event(cli: &Cli) -> Result<String, Box<dyn std::error::Error>> {
    if cli.event.as_os_str() == "-" {
        let mut event = String::new();
        io::stdin().read_to_string(&mut event)?;
        return Ok(event);
    }
    Ok(fs::read_to_string(&cli.event)
        .map_err(|e| format!("cannot read event {}: {e}", cli.event.display()))?)
}

fn build_use_case(
    cli: &Cli,
    settings: &Settings,
) -> Result<ProcessSnapshotUseCase, Box<dyn std::error::Error>> {
    let object_root = settings
        .object_root
        .clone()
        .ok_or("--objects-root is required")?;
    let labels_url = settings
        .labels_url
        .clone()
        .ok_or("--labels-url is required")?;
    let faces_url = settings
        .faces_url
        .clone()
        .ok_or("--faces-url is required")?;

    let ledger: Box<dyn DedupLedger> = if cli.no_ledger {
        Box::new(InMemoryDedupLedger::new())
    } else {
        let dir = settings
            .ledger_dir
            .clone()
            .or_else(Settings::default_ledger_dir)
            .ok_or("no ledger directory available; pass --ledger-dir")?;
        log::info!("Ledger at {}", dir.display());
        Box::new(FileDedupLedger::open(dir)?)
    };

    let key = settings.provider_api_key.clone();
    let aggregator = DetectionAggregator::new(
        Box::new(HttpLabelDetector::new(ProviderEndpoint::new(
            labels_url,
            key.clone(),
        )?)),
        Box::new(HttpFaceSearcher::new(ProviderEndpoint::new(faces_url, key)?)),
        settings.collection_id.clone(),
    )
    .with_min_confidence(settings.object_min_confidence);

    let directory: Box<dyn IdentityDirectory> = match &settings.identity_directory {
        Some(path) => Box::new(JsonIdentityDirectory::open(path)?),
        None => {
            log::warn!("No identity directory configured; every face resolves as unknown");
            Box::new(JsonIdentityDirectory::from_json("{}")?)
        }
    };

    let mut renderer = ImageOverlayRenderer::new().with_quality(settings.quality);
    if let Some(font) = &settings.font_path {
        renderer = renderer.with_font_file(font)?;
    }
    let engine = AnnotationEngine::new(Box::new(renderer))
        .with_min_confidence(settings.overlay_min_confidence);

    let mut notifier = SlackNotifier::new(settings.access_token.clone())?;
    if let Some(url) = &cli.upload_url {
        notifier = notifier.with_upload_url(url.clone());
    }
    let dispatcher = NotificationDispatcher::new(Box::new(notifier), settings.channel_id.clone())
        .with_filename(settings.attachment_name.clone());

    let dedup_mode = if cli.check_then_record {
        DedupMode::CheckThenRecord
    } else {
        DedupMode::ClaimFirst
    };

    Ok(ProcessSnapshotUseCase::new(
        Box::new(FileObjectStore::new(object_root)),
        ledger,
        aggregator,
        IdentityResolver::new(directory),
        engine,
        dispatcher,
    )
    .with_dedup_mode(dedup_mode)
    .with_concurrent_detection(settings.concurrent_detection)
    .with_logger(Box::new(LogPipelineLogger::new())))
}
