use std::path::PathBuf;

use clap::Parser;
use onset_align::{
    AlignerConfig, AlignmentJob, AudioDecoder, DecodeRequest, FsBlobStore, OffsetAlignerBuilder,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "align_pair")]
#[command(about = "Estimate the time offset between a reference recording and a part")]
struct Args {
    /// Key of the reference recording inside the store root.
    reference: String,
    /// Key of the part recording inside the store root.
    part: String,
    #[arg(long, env = "ONSET_ALIGN_ROOT", default_value = ".")]
    root: PathBuf,
    /// JSON aligner config; flags below override its fields.
    #[arg(long, env = "ONSET_ALIGN_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "ONSET_ALIGN_OFFSET_SECONDS")]
    offset_seconds: Option<f64>,
    #[arg(long, env = "ONSET_ALIGN_DURATION_SECONDS")]
    duration_seconds: Option<f64>,
    /// Analyse from the offset to the end of each recording.
    #[arg(long, conflicts_with = "duration_seconds")]
    full_length: bool,
    #[arg(long, env = "ONSET_ALIGN_MIN_SHIFT", allow_hyphen_values = true)]
    min_shift: Option<i32>,
    #[arg(long, env = "ONSET_ALIGN_MAX_SHIFT", allow_hyphen_values = true)]
    max_shift: Option<i32>,
    /// Also write the JSON result into the store under this key.
    #[arg(long, env = "ONSET_ALIGN_REPORT_KEY")]
    report_key: Option<String>,
}

fn main() {
    init_logging();
    match run() {
        Ok(()) => {}
        Err(message) => {
            tracing::error!("{message}");
            std::process::exit(1);
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("ONSET_ALIGN_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run() -> Result<(), String> {
    let args = Args::parse();
    let config = resolve_config(&args)?;

    let aligner = OffsetAlignerBuilder::new(config.clone())
        .build()
        .map_err(|err| format!("invalid aligner configuration: {err}"))?;
    let job = AlignmentJob::new(
        Box::new(FsBlobStore::new(&args.root)),
        Box::new(AudioDecoder),
        aligner,
        DecodeRequest::from_config(&config),
    );

    let result = match args.report_key.as_deref() {
        Some(report_key) => job.run_and_store(&args.reference, &args.part, report_key),
        None => job.run(&args.reference, &args.part),
    }
    .map_err(|err| format!("alignment failed: {err}"))?;

    let json = serde_json::to_string_pretty(&result)
        .map_err(|err| format!("failed to serialize result: {err}"))?;
    println!("{json}");
    Ok(())
}

fn resolve_config(args: &Args) -> Result<AlignerConfig, String> {
    let mut config = match args.config.as_ref() {
        Some(path) => AlignerConfig::load(path)
            .map_err(|err| format!("failed to load config '{}': {err}", path.display()))?,
        None => AlignerConfig::default(),
    };
    if let Some(offset) = args.offset_seconds {
        config.offset_seconds = offset;
    }
    if args.full_length {
        config.duration_seconds = None;
    } else if let Some(duration) = args.duration_seconds {
        config.duration_seconds = Some(duration);
    }
    if let Some(min_shift) = args.min_shift {
        config.min_shift = min_shift;
    }
    if let Some(max_shift) = args.max_shift {
        config.max_shift = max_shift;
    }
    config.validate().map_err(|err| err.to_string())?;
    Ok(config)
}
