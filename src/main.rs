use clap::Parser;
use std::path::PathBuf;

use labelgen::{
    Annotator, BatchConfig, BatchRunner, FileSink, HttpDetectionClient, HttpObjectFetcher,
    ImageprocRenderer,
};

#[derive(Parser)]
#[command(name = "labelgen")]
#[command(about = "Overlay object-detection labels on images from an object store")]
struct Cli {
    /// Image keys to process, in order (overrides the config file)
    #[arg(value_name = "KEY")]
    keys: Vec<String>,

    /// Path to JSON config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Object store bucket
    #[arg(short, long)]
    bucket: Option<String>,

    /// Base URL of the object store
    #[arg(long, value_name = "URL")]
    store_endpoint: Option<String>,

    /// Base URL of the detection service
    #[arg(long, value_name = "URL")]
    detect_endpoint: Option<String>,

    /// Maximum number of labels per image
    #[arg(long)]
    max_labels: Option<u32>,

    /// Minimum confidence (0-100) for reported labels
    #[arg(long)]
    min_confidence: Option<f32>,

    /// Per-call timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Directory for the annotated images
    #[arg(short, long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// TrueType font for label text
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// Continue with the next image when one fails
    #[arg(long)]
    keep_going: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let mut config = match &args.config {
        Some(path) => BatchConfig::from_file(path)?,
        None => BatchConfig::default(),
    };

    // CLI flags override the config file
    if !args.keys.is_empty() {
        config.keys = args.keys;
    }
    if let Some(bucket) = args.bucket {
        config.bucket = bucket;
    }
    if let Some(endpoint) = args.store_endpoint {
        config.store_endpoint = endpoint;
    }
    if let Some(endpoint) = args.detect_endpoint {
        config.detect_endpoint = endpoint;
    }
    if let Some(max_labels) = args.max_labels {
        config.max_labels = max_labels;
    }
    if let Some(min_confidence) = args.min_confidence {
        config.min_confidence = min_confidence;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        config.timeout_secs = timeout_secs;
    }
    if let Some(out_dir) = args.out_dir {
        config.out_dir = out_dir;
    }
    if let Some(font) = args.font {
        config.font_path = Some(font);
    }
    if args.keep_going {
        config.keep_going = true;
    }

    config.validate()?;

    if args.verbose {
        println!(
            "Processing {} images from bucket {:?}",
            config.keys.len(),
            config.bucket
        );
    }

    let fetcher = HttpObjectFetcher::new(&config.store_endpoint, config.timeout())?;
    let detector = HttpDetectionClient::new(&config.detect_endpoint, config.timeout())?;

    let renderer = match &config.font_path {
        Some(path) => ImageprocRenderer::with_font(path)?,
        None => {
            if args.verbose {
                println!("No font configured; boxes will be drawn without label text");
            }
            ImageprocRenderer::new()
        }
    };

    let sink = FileSink::new(&config.out_dir)?;

    let runner = BatchRunner::new(
        Box::new(fetcher),
        Box::new(detector),
        Annotator::new(Box::new(renderer)),
        Box::new(sink),
    )
    .with_params(config.detect_params())
    .with_keep_going(config.keep_going)
    .with_verbose(args.verbose);

    let summary = runner.run(&config.bucket, &config.keys).await?;

    if args.verbose {
        println!(
            "\nDone: {} processed, {} skipped, output in {:?}",
            summary.processed, summary.skipped, config.out_dir
        );
    }

    Ok(())
}
