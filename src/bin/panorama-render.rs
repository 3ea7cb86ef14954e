// panorama-render - CLI for generating stitched panoramas

use anyhow::{Context, Result};
use clap::Parser;
use panorama::{PanoramaConfig, PanoramaPipeline, PanoramaRequest, StitchStrategy};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate a wide panorama from a text prompt", long_about = None)]
struct Args {
    /// Text prompt describing the scene (any language)
    prompt: String,

    /// Requested width in pixels
    #[arg(short, long, default_value = "1792")]
    width: u32,

    /// Requested height in pixels
    #[arg(long, default_value = "1024")]
    height: u32,

    /// Image model (defaults to models.image from the config)
    #[arg(short, long)]
    model: Option<String>,

    /// Stitch strategy: crop-fill, concatenate or overlap-blend
    #[arg(long)]
    strategy: Option<StitchStrategy>,

    /// Overlap fraction for overlap-blend, in [0, 1)
    #[arg(long)]
    overlap: Option<f32>,

    /// Number of segments for concatenate and overlap-blend
    #[arg(long)]
    segments: Option<usize>,

    /// Style seed for the first segment; later segments use seed + i
    #[arg(short, long, conflicts_with = "random_seed")]
    seed: Option<u64>,

    /// Pick a random style seed
    #[arg(long)]
    random_seed: bool,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the PNG here instead of printing a data URI
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print a JSON summary instead of the bare data URI
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("panorama={0},stitcher={0},openai={0}", log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = PanoramaConfig::load(args.config.as_deref()).context("loading configuration")?;
    apply_overrides(&mut config, &args);
    config.validate().context("invalid options")?;

    let seed = match (args.seed, args.random_seed) {
        (Some(seed), _) => Some(seed),
        (None, true) => Some(u64::from(rand::random::<u32>())),
        (None, false) => None,
    };
    if let Some(seed) = seed {
        tracing::info!("Style seed: {}", seed);
    }

    let pipeline = PanoramaPipeline::from_config(&config)?;

    let mut request = PanoramaRequest::new(&args.prompt, args.width, args.height);
    request.model = args.model.clone();
    request.seed = seed;

    let result = pipeline.generate(&request).await?;

    if let Some(path) = &args.output {
        tokio::fs::write(path, result.image.as_bytes())
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::info!("Saved {}x{} panorama to {}", result.width, result.height, path.display());
    }

    if args.json {
        let summary = serde_json::json!({
            "width": result.width,
            "height": result.height,
            "prompt": result.prompt,
            "seed": seed,
            "output": args.output,
            "data_uri": args.output.is_none().then(|| result.data_uri.as_str()),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if args.output.is_none() {
        println!("{}", result.data_uri);
    }

    Ok(())
}

fn apply_overrides(config: &mut PanoramaConfig, args: &Args) {
    if let Some(strategy) = args.strategy {
        config.stitch.strategy = strategy;
    }
    if let Some(overlap) = args.overlap {
        match &mut config.stitch.strategy {
            StitchStrategy::OverlapBlend { overlap_percent } => *overlap_percent = overlap,
            other => tracing::warn!("--overlap has no effect with the {} strategy", other),
        }
    }
    if let Some(segments) = args.segments {
        config.stitch.segments = segments;
    }
}
