//! Satellite imagery mosaic builder.
//!
//! Builds one georeferenced mosaic for a product family over a bounding box
//! and date range: tiles are acquired from the imagery provider, merged,
//! validity-masked, temporally composited where the product calls for it,
//! gap-filled and written as a single multi-band TIFF.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use acquisition::{
    Acquirer, AcquirerConfig, GdalWarp, ProcessApiClient, ProviderCredentials, RequestPacer,
};
use compositing::{CloudClassifier, MaskPrecedence, ProductKind};
use mosaic_common::{split_interval, BoundingBox, TileGrid, TimeSlot};

use mosaic::cloud::{InferenceClient, DEFAULT_MODEL_URL};
use mosaic::pipeline::Pipeline;

const DEFAULT_API_URL: &str = "https://services.imagery-provider.com/api/v1";

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Product {
    Optical,
    Radar,
    Elevation,
    Landcover,
    LandcoverAlt,
}

impl Product {
    fn kind(self) -> ProductKind {
        match self {
            Product::Optical => ProductKind::Optical,
            Product::Radar => ProductKind::Radar,
            Product::Elevation => ProductKind::Elevation,
            Product::Landcover => ProductKind::LandCover,
            Product::LandcoverAlt => ProductKind::LandCoverAlt,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Precedence {
    /// The provider mask forces NoData over gap-filled class values.
    OverrideFill,
    /// Gap-filled class values survive where the provider mask was zero.
    KeepFill,
}

impl Precedence {
    fn mask_precedence(self) -> MaskPrecedence {
        match self {
            Precedence::OverrideFill => MaskPrecedence::OverrideFill,
            Precedence::KeepFill => MaskPrecedence::KeepFill,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "mosaic")]
#[command(about = "Build a satellite imagery mosaic for a bounding box and date range")]
struct Args {
    /// Product family to build
    #[arg(long, value_enum, default_value = "elevation")]
    product: Product,

    /// Output path, must end in .tif
    #[arg(long, default_value = "./mosaic.tif")]
    output: PathBuf,

    /// Western edge of the bounding box, degrees longitude
    #[arg(long, default_value = "46.00")]
    min_lon: f64,

    /// Southern edge of the bounding box, degrees latitude
    #[arg(long, default_value = "-16.15")]
    min_lat: f64,

    /// Eastern edge of the bounding box, degrees longitude
    #[arg(long, default_value = "46.05")]
    max_lon: f64,

    /// Northern edge of the bounding box, degrees latitude
    #[arg(long, default_value = "-16.01")]
    max_lat: f64,

    /// Start date, YYYY-MM-DD
    #[arg(long, default_value = "2020-10-05")]
    start_date: String,

    /// End date, YYYY-MM-DD, must be after the start date
    #[arg(long, default_value = "2021-12-07")]
    end_date: String,

    /// Bounding box grid rows
    #[arg(long, default_value = "10")]
    split_rows: usize,

    /// Bounding box grid columns
    #[arg(long, default_value = "10")]
    split_cols: usize,

    /// Number of time slots for temporal products
    #[arg(long, default_value = "3")]
    num_periods: usize,

    /// Maximum acquisition attempts per slot
    #[arg(long, default_value = "10")]
    max_retry: u32,

    /// Provider request budget, requests per minute
    #[arg(long, default_value = "300")]
    rate_limit: u32,

    /// How the provider mask interacts with gap-filled categorical values
    #[arg(long, value_enum, default_value = "override-fill")]
    mask_precedence: Precedence,

    /// Imagery provider API base URL
    #[arg(long, env = "IMAGERY_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Cloud-probability model base URL
    #[arg(long, env = "CLOUD_MODEL_URL", default_value = DEFAULT_MODEL_URL)]
    cloud_model_url: String,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Everything `run` needs, produced by argument validation.
struct Plan {
    grid: TileGrid,
    slots: Vec<TimeSlot>,
    output: PathBuf,
}

fn parse_date(name: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("{name} must be a valid YYYY-MM-DD date, got {value}"))
}

/// Check every argument before any acquisition is attempted.
fn validate(args: &Args) -> Result<Plan> {
    if args.output.extension().map(|e| e != "tif").unwrap_or(true) {
        bail!(
            "output path must have a .tif extension, got {}",
            args.output.display()
        );
    }

    let bbox = BoundingBox::new(args.min_lon, args.min_lat, args.max_lon, args.max_lat);
    bbox.validate()?;

    let start = parse_date("start date", &args.start_date)?;
    let end = parse_date("end date", &args.end_date)?;
    if start >= end {
        bail!("start date must be before end date, got {start} and {end}");
    }

    if args.split_rows < 1 || args.split_cols < 1 {
        bail!(
            "grid split must be at least 1x1, got {}x{}",
            args.split_rows,
            args.split_cols
        );
    }
    if args.num_periods < 1 {
        bail!("number of periods must be at least 1, got {}", args.num_periods);
    }
    if args.max_retry < 1 {
        bail!("max retry must be at least 1, got {}", args.max_retry);
    }
    if args.rate_limit < 1 {
        bail!("rate limit must be at least 1, got {}", args.rate_limit);
    }

    let grid = TileGrid::new(bbox, args.split_rows, args.split_cols)?;
    let product = args.product.kind().profile();
    let slots = if product.temporal {
        split_interval(start, end, args.num_periods)?
    } else {
        vec![TimeSlot::new(start, end)?]
    };

    Ok(Plan {
        grid,
        slots,
        output: args.output.clone(),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let plan = validate(&args)?;

    // Missing credentials must fail before any tile is requested.
    let credentials =
        ProviderCredentials::from_env().context("provider credentials are required")?;

    let product = args.product.kind().profile();
    info!(
        product = product.name,
        tiles = plan.grid.len(),
        slots = plan.slots.len(),
        "starting mosaic build"
    );

    let source = ProcessApiClient::new(args.api_url.clone(), credentials)?;
    let config = AcquirerConfig {
        max_retry: args.max_retry,
        pacer: RequestPacer::from_rate_limit(args.rate_limit),
        recipe: product.recipe.to_string(),
        resolution: product.resolution,
        nodata: product.nodata,
    };
    let acquirer = Acquirer::new(Arc::new(source), Arc::new(GdalWarp::default()), config);

    let classifier: Option<Arc<dyn CloudClassifier>> = if product.cloud_mask {
        Some(Arc::new(InferenceClient::new(args.cloud_model_url.clone())?))
    } else {
        None
    };

    Pipeline::new(acquirer, product, classifier)
        .with_precedence(args.mask_precedence.mask_precedence())
        .run(&plan.grid, &plan.slots, &plan.output)
        .await
}
