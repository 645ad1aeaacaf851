//! labelmetrics CLI — measure labeled images from the command line.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use labelmetrics::{
    object_to_measurement, IntensityImage, LabelImage, Measurement, MeasurementTool,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "labelmetrics")]
#[command(about = "Per-object measurements on labeled images (PNG label maps, optional intensity)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure features over the objects of a labeled image.
    Measure {
        /// Path to the labeled image (8-bit gray PNG; pixel value = object ID).
        #[arg(long)]
        label: PathBuf,

        /// Path to the intensity image (8-bit gray PNG, same size).
        #[arg(long)]
        grey: Option<PathBuf>,

        /// Comma-separated feature names, e.g. "Size,Center,Perimeter".
        #[arg(long, value_delimiter = ',', required = true)]
        features: Vec<String>,

        /// Comma-separated object IDs to measure (default: all labels).
        #[arg(long, value_delimiter = ',')]
        objects: Vec<u32>,

        /// Connectivity used when the image was labeled (1 or 2 for 2-D).
        #[arg(long, default_value = "2")]
        connectivity: usize,

        /// Write the table as JSON to this path instead of printing it.
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// List the registered measurement features.
    Features,

    /// Paint one feature's values back onto the labeled image.
    Paint {
        /// Path to the labeled image (8-bit gray PNG).
        #[arg(long)]
        label: PathBuf,

        /// Path to the intensity image (needed by some features).
        #[arg(long)]
        grey: Option<PathBuf>,

        /// Feature to paint; its first value is written, rescaled to 0..255.
        #[arg(long)]
        feature: String,

        /// Output PNG path.
        #[arg(long)]
        out: PathBuf,

        /// Connectivity used when the image was labeled.
        #[arg(long, default_value = "2")]
        connectivity: usize,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Measure {
            label,
            grey,
            features,
            objects,
            connectivity,
            json,
        } => run_measure(
            &label,
            grey.as_deref(),
            &features,
            &objects,
            connectivity,
            json.as_deref(),
        ),

        Commands::Features => run_features(),

        Commands::Paint {
            label,
            grey,
            feature,
            out,
            connectivity,
        } => run_paint(&label, grey.as_deref(), &feature, &out, connectivity),
    }
}

// ── measure ────────────────────────────────────────────────────────────────

fn load_label(path: &Path) -> CliResult<LabelImage> {
    Ok(LabelImage::from_gray(&image::open(path)?.to_luma8()))
}

fn load_grey(path: Option<&Path>) -> CliResult<Option<IntensityImage>> {
    Ok(match path {
        Some(p) => Some(IntensityImage::from_gray(&image::open(p)?.to_luma8())),
        None => None,
    })
}

fn run_measure(
    label_path: &Path,
    grey_path: Option<&Path>,
    features: &[String],
    objects: &[u32],
    connectivity: usize,
    json_path: Option<&Path>,
) -> CliResult<()> {
    let label = load_label(label_path)?;
    let grey = load_grey(grey_path)?;
    let names: Vec<&str> = features.iter().map(String::as_str).collect();

    let mut tool = MeasurementTool::new();
    let table = tool.measure(&label, grey.as_ref(), &names, objects, connectivity)?;

    match json_path {
        Some(path) => {
            std::fs::write(path, serde_json::to_string_pretty(&table_to_json(&table)?)?)?;
            println!(
                "wrote {} objects x {} values to {}",
                table.number_of_objects(),
                table.number_of_values(),
                path.display()
            );
        }
        None => print!("{table}"),
    }
    Ok(())
}

fn table_to_json(table: &Measurement) -> CliResult<serde_json::Value> {
    let mut rows = Vec::new();
    for &id in table.objects() {
        let mut row = serde_json::Map::new();
        row.insert("id".into(), id.into());
        let object = table.object(id)?;
        for cell in object.cells() {
            row.insert(cell.name().to_string(), cell.values().to_vec().into());
        }
        rows.push(serde_json::Value::Object(row));
    }
    Ok(serde_json::json!({
        "features": table.features(),
        "values": table.value_information(),
        "rows": rows,
    }))
}

// ── features ───────────────────────────────────────────────────────────────

fn run_features() -> CliResult<()> {
    let tool = MeasurementTool::new();
    println!("{:<18} {:<6} description", "name", "grey");
    for info in tool.features() {
        println!(
            "{:<18} {:<6} {}",
            info.name,
            if info.needs_intensity { "yes" } else { "no" },
            info.description
        );
    }
    Ok(())
}

// ── paint ──────────────────────────────────────────────────────────────────

fn run_paint(
    label_path: &Path,
    grey_path: Option<&Path>,
    feature: &str,
    out_path: &Path,
    connectivity: usize,
) -> CliResult<()> {
    let label = load_label(label_path)?;
    let grey = load_grey(grey_path)?;

    let mut tool = MeasurementTool::new();
    let table = tool.measure(&label, grey.as_ref(), &[feature], &[], connectivity)?;
    let painted = object_to_measurement(&label, &table.feature(feature)?)?;

    // First value channel, rescaled to the 8-bit range.
    let channels = painted.tensor_len();
    let max = painted
        .data()
        .iter()
        .step_by(channels)
        .fold(0.0f64, |m, &v| m.max(v));
    let scale = if max > 0.0 { 255.0 / max } else { 0.0 };
    let (w, h) = (painted.size(0) as u32, painted.size(1) as u32);
    let mut out = image::GrayImage::new(w, h);
    for (i, pixel) in out.pixels_mut().enumerate() {
        let v = painted.data()[i * channels] * scale;
        *pixel = image::Luma([v.round().clamp(0.0, 255.0) as u8]);
    }
    out.save(out_path)?;
    println!(
        "painted {} ({} values, max {max:.3}) to {}",
        feature,
        channels,
        out_path.display()
    );
    Ok(())
}
