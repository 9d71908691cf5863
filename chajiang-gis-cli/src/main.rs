use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use chajiang_gis::layer::LayerCatalog;
use chajiang_gis::{Normalized, Normalizer, Projector, RegionConfig, load};
use clap::{Parser, Subcommand};
use geo::BoundingRect;
use rayon::prelude::*;

#[derive(Parser)]
#[command(name = "chajiang-gis", version, about = "Normalize map overlay data to WGS84 GeoJSON")]
struct Args {
    /// Built-in region preset
    #[arg(long, global = true, default_value = "chajiang")]
    region: String,
    /// JSON file overriding the region constants
    #[arg(long, global = true)]
    region_config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize one overlay document
    Normalize {
        /// Input .json/.geojson file or http(s) URL
        input: String,
        /// Output .geojson file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Indent the output
        #[arg(long)]
        pretty: bool,
    },
    /// Normalize every layer in a catalog that names a source
    Layers {
        /// Layer catalog (JSON array)
        #[arg(long)]
        catalog: PathBuf,
        /// Directory receiving one <layer id>.geojson per layer
        #[arg(long)]
        out_dir: PathBuf,
    },
    /// Project a single coordinate pair
    Project { x: f64, y: f64 },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var_os("RUST_LOG").is_none() {
        pretty_env_logger::formatted_builder()
            .filter_level(log::LevelFilter::Info)
            .init();
    } else {
        pretty_env_logger::init();
    }

    let args = Args::parse();
    let region = match &args.region_config {
        Some(path) => RegionConfig::from_path(path)?,
        None => RegionConfig::preset(&args.region)
            .ok_or_else(|| format!("Unknown region preset: {}", args.region))?,
    };

    let inst = Instant::now();
    match args.command {
        Command::Normalize {
            input,
            output,
            pretty,
        } => {
            let normalizer = Normalizer::new(region);
            let normalized = load_source(&input, &normalizer)?;
            print_summary(&input, &normalized);
            match output {
                Some(path) => write_geojson(&path, &normalized, pretty)?,
                None => {
                    let stdout = std::io::stdout();
                    let mut out = stdout.lock();
                    write_json(&mut out, &normalized, pretty)?;
                    writeln!(out)?;
                }
            }
        }
        Command::Layers { catalog, out_dir } => {
            let catalog = LayerCatalog::from_path(catalog)?;
            std::fs::create_dir_all(&out_dir)?;
            let normalizer = Normalizer::new(region);

            catalog
                .layers()
                .par_iter()
                .filter_map(|layer| layer.source.as_ref().map(|source| (layer, source)))
                .try_for_each(|(layer, source)| -> Result<(), String> {
                    eprintln!("Layer: {} ({})", layer.id, layer.name);
                    let normalized = load_source(source, &normalizer)
                        .map_err(|e| format!("{}: {}", layer.id, e))?;
                    print_summary(source, &normalized);
                    let path = out_dir.join(format!("{}.geojson", layer.id));
                    write_geojson(&path, &normalized, false)
                        .map_err(|e| format!("{}: {}", layer.id, e))
                })?;
        }
        Command::Project { x, y } => {
            let projection = Projector::new(region).project(x, y);
            let [lng, lat] = projection.point();
            println!("{} {}", lng, lat);
            eprintln!("{:?}", projection);
        }
    }

    eprintln!("Elapsed time: {:?}", inst.elapsed());
    Ok(())
}

fn load_source(source: &str, normalizer: &Normalizer) -> Result<Normalized, chajiang_gis::Error> {
    if load::is_url(source) {
        load::from_url(source, normalizer)
    } else {
        load::from_path(source, normalizer)
    }
}

fn print_summary(source: &str, normalized: &Normalized) {
    let report = &normalized.report;
    eprintln!(
        "{}: {}/{} features, {} points, {} dropped, {} fallback points",
        source,
        report.output_features(),
        report.input_features,
        report.points,
        report.dropped.len(),
        report.fallback_points,
    );
    if report.replaced_rings > 0 {
        eprintln!("  {} invalid rings emptied", report.replaced_rings);
    }
    for err in &report.dropped {
        eprintln!("  dropped {}", err);
    }
    if let Some(rect) = normalized.collection.to_geo().bounding_rect() {
        eprintln!(
            "  bbox: [{}, {}] - [{}, {}]",
            rect.min().x,
            rect.min().y,
            rect.max().x,
            rect.max().y
        );
    }
}

fn write_json<W: Write>(
    writer: W,
    normalized: &Normalized,
    pretty: bool,
) -> Result<(), serde_json::Error> {
    if pretty {
        serde_json::to_writer_pretty(writer, &normalized.collection)
    } else {
        serde_json::to_writer(writer, &normalized.collection)
    }
}

fn write_geojson(
    path: &Path,
    normalized: &Normalized,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_json(&mut writer, normalized, pretty)?;
    writer.flush()?;
    Ok(())
}
