//! Bulk loader for the search indices.
//!
//! Reads postcode pins from CSV and boundary documents from JSON files,
//! creates the target indices with their mappings, and bulk-indexes the
//! documents.

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

use locus::elasticsearch::{create_index, BulkIndexer, EsClient, Mapping};
use locus::geometry::GeoPoint;
use locus::models::{BoundaryDoc, GeoShape, Pin, PostcodeDoc};

mod config;
use config::{BoundarySource, Config, PostcodeSource};

#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Bulk loader for the search indices")]
struct Args {
    /// Path to the ingest config file
    #[arg(short, long, default_value = "ingest.toml")]
    config: String,

    /// Drop and recreate target indices before loading
    #[arg(long)]
    recreate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let config = Config::load_from_file(&args.config)?;

    info!("Connecting to Elasticsearch at {}", config.global.es_url);
    let es_client = EsClient::new(&config.global.es_url)?;

    if !es_client.health_check().await? {
        bail!("Elasticsearch cluster is not healthy");
    }

    if let Some(postcodes) = &config.postcodes {
        create_index(&es_client, &postcodes.index, Mapping::Postcodes, args.recreate).await?;
        load_postcodes(&es_client, postcodes, config.global.batch_size).await?;
    }

    if let Some(boundaries) = &config.boundaries {
        create_index(
            &es_client,
            &boundaries.index,
            Mapping::Boundaries,
            args.recreate,
        )
        .await?;
        load_boundaries(&es_client, boundaries, config.global.batch_size).await?;
    }

    Ok(())
}

/// Load postcode pins from a CSV file. The postcode is the first column;
/// latitude and longitude columns are resolved from the header row.
async fn load_postcodes(
    client: &EsClient,
    source: &PostcodeSource,
    batch_size: usize,
) -> Result<()> {
    info!("Loading postcodes from {}", source.csv.display());

    let mut reader = csv::Reader::from_path(&source.csv).context("Failed to open postcode csv")?;

    let headers = reader.headers()?.clone();
    let lat_col = headers.iter().position(|h| h == "lat");
    let long_col = headers.iter().position(|h| h == "long");

    let (lat_col, long_col) = match (lat_col, long_col) {
        (Some(lat), Some(long)) => (lat, long),
        _ => bail!("postcode csv is missing lat/long headers"),
    };

    let progress = ProgressBar::new_spinner();
    progress.set_style(ProgressStyle::with_template(
        "{spinner} {pos} postcodes indexed",
    )?);

    let mut indexer = BulkIndexer::new(client.clone(), &source.index, batch_size);
    let mut skipped = 0usize;

    for record in reader.records() {
        let record = record?;

        let raw = match record.get(0) {
            Some(postcode) if !postcode.is_empty() => postcode.to_string(),
            _ => {
                skipped += 1;
                continue;
            }
        };

        let (Some(lat), Some(lon)) = (
            parse_coordinate(record.get(lat_col)),
            parse_coordinate(record.get(long_col)),
        ) else {
            skipped += 1;
            continue;
        };

        let postcode = raw.replace(' ', "").to_lowercase();

        let doc = PostcodeDoc {
            postcode: postcode.clone(),
            postcode_raw: raw,
            pin: Pin {
                location: GeoPoint { lat, lon },
            },
        };

        indexer.add(postcode, serde_json::to_value(&doc)?).await?;
        progress.inc(1);
    }

    let (indexed, errors) = indexer.finish().await?;
    progress.finish_and_clear();

    info!(
        "Indexed {} postcodes ({} errors, {} rows skipped)",
        indexed, errors, skipped
    );

    Ok(())
}

/// Load boundary documents from a directory of JSON files, validating each
/// shape before it is indexed.
async fn load_boundaries(
    client: &EsClient,
    source: &BoundarySource,
    batch_size: usize,
) -> Result<()> {
    info!("Loading boundaries from {}", source.dir.display());

    let mut indexer = BulkIndexer::new(client.clone(), &source.index, batch_size);
    let mut read = 0usize;

    let entries = std::fs::read_dir(&source.dir).context("Failed to read boundary directory")?;
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }

        let content = std::fs::read_to_string(&path)?;
        let payload: serde_json::Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        let location = &payload["location"];
        let shape = match GeoShape::from_parts(location["type"].as_str(), location.get("coordinates"))
        {
            Ok(shape) => shape,
            Err(err) => {
                warn!("Skipping {}: {}", path.display(), err);
                continue;
            }
        };

        let id = payload["id"]
            .as_str()
            .map(String::from)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let name = payload["name"].as_str().map(String::from);

        let doc = BoundaryDoc {
            id: id.clone(),
            name,
            location: shape,
        };

        indexer.add(id, serde_json::to_value(&doc)?).await?;
        read += 1;
    }

    let (indexed, errors) = indexer.finish().await?;

    info!(
        "Indexed {} boundary documents ({} errors, {} files read)",
        indexed, errors, read
    );

    Ok(())
}

fn parse_coordinate(field: Option<&str>) -> Option<f64> {
    field.and_then(|value| value.trim().parse().ok())
}
