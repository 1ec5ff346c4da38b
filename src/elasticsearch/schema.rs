//! Elasticsearch index schema management.

use anyhow::{Context, Result};
use elasticsearch::indices::{IndicesCreateParts, IndicesDeleteParts, IndicesExistsParts};
use tracing::info;

use super::EsClient;

/// Schema JSON embedded at compile time
const AREAS_MAPPING: &str = include_str!("../../schema/areas_mapping.json");
const POSTCODES_MAPPING: &str = include_str!("../../schema/postcodes_mapping.json");
const BOUNDARIES_MAPPING: &str = include_str!("../../schema/boundaries_mapping.json");

/// The embedded mapping to create an index with.
#[derive(Debug, Clone, Copy)]
pub enum Mapping {
    Areas,
    Postcodes,
    Boundaries,
}

impl Mapping {
    fn body(self) -> &'static str {
        match self {
            Mapping::Areas => AREAS_MAPPING,
            Mapping::Postcodes => POSTCODES_MAPPING,
            Mapping::Boundaries => BOUNDARIES_MAPPING,
        }
    }
}

/// Create an index with the given mapping
pub async fn create_index(
    client: &EsClient,
    index_name: &str,
    mapping: Mapping,
    delete_existing: bool,
) -> Result<()> {
    let es = client.client();

    // Check if index exists
    let exists = es
        .indices()
        .exists(IndicesExistsParts::Index(&[index_name]))
        .send()
        .await?
        .status_code()
        .is_success();

    if exists {
        if delete_existing {
            info!("Deleting existing index: {}", index_name);
            es.indices()
                .delete(IndicesDeleteParts::Index(&[index_name]))
                .send()
                .await
                .context("Failed to delete existing index")?;
        } else {
            info!("Index {} already exists, skipping creation", index_name);
            return Ok(());
        }
    }

    // Parse the mapping JSON
    let mapping: serde_json::Value =
        serde_json::from_str(mapping.body()).context("Failed to parse embedded mapping")?;

    // Create the index
    info!("Creating index: {}", index_name);
    let response = es
        .indices()
        .create(IndicesCreateParts::Index(index_name))
        .body(mapping)
        .send()
        .await
        .context("Failed to create index")?;

    if !response.status_code().is_success() {
        let error_body = response.text().await?;
        anyhow::bail!("Failed to create index: {}", error_body);
    }

    info!("Index {} created successfully", index_name);
    Ok(())
}
