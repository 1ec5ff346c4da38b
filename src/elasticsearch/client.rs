//! Elasticsearch client wrapper.

use anyhow::Result;
use elasticsearch::{
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    Elasticsearch,
};
use url::Url;

/// Elasticsearch client wrapper with connection configuration.
///
/// Index names are passed per call: the service addresses separate area,
/// postcode and boundary indices through one client.
#[derive(Clone)]
pub struct EsClient {
    client: Elasticsearch,
}

impl EsClient {
    /// Create a new Elasticsearch client
    pub fn new(es_url: &str) -> Result<Self> {
        let url = Url::parse(es_url)?;
        let conn_pool = SingleNodeConnectionPool::new(url);
        let transport = TransportBuilder::new(conn_pool).disable_proxy().build()?;

        let client = Elasticsearch::new(transport);

        Ok(Self { client })
    }

    /// Get the underlying Elasticsearch client
    pub fn client(&self) -> &Elasticsearch {
        &self.client
    }

    /// Check if cluster is healthy
    pub async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .cluster()
            .health(elasticsearch::cluster::ClusterHealthParts::None)
            .send()
            .await?;

        Ok(response.status_code().is_success())
    }

    /// Get document count in an index
    pub async fn doc_count(&self, index_name: &str) -> Result<u64> {
        let response = self
            .client
            .count(elasticsearch::CountParts::Index(&[index_name]))
            .send()
            .await?;

        let body = response.json::<serde_json::Value>().await?;
        Ok(body["count"].as_u64().unwrap_or(0))
    }
}
