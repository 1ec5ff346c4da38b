//! Index lookups and the outbound geo-shape search.

use elasticsearch::{IndexParts, SearchParts};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::SearchError;
use crate::models::{AreaDoc, BoundaryDoc, GeoShape, PostcodeDoc, Relation};

use super::EsClient;

/// Look up a postcode document by its normalized form. Returns `None` on
/// zero hits; the caller decides whether that is terminal.
pub async fn find_postcode(
    client: &EsClient,
    index: &str,
    postcode: &str,
) -> Result<Option<PostcodeDoc>, SearchError> {
    let body = json!({
        "query": {
            "term": { "postcode": postcode }
        },
        "size": 1
    });

    let response = run_search(client, index, body).await?;
    first_source(&response)
}

/// Look up a stored boundary document by id.
pub async fn find_boundary(
    client: &EsClient,
    index: &str,
    id: &str,
) -> Result<Option<BoundaryDoc>, SearchError> {
    let body = json!({
        "query": {
            "term": { "id": id }
        },
        "size": 1
    });

    let response = run_search(client, index, body).await?;
    first_source(&response)
}

/// Run one geo-shape query against the area index, returning the page of
/// matching documents and the index's reported total.
pub async fn search_by_shape(
    client: &EsClient,
    index: &str,
    shape: &GeoShape,
    relation: Relation,
    limit: usize,
    offset: usize,
) -> Result<(Vec<AreaDoc>, u64), SearchError> {
    let body = geo_shape_body(shape, relation, limit, offset);
    let response = run_search(client, index, body).await?;

    let total = response["hits"]["total"]["value"]
        .as_u64()
        .ok_or(SearchError::MalformedResponse)?;

    let hits = response["hits"]["hits"]
        .as_array()
        .ok_or(SearchError::MalformedResponse)?;

    let mut items = Vec::with_capacity(hits.len());
    for hit in hits {
        let doc: AreaDoc = serde_json::from_value(hit["_source"].clone())
            .map_err(|_| SearchError::MalformedResponse)?;
        items.push(doc);
    }

    Ok((items, total))
}

/// Index a single document under the given id.
pub async fn index_document<T: Serialize>(
    client: &EsClient,
    index: &str,
    id: &str,
    document: &T,
) -> Result<(), SearchError> {
    let response = client
        .client()
        .index(IndexParts::IndexId(index, id))
        .body(document)
        .send()
        .await?;

    let status = response.status_code();
    if !status.is_success() {
        return Err(SearchError::UnexpectedStatusCode(status.as_u16()));
    }

    Ok(())
}

/// The geo-shape query document: match everything, filtered to documents
/// whose stored `location` has the requested relation to the search shape,
/// paged with from/size.
fn geo_shape_body(shape: &GeoShape, relation: Relation, limit: usize, offset: usize) -> Value {
    json!({
        "from": offset,
        "size": limit,
        "query": {
            "bool": {
                "must": { "match_all": {} },
                "filter": {
                    "geo_shape": {
                        "location": {
                            "shape": shape,
                            "relation": relation.as_str()
                        }
                    }
                }
            }
        }
    })
}

async fn run_search(client: &EsClient, index: &str, body: Value) -> Result<Value, SearchError> {
    debug!(index, body = %body, "querying search index");

    let response = client
        .client()
        .search(SearchParts::Index(&[index]))
        .body(body)
        .send()
        .await?;

    let status = response.status_code();
    if !status.is_success() {
        return Err(SearchError::UnexpectedStatusCode(status.as_u16()));
    }

    Ok(response.json::<Value>().await?)
}

fn first_source<T: DeserializeOwned>(response: &Value) -> Result<Option<T>, SearchError> {
    let hit = match response["hits"]["hits"].as_array().and_then(|h| h.first()) {
        Some(hit) => hit,
        None => return Ok(None),
    };

    serde_json::from_value(hit["_source"].clone())
        .map(Some)
        .map_err(|_| SearchError::MalformedResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_shape_body() {
        let shape = GeoShape::from_ring(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]);
        let body = geo_shape_body(&shape, Relation::Within, 50, 100);

        assert_eq!(
            body,
            json!({
                "from": 100,
                "size": 50,
                "query": {
                    "bool": {
                        "must": { "match_all": {} },
                        "filter": {
                            "geo_shape": {
                                "location": {
                                    "shape": {
                                        "type": "polygon",
                                        "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
                                    },
                                    "relation": "within"
                                }
                            }
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_first_source_empty_hits() {
        let response = json!({ "hits": { "total": { "value": 0 }, "hits": [] } });
        let doc: Option<PostcodeDoc> = first_source(&response).unwrap();
        assert!(doc.is_none());
    }

    #[test]
    fn test_first_source_parses_document() {
        let response = json!({
            "hits": {
                "total": { "value": 1 },
                "hits": [{
                    "_score": 1.0,
                    "_source": {
                        "postcode": "cf118az",
                        "postcode_raw": "CF11 8AZ",
                        "pin": { "location": { "lat": 51.48609, "lon": -3.227882 } }
                    }
                }]
            }
        });

        let doc: Option<PostcodeDoc> = first_source(&response).unwrap();
        assert_eq!(doc.unwrap().postcode, "cf118az");
    }

    #[test]
    fn test_first_source_malformed_document() {
        let response = json!({
            "hits": { "hits": [{ "_source": { "postcode": 7 } }] }
        });

        let result: Result<Option<PostcodeDoc>, _> = first_source(&response);
        assert!(matches!(result, Err(SearchError::MalformedResponse)));
    }
}
