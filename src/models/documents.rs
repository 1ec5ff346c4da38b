//! Documents stored in and returned from the search indices.

use serde::{Deserialize, Serialize};

use crate::geometry::GeoPoint;
use crate::models::GeoShape;

/// A geocoded postcode with its pin location.
///
/// `postcode` is the normalized form (lower-cased, spaces stripped) used for
/// exact-term lookups; `postcode_raw` preserves the source spelling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostcodeDoc {
    pub postcode: String,
    pub postcode_raw: String,
    pub pin: Pin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pin {
    pub location: GeoPoint,
}

/// A stored named boundary, used as the source shape for parent searches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryDoc {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub location: GeoShape,
}

/// An indexed areal unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaDoc {
    pub name: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hierarchy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape_length: Option<f64>,
}

/// The result envelope returned to API callers.
///
/// Field order is the wire order; `limit` and `offset` are the post-clamp
/// window, `total_count` is the index's reported total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    pub count: usize,
    pub items: Vec<AreaDoc>,
    pub limit: usize,
    pub offset: usize,
    pub total_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_field_order_is_stable() {
        let results = SearchResults {
            count: 0,
            items: vec![],
            limit: 50,
            offset: 0,
            total_count: 0,
        };

        let encoded = serde_json::to_string(&results).unwrap();
        assert_eq!(
            encoded,
            r#"{"count":0,"items":[],"limit":50,"offset":0,"total_count":0}"#
        );
    }

    #[test]
    fn test_area_doc_omits_absent_optionals() {
        let doc = AreaDoc {
            name: "Riverside".to_string(),
            code: "W04000874".to_string(),
            hierarchy: None,
            shape_area: None,
            shape_length: None,
        };

        let encoded = serde_json::to_string(&doc).unwrap();
        assert_eq!(encoded, r#"{"name":"Riverside","code":"W04000874"}"#);
    }

    #[test]
    fn test_postcode_doc_deserializes_pin() {
        let doc: PostcodeDoc = serde_json::from_value(serde_json::json!({
            "postcode": "cf118az",
            "postcode_raw": "CF11 8AZ",
            "pin": { "location": { "lat": 51.486090, "lon": -3.227882 } }
        }))
        .unwrap();

        assert_eq!(doc.pin.location.lat, 51.486090);
        assert_eq!(doc.pin.location.lon, -3.227882);
    }
}
