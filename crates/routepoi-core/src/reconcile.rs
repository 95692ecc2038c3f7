//! Pure half of write-back: wire records and the merged POI list.

use crate::error::{PoiError, Result};
use crate::models::CanonicalPoi;
use crate::type_map::{canonical_type_name, canonical_type_to_external_id};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// POI as stored on the remote route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePoiRecord {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
    /// Empty when the POI has none.
    pub description: String,
    pub url: String,
    pub type_id: i64,
    pub type_name: String,
    pub owner_id: Option<Value>,
}

pub fn to_remote_record(poi: &CanonicalPoi, owner_id: Option<&Value>) -> RemotePoiRecord {
    RemotePoiRecord {
        lat: poi.lat,
        lng: poi.lng,
        name: poi.name.clone(),
        description: poi.description.clone().unwrap_or_default(),
        url: poi.url.clone().unwrap_or_default(),
        type_id: canonical_type_to_external_id(poi.poi_type),
        type_name: canonical_type_name(poi.poi_type).to_string(),
        owner_id: owner_id.cloned(),
    }
}

/// Remote list verbatim followed by the accepted POIs in order.
pub fn merge_for_write(
    existing: Vec<Value>,
    accepted: &[CanonicalPoi],
    owner_id: Option<&Value>,
) -> Result<Vec<Value>> {
    let mut merged = existing;
    merged.reserve(accepted.len());
    for poi in accepted {
        let record = to_remote_record(poi, owner_id);
        let value = serde_json::to_value(record).map_err(|err| {
            PoiError::invalid(format!("cannot serialize POI '{}': {}", poi.name, err))
        })?;
        merged.push(value);
    }
    Ok(merged)
}

/// Outcome of one commit, including the exact list written.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitResult {
    pub added_count: usize,
    pub total_count: usize,
    pub pois: Vec<Value>,
}

impl CommitResult {
    pub fn response(&self) -> CommitResponse {
        CommitResponse {
            success: true,
            added_count: self.added_count,
            total_count: self.total_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResponse {
    pub success: bool,
    pub added_count: usize,
    pub total_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_map::CanonicalType;
    use serde_json::json;

    #[test]
    fn test_remote_record_wire_shape() {
        let poi = CanonicalPoi::new("Spring", 46.5, 7.25, "osm")
            .with_type(CanonicalType::Water)
            .with_url("https://www.openstreetmap.org/node/1");
        let value = serde_json::to_value(to_remote_record(&poi, Some(&json!(99)))).unwrap();

        assert_eq!(value["typeName"], "water");
        assert_eq!(
            value["typeId"],
            json!(canonical_type_to_external_id(CanonicalType::Water))
        );
        assert_eq!(value["ownerId"], 99);
        assert_eq!(value["description"], "");
        assert_eq!(value["url"], "https://www.openstreetmap.org/node/1");
    }

    #[test]
    fn test_merge_appends_in_order() {
        let existing = vec![json!({"name": "A", "extra": 1}), json!({"name": "B"})];
        let accepted = vec![CanonicalPoi::new("C", 1.0, 2.0, "google")];
        let merged = merge_for_write(existing, &accepted, None).unwrap();

        let names: Vec<&str> = merged.iter().filter_map(|v| v["name"].as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(merged[0]["extra"], 1);
        assert!(merged[2]["ownerId"].is_null());
    }

    #[test]
    fn test_commit_response_is_camel_case() {
        let result = CommitResult {
            added_count: 1,
            total_count: 3,
            pois: Vec::new(),
        };
        let value = serde_json::to_value(result.response()).unwrap();
        assert_eq!(value, json!({"success": true, "addedCount": 1, "totalCount": 3}));
    }
}
