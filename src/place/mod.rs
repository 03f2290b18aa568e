//! Place records and the documents generated from them.
//!
//! A [`PlaceRecord`] comes either from a JSON export (no enrichment fields)
//! or from the `places` table (with `llm_description` and `llm_tags`).
//! Both shapes deserialize into the same struct.

mod description;
pub mod reader;

pub use description::{describe, group_thousands, price_label};
pub use reader::{read_json_array, read_jsonl, JsonArray, JsonlReader};

use crate::error::{Result, TravelRagError};
use serde::{Deserialize, Serialize};

/// A point of interest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    /// External identity, propagated as the document id.
    pub google_place_id: Option<String>,
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub primary_category: Option<String>,
    pub google_types: Option<Vec<String>>,
    pub rating: Option<f64>,
    pub reviews_count: Option<i64>,
    pub price_level: Option<i64>,
    pub editorial_summary: Option<String>,
    /// Only present for database-sourced records.
    pub llm_description: Option<String>,
    /// Only present for database-sourced records.
    pub llm_tags: Option<Vec<String>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl PlaceRecord {
    /// Create a record with only the required field set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Fixed-shape metadata attached to every generated document.
///
/// Absent values serialize as `null`; the shape never depends on which
/// paragraphs made it into the content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub city: Option<String>,
    pub state: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub rating: Option<f64>,
    pub reviews_count: Option<i64>,
    pub price_level: Option<i64>,
    pub google_types: Option<Vec<String>>,
    pub primary_category: Option<String>,
}

/// One output line of the convert/export paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedDocument {
    pub doc_id: String,
    pub content: String,
    pub metadata: DocumentMetadata,
}

impl GeneratedDocument {
    /// Build the document for a place.
    ///
    /// Fails when the record has no `google_place_id`, since the id is
    /// propagated verbatim and never regenerated.
    pub fn from_place(place: &PlaceRecord) -> Result<Self> {
        let doc_id = place.google_place_id.clone().ok_or_else(|| {
            TravelRagError::MalformedInput(format!(
                "place '{}' has no google_place_id",
                place.name
            ))
        })?;

        Ok(Self {
            doc_id,
            content: describe(place),
            metadata: DocumentMetadata {
                city: place.city.clone(),
                state: place.state.clone(),
                latitude: place.latitude,
                longitude: place.longitude,
                rating: place.rating,
                reviews_count: place.reviews_count,
                price_level: place.price_level,
                google_types: place.google_types.clone(),
                primary_category: place.primary_category.clone(),
            },
        })
    }

    /// Content length in characters.
    pub fn content_chars(&self) -> usize {
        self.content.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_name_is_rejected() {
        let result: std::result::Result<PlaceRecord, _> =
            serde_json::from_str(r#"{"google_place_id": "p1", "city": "Tampa"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_database_shape_deserializes() {
        let place: PlaceRecord = serde_json::from_str(
            r#"{"google_place_id": "p1", "name": "Zoo", "llm_tags": ["family"],
                "llm_description": "A zoo.", "rating": 0, "unknown_column": 7}"#,
        )
        .unwrap();
        assert_eq!(place.llm_tags, Some(vec!["family".to_string()]));
        assert_eq!(place.rating, Some(0.0));
    }

    #[test]
    fn test_document_requires_place_id() {
        let place = PlaceRecord::named("Nowhere");
        assert!(matches!(
            GeneratedDocument::from_place(&place),
            Err(TravelRagError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_metadata_shape_is_fixed() {
        let place = PlaceRecord {
            google_place_id: Some("p9".to_string()),
            llm_description: Some("Not in metadata".to_string()),
            ..PlaceRecord::named("Museum")
        };
        let doc = GeneratedDocument::from_place(&place).unwrap();
        let json = serde_json::to_value(&doc).unwrap();

        let keys: Vec<&str> = json["metadata"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys.len(), 9);
        assert!(json["metadata"]["rating"].is_null());
        assert!(json["metadata"].get("llm_description").is_none());
        assert_eq!(json["doc_id"], "p9");
    }

    #[test]
    fn test_content_chars_counts_characters() {
        let place = PlaceRecord {
            google_place_id: Some("p1".to_string()),
            ..PlaceRecord::named("Café")
        };
        let doc = GeneratedDocument::from_place(&place).unwrap();
        assert_eq!(doc.content_chars(), doc.content.chars().count());
        assert!(doc.content_chars() < doc.content.len());
    }
}
