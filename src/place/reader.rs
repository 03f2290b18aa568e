//! Source readers: JSON arrays and JSONL streams.

use crate::error::{Result, TravelRagError};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines, Read};
use std::marker::PhantomData;
use std::path::Path;

/// Records of a top-level JSON array, decoded one element at a time.
pub struct JsonArray<T> {
    items: std::vec::IntoIter<Value>,
    index: usize,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonArray<T> {
    /// Parse a JSON document that must be a top-level array.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let value: Value = serde_json::from_reader(reader)?;
        match value {
            Value::Array(items) => Ok(Self {
                len: items.len(),
                items: items.into_iter(),
                index: 0,
                _marker: PhantomData,
            }),
            _ => Err(TravelRagError::MalformedInput(
                "Input JSON must be an array of place objects".to_string(),
            )),
        }
    }

    /// Number of elements in the array.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T: DeserializeOwned> Iterator for JsonArray<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.items.next()?;
        let index = self.index;
        self.index += 1;
        Some(serde_json::from_value(value).map_err(|e| {
            TravelRagError::MalformedInput(format!("record {}: {}", index, e))
        }))
    }
}

/// Open a JSON array file.
pub fn read_json_array<T: DeserializeOwned>(path: &Path) -> Result<JsonArray<T>> {
    let file = File::open(path)?;
    JsonArray::from_reader(BufReader::new(file))
}

/// Line-by-line JSONL decoder.
///
/// Blank lines are skipped. With a cap, reading stops after that many
/// records without touching the rest of the stream.
pub struct JsonlReader<R, T> {
    lines: Lines<R>,
    line_no: usize,
    remaining: Option<usize>,
    _marker: PhantomData<T>,
}

impl<R: BufRead, T: DeserializeOwned> JsonlReader<R, T> {
    /// Create a reader. `limit` of `None` or `Some(0)` reads everything.
    pub fn new(reader: R, limit: Option<usize>) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            remaining: limit.filter(|&n| n > 0),
            _marker: PhantomData,
        }
    }
}

impl<R: BufRead, T: DeserializeOwned> Iterator for JsonlReader<R, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == Some(0) {
            return None;
        }

        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if let Some(remaining) = self.remaining.as_mut() {
                *remaining -= 1;
            }

            return Some(serde_json::from_str(trimmed).map_err(|e| {
                TravelRagError::MalformedInput(format!("line {}: {}", self.line_no, e))
            }));
        }
    }
}

/// Read a JSONL file into memory, failing on the first bad line.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path, limit: Option<usize>) -> Result<Vec<T>> {
    let file = File::open(path)?;
    JsonlReader::new(BufReader::new(file), limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::place::PlaceRecord;
    use std::io::Cursor;

    #[test]
    fn test_json_array_reader() {
        let input = r#"[{"google_place_id": "a", "name": "A"}, {"google_place_id": "b", "name": "B"}]"#;
        let reader: JsonArray<PlaceRecord> = JsonArray::from_reader(input.as_bytes()).unwrap();
        assert_eq!(reader.len(), 2);

        let names: Vec<String> = reader.map(|r| r.unwrap().name).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_non_array_is_malformed() {
        let result = JsonArray::<PlaceRecord>::from_reader(r#"{"name": "A"}"#.as_bytes());
        match result {
            Err(TravelRagError::MalformedInput(msg)) => assert!(msg.contains("array")),
            _ => panic!("expected malformed input"),
        }
    }

    #[test]
    fn test_bad_element_names_its_index() {
        let input = r#"[{"name": "A"}, {"city": "Tampa"}]"#;
        let mut reader = JsonArray::<PlaceRecord>::from_reader(input.as_bytes()).unwrap();
        assert!(reader.next().unwrap().is_ok());
        match reader.next().unwrap() {
            Err(TravelRagError::MalformedInput(msg)) => assert!(msg.starts_with("record 1")),
            other => panic!("unexpected: {:?}", other.map(|p| p.name)),
        }
    }

    #[test]
    fn test_jsonl_skips_blank_lines() {
        let input = "{\"content\": \"a\"}\n\n   \n{\"content\": \"b\"}\n";
        let docs: Vec<Value> = JsonlReader::new(Cursor::new(input), None)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1]["content"], "b");
    }

    #[test]
    fn test_jsonl_limit_stops_before_bad_lines() {
        let input = "{\"n\": 1}\n{\"n\": 2}\nnot json\n";
        let docs: Vec<Value> = JsonlReader::new(Cursor::new(input), Some(2))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn test_jsonl_zero_limit_reads_everything() {
        let input = "{\"n\": 1}\n{\"n\": 2}\n";
        let count = JsonlReader::<_, Value>::new(Cursor::new(input), Some(0)).count();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_jsonl_parse_error_is_fatal() {
        let input = "{\"n\": 1}\n{broken\n{\"n\": 3}\n";
        let result: Result<Vec<Value>> = JsonlReader::new(Cursor::new(input), None).collect();
        match result {
            Err(TravelRagError::MalformedInput(msg)) => assert!(msg.starts_with("line 2")),
            other => panic!("unexpected: {:?}", other.map(|v| v.len())),
        }
    }

    #[test]
    fn test_read_jsonl_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.jsonl");
        std::fs::write(&path, "{\"content\": \"x\"}\n{\"content\": \"y\"}\n").unwrap();

        let docs: Vec<Value> = read_jsonl(&path, Some(1)).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["content"], "x");
    }
}
