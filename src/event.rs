//! S3 "object created" notifications as delivered to the Lambda.

use percent_encoding::percent_decode_str;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct S3Event {
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3EventRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Object {
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}

impl S3Event {
    /// Every record in the batch, keys decoded. Each one is processed as its own run.
    pub fn objects(&self) -> Vec<ObjectRef> {
        self.records
            .iter()
            .map(|record| ObjectRef {
                bucket: record.s3.bucket.name.clone(),
                key: decode_key(&record.s3.object.key),
            })
            .collect()
    }
}

/// Keys arrive form-encoded: `+` for spaces, `%XX` for everything else.
/// Invalid UTF-8 after decoding falls back to the raw key.
pub fn decode_key(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match percent_decode_str(&spaced).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_key() {
        assert_eq!(decode_key("input/customer+ids.json"), "input/customer ids.json");
        assert_eq!(decode_key("input/ids%282024%29.json"), "input/ids(2024).json");
        assert_eq!(decode_key("plain.json"), "plain.json");
        assert_eq!(decode_key("a="), "a=");
        assert_eq!(decode_key("q%3Da%26b=c"), "q=a&b=c");
        assert_eq!(decode_key("100%25+done%2B.json"), "100% done+.json");
    }

    #[test]
    fn test_every_record_is_kept() {
        let event: S3Event = serde_json::from_value(serde_json::json!({
            "Records": [
                {"s3": {"bucket": {"name": "drop"}, "object": {"key": "a+1.json"}}},
                {"s3": {"bucket": {"name": "drop"}, "object": {"key": "b.json", "size": 10}}}
            ]
        }))
        .unwrap();

        assert_eq!(
            event.objects(),
            vec![
                ObjectRef {
                    bucket: "drop".to_string(),
                    key: "a 1.json".to_string()
                },
                ObjectRef {
                    bucket: "drop".to_string(),
                    key: "b.json".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_event_without_records() {
        let event: S3Event = serde_json::from_str("{}").unwrap();
        assert!(event.objects().is_empty());
    }
}
