use serde::Deserialize;
use thiserror::Error;

use crate::storage::domain::object_store::ObjectRef;

#[derive(Error, Debug)]
pub enum EventError {
    #[error("event is not a storage notification: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("event contains no records")]
    NoRecords,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Notification {
    #[serde(default)]
    records: Vec<Record>,
}

#[derive(Deserialize)]
struct Record {
    s3: Entity,
}

#[derive(Deserialize)]
struct Entity {
    bucket: Named,
    object: Keyed,
}

#[derive(Deserialize)]
struct Named {
    name: String,
}

#[derive(Deserialize)]
struct Keyed {
    key: String,
}

/// Extracts the object referenced by the first record of a storage event.
///
/// Keys arrive form-encoded: `+` is a space and `%XX` escapes are decoded.
/// Escapes that do not form valid UTF-8 become U+FFFD.
pub fn parse_storage_event(json: &str) -> Result<ObjectRef, EventError> {
    let notification: Notification = serde_json::from_str(json)?;
    let record = notification
        .records
        .into_iter()
        .next()
        .ok_or(EventError::NoRecords)?;
    let key = decode_key(&record.s3.object.key);
    Ok(ObjectRef::new(record.s3.bucket.name, key))
}

fn decode_key(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    let bytes = urlencoding::decode_binary(spaced.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn event(bucket: &str, key: &str) -> String {
        format!(
            r#"{{"Records":[{{"eventName":"ObjectCreated:Put","s3":{{"bucket":{{"name":"{bucket}"}},"object":{{"key":"{key}","size":1024}}}}}}]}}"#
        )
    }

    #[rstest]
    #[case("snap.jpg", "snap.jpg")]
    #[case("front+door/2024-05-01+12%3A00.jpg", "front door/2024-05-01 12:00.jpg")]
    #[case("a%2Bb.jpg", "a+b.jpg")]
    fn test_key_is_form_decoded(#[case] raw: &str, #[case] expected: &str) {
        let object = parse_storage_event(&event("doorbell", raw)).unwrap();
        assert_eq!(object, ObjectRef::new("doorbell", expected));
    }

    #[test]
    fn test_only_first_record_is_used() {
        let json = r#"{"Records":[
            {"s3":{"bucket":{"name":"b1"},"object":{"key":"one.jpg"}}},
            {"s3":{"bucket":{"name":"b2"},"object":{"key":"two.jpg"}}}
        ]}"#;
        assert_eq!(
            parse_storage_event(json).unwrap(),
            ObjectRef::new("b1", "one.jpg")
        );
    }

    #[test]
    fn test_empty_records_rejected() {
        assert!(matches!(
            parse_storage_event(r#"{"Records":[]}"#),
            Err(EventError::NoRecords)
        ));
    }

    #[test]
    fn test_malformed_event_rejected() {
        assert!(matches!(
            parse_storage_event(r#"{"Records":[{"s3":{}}]}"#),
            Err(EventError::Malformed(_))
        ));
    }

    #[rstest]
    #[case("bad%FF.jpg", "bad\u{FFFD}.jpg")]
    #[case("caf%C3%A9+%E2.jpg", "café \u{FFFD}.jpg")]
    fn test_invalid_utf8_escape_is_replaced(#[case] raw: &str, #[case] expected: &str) {
        let object = parse_storage_event(&event("b", raw)).unwrap();
        assert_eq!(object.key, expected);
    }
}
