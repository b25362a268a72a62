use std::sync::Arc;

use serde::Serialize;

use super::fields::Field;
use super::record::FormRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartBody {
    Text(String),
    File {
        file_name: String,
        content_type: String,
        bytes: Arc<[u8]>,
    },
}

/// One named multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub name: &'static str,
    pub body: PartBody,
}

impl Part {
    pub fn size(&self) -> usize {
        match &self.body {
            PartBody::Text(value) => value.len(),
            PartBody::File { bytes, .. } => bytes.len(),
        }
    }
}

/// Printable description of a part; file contents are never included.
#[derive(Debug, Clone, Serialize)]
pub struct PartSummary {
    pub name: &'static str,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub size: usize,
}

/// Snapshot of a record ready to be sent. Owns its data, so later edits to
/// the record do not affect a payload already built.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MultipartPayload {
    parts: Vec<Part>,
}

impl MultipartPayload {
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Part> {
        self.parts.iter().find(|part| part.name == name)
    }

    /// Value of a text part, `None` if absent or binary.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name).map(|part| &part.body) {
            Some(PartBody::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn total_size(&self) -> usize {
        self.parts.iter().map(Part::size).sum()
    }

    pub fn summary(&self) -> Vec<PartSummary> {
        self.parts
            .iter()
            .map(|part| match &part.body {
                PartBody::Text(value) => PartSummary {
                    name: part.name,
                    kind: "text",
                    value: Some(value.clone()),
                    file_name: None,
                    size: value.len(),
                },
                PartBody::File { file_name, bytes, .. } => PartSummary {
                    name: part.name,
                    kind: "file",
                    value: None,
                    file_name: Some(file_name.clone()),
                    size: bytes.len(),
                },
            })
            .collect()
    }
}

/// Serialize every field of the record into its own part. The photo becomes
/// a file part when present and an empty text part otherwise, so the
/// receiver always sees every field name.
pub fn build_payload(record: &FormRecord) -> MultipartPayload {
    let parts = Field::ALL
        .iter()
        .map(|&field| {
            let body = match (field, &record.identification_photo) {
                (Field::IdentificationPhoto, Some(photo)) => PartBody::File {
                    file_name: photo.file_name.clone(),
                    content_type: photo.content_type.clone(),
                    bytes: photo.bytes.clone(),
                },
                _ => PartBody::Text(record.text_value(field)),
            };
            Part {
                name: field.as_str(),
                body,
            }
        })
        .collect();

    MultipartPayload { parts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fields::{ExerciseFrequency, IdentificationMode};
    use crate::core::record::IdentificationPhoto;

    #[test]
    fn test_every_field_has_a_part() {
        let payload = build_payload(&FormRecord::new());
        assert_eq!(payload.len(), Field::ALL.len());
        for field in Field::ALL {
            assert!(payload.get(field.as_str()).is_some(), "{field}");
        }
    }

    #[test]
    fn test_empty_record_serializes_to_empty_strings() {
        let payload = build_payload(&FormRecord::new());
        assert_eq!(payload.text("age"), Some(""));
        assert_eq!(payload.text("identificationPhoto"), Some(""));
        assert_eq!(payload.text("consentGiven"), Some("false"));
    }

    #[test]
    fn test_scalars_and_photo() {
        let mut record = FormRecord::new();
        record.name = "Ana Gómez".to_string();
        record.exercise_frequency = Some(ExerciseFrequency::OneToTwo);
        record.identification_mode = Some(IdentificationMode::Photo);
        record.identification_photo = Some(IdentificationPhoto::new("id.jpg", "image/jpeg", vec![0xff, 0xd8, 0xff]));
        record.consent_given = true;

        let payload = build_payload(&record);
        assert_eq!(payload.text("name"), Some("Ana Gómez"));
        assert_eq!(payload.text("exerciseFrequency"), Some("1-2 veces"));
        assert_eq!(payload.text("identificationMode"), Some("photo"));
        assert_eq!(payload.text("consentGiven"), Some("true"));

        match &payload.get("identificationPhoto").unwrap().body {
            PartBody::File { file_name, content_type, bytes } => {
                assert_eq!(file_name, "id.jpg");
                assert_eq!(content_type, "image/jpeg");
                assert_eq!(&bytes[..], &[0xff, 0xd8, 0xff]);
            }
            other => panic!("expected file part, got {:?}", other),
        }
        assert_eq!(payload.text("identificationPhoto"), None);
    }

    #[test]
    fn test_payload_is_a_snapshot() {
        let mut record = FormRecord::new();
        record.hobby = "Ajedrez".to_string();
        let payload = build_payload(&record);
        record.hobby = "Fútbol".to_string();
        assert_eq!(payload.text("hobby"), Some("Ajedrez"));
    }

    #[test]
    fn test_summary_omits_file_contents() {
        let mut record = FormRecord::new();
        record.identification_photo = Some(IdentificationPhoto::new("id.png", "image/png", vec![7; 10]));
        let payload = build_payload(&record);
        let summary = payload.summary();
        let photo = summary.iter().find(|s| s.name == "identificationPhoto").unwrap();
        assert_eq!(photo.kind, "file");
        assert_eq!(photo.size, 10);
        assert!(photo.value.is_none());

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"file_name\":\"id.png\""));
        assert_eq!(payload.total_size(), 10 + "false".len());
    }
}
