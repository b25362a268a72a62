use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde_json::{Map, Value};

use crate::core::{Edit, Field, FormEngine, FormRecord, IdentificationPhoto, RawValue};

/// An answer the engine did not take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredAnswer {
    pub key: String,
    pub reason: String,
}

/// Survey answers keyed by field name, as read from a JSON file.
#[derive(Debug, Clone, Default)]
pub struct AnswerSheet {
    values: Map<String, Value>,
}

impl AnswerSheet {
    pub fn from_json(json: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(json).context("Failed to parse answers")? {
            Value::Object(values) => Ok(Self { values }),
            _ => Err(anyhow!("Answers must be a JSON object keyed by field name")),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read answers file {}", path.display()))?;
        Self::from_json(&json)
    }

    /// Empty answers for every field a user fills in directly.
    pub fn template() -> Value {
        let record = FormRecord::new();
        let values = Field::ALL
            .iter()
            .filter(|field| !matches!(field, Field::Age | Field::IdentificationPhoto))
            .map(|&field| {
                let value = match field {
                    Field::ConsentGiven => Value::Bool(record.consent_given),
                    _ => Value::String(record.text_value(field)),
                };
                (field.as_str().to_string(), value)
            })
            .collect();
        Value::Object(values)
    }

    /// Feed every answer through the engine in field order, the same way
    /// keystrokes would arrive. Returns the answers that were dropped.
    pub fn apply(&self, engine: &mut FormEngine) -> Vec<IgnoredAnswer> {
        let mut ignored = Vec::new();

        for key in self.values.keys() {
            if key.parse::<Field>().is_err() {
                ignored.push(IgnoredAnswer {
                    key: key.clone(),
                    reason: "unknown field".to_string(),
                });
            }
        }

        for field in Field::ALL {
            let Some(value) = self.values.get(field.as_str()) else {
                continue;
            };
            let raw = match value {
                Value::Bool(checked) => RawValue::Checked(*checked),
                Value::String(text) => RawValue::Text(text.clone()),
                Value::Number(number) => RawValue::Text(number.to_string()),
                Value::Null => RawValue::Text(String::new()),
                Value::Array(_) | Value::Object(_) => {
                    ignored.push(IgnoredAnswer {
                        key: field.as_str().to_string(),
                        reason: "expected a string, number or boolean".to_string(),
                    });
                    continue;
                }
            };
            if let Edit::Ignored(rejected) = engine.set_field(field, raw) {
                ignored.push(IgnoredAnswer {
                    key: field.as_str().to_string(),
                    reason: rejected.to_string(),
                });
            }
        }

        ignored
    }
}

/// Content type guessed from the file extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

/// Read an image from disk as the identification photo.
pub fn load_photo(path: &Path) -> Result<IdentificationPhoto> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read photo {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("photo")
        .to_string();
    Ok(IdentificationPhoto::new(file_name, content_type_for(path), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FixedClock, Gender, IdentificationMode};
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn engine() -> FormEngine {
        FormEngine::with_clock(FixedClock(NaiveDate::from_ymd_opt(2025, 1, 20).unwrap()))
    }

    #[test]
    fn test_template_lists_editable_fields() {
        let template = AnswerSheet::template();
        let object = template.as_object().unwrap();
        assert_eq!(object.len(), Field::ALL.len() - 2);
        assert!(!object.contains_key("age"));
        assert!(!object.contains_key("identificationPhoto"));
        assert_eq!(object["consentGiven"], Value::Bool(false));
        assert_eq!(object["name"], Value::String(String::new()));
    }

    #[test]
    fn test_template_round_trips_into_an_empty_record() {
        let sheet = AnswerSheet::from_json(&AnswerSheet::template().to_string()).unwrap();
        let mut engine = engine();
        assert!(sheet.apply(&mut engine).is_empty());
        assert_eq!(engine.record(), &FormRecord::new());
    }

    #[test]
    fn test_apply_sets_fields_and_reports_ignored() {
        let sheet = AnswerSheet::from_json(
            r#"{
                "name": "Carlos Mahecha",
                "company": "Sistemas 2",
                "gender": "Hombre",
                "birthDate": "1988-09-01",
                "energyLevel": 6,
                "identificationMode": "text",
                "identificationText": "CC 1020",
                "consentGiven": true,
                "age": 99,
                "favouriteColour": "azul"
            }"#,
        )
        .unwrap();

        let mut engine = engine();
        let ignored = sheet.apply(&mut engine);
        let keys: Vec<&str> = ignored.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["favouriteColour", "company", "age"]);

        let record = engine.record();
        assert_eq!(record.name(), "Carlos Mahecha");
        assert_eq!(record.company(), "");
        assert_eq!(record.gender, Some(Gender::Man));
        assert_eq!(record.age(), Some(37));
        assert_eq!(record.energy_level, Some(6));
        assert_eq!(record.identification_mode, Some(IdentificationMode::Text));
        assert!(record.consent_given);
    }

    #[test]
    fn test_non_object_answers_rejected() {
        assert!(AnswerSheet::from_json("[1, 2]").is_err());
        assert!(AnswerSheet::from_json("not json").is_err());
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for(&PathBuf::from("a/b/ID.JPG")), "image/jpeg");
        assert_eq!(content_type_for(&PathBuf::from("selfie.png")), "image/png");
        assert_eq!(content_type_for(&PathBuf::from("scan")), "application/octet-stream");
    }

    #[test]
    fn test_load_photo() {
        let path = std::env::temp_dir().join(format!("sentia-photo-{}.webp", uuid::Uuid::new_v4()));
        std::fs::write(&path, [1u8, 2, 3, 4]).unwrap();

        let photo = load_photo(&path).unwrap();
        assert_eq!(photo.content_type, "image/webp");
        assert_eq!(photo.len(), 4);
        assert!(photo.file_name.ends_with(".webp"));

        std::fs::remove_file(path).ok();
        assert!(load_photo(&PathBuf::from("/definitely/missing.png")).is_err());
    }
}
