use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;

use super::fields::{ExerciseFrequency, Field, Gender, IdentificationMode, Mood, SleepQuality};

/// Accented letters accepted next to ASCII letters in name-like fields.
const ACCENTED_LETTERS: &str = "ÁÉÍÓÚáéíóúÑñ";

/// True when every character is an ASCII letter, an accented Latin vowel,
/// `ñ`/`Ñ` or a space. The empty string passes.
pub fn is_letters_and_spaces(value: &str) -> bool {
    value
        .chars()
        .all(|c| c.is_ascii_alphabetic() || c == ' ' || ACCENTED_LETTERS.contains(c))
}

/// Image selected as identification artifact.
#[derive(Clone, PartialEq, Eq)]
pub struct IdentificationPhoto {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Arc<[u8]>,
}

impl IdentificationPhoto {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: Arc::from(bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for IdentificationPhoto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentificationPhoto")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Current values of one in-progress survey.
///
/// Fields with an invariant are only readable from outside the crate:
/// `name`, `company` and `role` pass the letters filter on every edit, and
/// `birth_date` and `age` change together so the derived age never drifts
/// from the birth date.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormRecord {
    pub(crate) name: String,
    pub email: String,
    pub(crate) company: String,
    pub(crate) role: String,
    birth_date: Option<NaiveDate>,
    age: Option<i32>,
    pub gender: Option<Gender>,
    pub mood_today: Option<Mood>,
    pub energy_level: Option<i64>,
    pub sleep_quality: Option<SleepQuality>,
    pub sleep_hours: Option<i64>,
    pub exercise_frequency: Option<ExerciseFrequency>,
    pub hobby: String,
    pub identification_mode: Option<IdentificationMode>,
    pub identification_text: String,
    pub identification_photo: Option<IdentificationPhoto>,
    pub consent_given: bool,
}

impl FormRecord {
    /// The empty record every survey starts from.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn birth_date(&self) -> Option<NaiveDate> {
        self.birth_date
    }

    pub fn age(&self) -> Option<i32> {
        self.age
    }

    pub(crate) fn set_birth_date_and_age(&mut self, birth_date: Option<NaiveDate>, age: Option<i32>) {
        self.birth_date = birth_date;
        self.age = age;
    }

    /// Textual form of a field as shown to the user and sent on the wire.
    /// Unset values render as the empty string; the photo renders as its
    /// file name.
    pub fn text_value(&self, field: Field) -> String {
        fn opt<T: ToString>(value: &Option<T>) -> String {
            value.as_ref().map(ToString::to_string).unwrap_or_default()
        }

        match field {
            Field::Name => self.name.clone(),
            Field::Email => self.email.clone(),
            Field::Company => self.company.clone(),
            Field::Role => self.role.clone(),
            Field::BirthDate => self
                .birth_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            Field::Age => opt(&self.age),
            Field::Gender => opt(&self.gender),
            Field::MoodToday => opt(&self.mood_today),
            Field::EnergyLevel => opt(&self.energy_level),
            Field::SleepQuality => opt(&self.sleep_quality),
            Field::SleepHours => opt(&self.sleep_hours),
            Field::ExerciseFrequency => opt(&self.exercise_frequency),
            Field::Hobby => self.hobby.clone(),
            Field::IdentificationMode => opt(&self.identification_mode),
            Field::IdentificationText => self.identification_text.clone(),
            Field::IdentificationPhoto => self
                .identification_photo
                .as_ref()
                .map(|p| p.file_name.clone())
                .unwrap_or_default(),
            Field::ConsentGiven => self.consent_given.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_filter_accepts_spanish_names() {
        assert!(is_letters_and_spaces("José Peña"));
        assert!(is_letters_and_spaces("ÁNGELA MARÍA"));
        assert!(is_letters_and_spaces(""));
        assert!(is_letters_and_spaces("   "));
    }

    #[test]
    fn test_letters_filter_rejects_other_characters() {
        for value in ["Ana1", "R&D", "Juan-Pablo", "O'Neil", "ana@corp", "tab\there", "Zoë", "Ç"] {
            assert!(!is_letters_and_spaces(value), "{value} should be rejected");
        }
    }

    #[test]
    fn test_new_record_is_empty() {
        let record = FormRecord::new();
        for field in Field::ALL {
            let expected = if field == Field::ConsentGiven { "false" } else { "" };
            assert_eq!(record.text_value(field), expected, "{field}");
        }
        assert!(record.birth_date().is_none());
        assert!(record.age().is_none());
    }

    #[test]
    fn test_text_value_formats_typed_fields() {
        let mut record = FormRecord::new();
        record.set_birth_date_and_age(NaiveDate::from_ymd_opt(1990, 5, 10), Some(35));
        record.gender = Some(Gender::PreferNotToSay);
        record.energy_level = Some(7);
        record.identification_mode = Some(IdentificationMode::Text);
        record.consent_given = true;

        assert_eq!(record.text_value(Field::BirthDate), "1990-05-10");
        assert_eq!(record.text_value(Field::Age), "35");
        assert_eq!(record.text_value(Field::Gender), "No decir");
        assert_eq!(record.text_value(Field::EnergyLevel), "7");
        assert_eq!(record.text_value(Field::IdentificationMode), "text");
        assert_eq!(record.text_value(Field::ConsentGiven), "true");
    }

    #[test]
    fn test_letters_only_fields_have_accessors() {
        let mut record = FormRecord::new();
        record.name = "Ana".to_string();
        record.company = "Bienestar".to_string();
        record.role = "Líder".to_string();
        assert_eq!(record.name(), "Ana");
        assert_eq!(record.company(), "Bienestar");
        assert_eq!(record.role(), "Líder");
    }

    #[test]
    fn test_photo_debug_hides_bytes() {
        let photo = IdentificationPhoto::new("me.png", "image/png", vec![1, 2, 3]);
        let debug = format!("{:?}", photo);
        assert!(debug.contains("len: 3"));
        assert_eq!(photo.len(), 3);
    }
}
