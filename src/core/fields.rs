use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;

/// Every field of the survey record, named the way it travels on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Name,
    Email,
    Company,
    Role,
    BirthDate,
    Age,
    Gender,
    MoodToday,
    EnergyLevel,
    SleepQuality,
    SleepHours,
    ExerciseFrequency,
    Hobby,
    IdentificationMode,
    IdentificationText,
    IdentificationPhoto,
    ConsentGiven,
}

impl Field {
    pub const ALL: [Field; 17] = [
        Field::Name,
        Field::Email,
        Field::Company,
        Field::Role,
        Field::BirthDate,
        Field::Age,
        Field::Gender,
        Field::MoodToday,
        Field::EnergyLevel,
        Field::SleepQuality,
        Field::SleepHours,
        Field::ExerciseFrequency,
        Field::Hobby,
        Field::IdentificationMode,
        Field::IdentificationText,
        Field::IdentificationPhoto,
        Field::ConsentGiven,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Company => "company",
            Field::Role => "role",
            Field::BirthDate => "birthDate",
            Field::Age => "age",
            Field::Gender => "gender",
            Field::MoodToday => "moodToday",
            Field::EnergyLevel => "energyLevel",
            Field::SleepQuality => "sleepQuality",
            Field::SleepHours => "sleepHours",
            Field::ExerciseFrequency => "exerciseFrequency",
            Field::Hobby => "hobby",
            Field::IdentificationMode => "identificationMode",
            Field::IdentificationText => "identificationText",
            Field::IdentificationPhoto => "identificationPhoto",
            Field::ConsentGiven => "consentGiven",
        }
    }

    /// Fields restricted to letters and spaces.
    pub fn is_letters_only(&self) -> bool {
        matches!(self, Field::Name | Field::Company | Field::Role)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| anyhow!("Unknown field: {}", s))
    }
}

/// Declares a closed vocabulary whose variants map one-to-one onto the
/// strings the intake service receives.
macro_rules! choice {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> anyhow::Result<Self> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    _ => Err(anyhow!("Unknown {}: {}", stringify!($name), s)),
                }
            }
        }
    };
}

choice!(Gender {
    Man => "Hombre",
    Woman => "Mujer",
    PreferNotToSay => "No decir",
});

choice!(Mood {
    Happy => "Feliz",
    Neutral => "Neutral",
    Tired => "Cansado",
    Stressed => "Estresado",
    Sad => "Triste",
    Motivated => "Motivado",
});

choice!(SleepQuality {
    Poor => "Mala",
    Fair => "Regular",
    Good => "Buena",
    VeryGood => "Muy buena",
});

choice!(ExerciseFrequency {
    Never => "No hago",
    OneToTwo => "1-2 veces",
    ThreeToFour => "3-4 veces",
    FivePlus => "5+ veces",
});

choice!(
    /// Decides which identification slot is required at submit time.
    IdentificationMode {
        Text => "text",
        Photo => "photo",
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_roundtrip_through_from_str() {
        for field in Field::ALL {
            assert_eq!(field.as_str().parse::<Field>().unwrap(), field);
        }
        assert!("nombre".parse::<Field>().is_err());
    }

    #[test]
    fn test_wire_names_start_lowercase() {
        for field in Field::ALL {
            assert!(field.as_str().chars().next().unwrap().is_ascii_lowercase());
        }
    }

    #[test]
    fn test_choice_vocabularies() {
        assert_eq!("No decir".parse::<Gender>().unwrap(), Gender::PreferNotToSay);
        assert_eq!(Mood::ALL.len(), 6);
        assert_eq!(SleepQuality::ALL.len(), 4);
        assert_eq!(ExerciseFrequency::ALL.len(), 4);
        assert_eq!(ExerciseFrequency::FivePlus.to_string(), "5+ veces");
        assert_eq!("photo".parse::<IdentificationMode>().unwrap(), IdentificationMode::Photo);
        assert!("foto".parse::<IdentificationMode>().is_err());
        assert!("feliz".parse::<Mood>().is_err());
    }

    #[test]
    fn test_letters_only_fields() {
        let letters: Vec<Field> = Field::ALL.into_iter().filter(|f| f.is_letters_only()).collect();
        assert_eq!(letters, vec![Field::Name, Field::Company, Field::Role]);
    }
}
