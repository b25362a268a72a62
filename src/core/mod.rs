pub mod clock;
pub mod engine;
pub mod error;
pub mod fields;
pub mod payload;
pub mod preview;
pub mod record;

pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{validate_for_submit, Edit, FormEngine, Outcome, RawValue, Submission};
pub use error::{InputRejected, SubmitError, TransportError, ValidationError};
pub use fields::{ExerciseFrequency, Field, Gender, IdentificationMode, Mood, SleepQuality};
pub use payload::{build_payload, MultipartPayload, Part, PartBody};
pub use preview::{Preview, PreviewHandle};
pub use record::{FormRecord, IdentificationPhoto};
