use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::clock::{age_in_years, Clock, SystemClock};
use super::error::{InputRejected, SubmitError, TransportError, ValidationError};
use super::fields::{Field, IdentificationMode};
use super::payload::{build_payload, MultipartPayload};
use super::preview::{Preview, PreviewHandle};
use super::record::{is_letters_and_spaces, FormRecord, IdentificationPhoto};
use crate::transport::{HttpStatus, Transport};

const ENERGY_RANGE: (u32, u32) = (1, 10);
const SLEEP_HOURS_RANGE: (u32, u32) = (1, 24);

/// Raw value coming from an input control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Text(String),
    Checked(bool),
}

impl RawValue {
    fn into_text(self) -> String {
        match self {
            RawValue::Text(value) => value,
            RawValue::Checked(checked) => checked.to_string(),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<bool> for RawValue {
    fn from(checked: bool) -> Self {
        RawValue::Checked(checked)
    }
}

/// Result of an edit. `Ignored` edits leave the record untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Applied,
    Ignored(InputRejected),
}

impl Edit {
    pub fn is_applied(&self) -> bool {
        matches!(self, Edit::Applied)
    }
}

/// Terminal result of a submit, each with the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(HttpStatus),
    Invalid(ValidationError),
    ServerRejected(HttpStatus),
    ConnectionFailed(TransportError),
    AlreadyInFlight,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn message(&self) -> String {
        match self {
            Outcome::Success(_) => "Formulario enviado correctamente.".to_string(),
            Outcome::Invalid(error) => error.to_string(),
            Outcome::ServerRejected(_) => "Error al enviar los datos.".to_string(),
            Outcome::ConnectionFailed(_) => "Error de conexión con el servidor.".to_string(),
            Outcome::AlreadyInFlight => SubmitError::AlreadyInFlight.to_string(),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl From<SubmitError> for Outcome {
    fn from(error: SubmitError) -> Self {
        match error {
            SubmitError::AlreadyInFlight => Outcome::AlreadyInFlight,
            SubmitError::Invalid(error) => Outcome::Invalid(error),
        }
    }
}

/// Ticket of the submission currently in flight, 0 when idle.
type InFlight = Arc<AtomicU64>;

/// Lowers the in-flight flag when dropped, unless the engine has since moved
/// on to another submission.
#[derive(Debug)]
struct InFlightGuard {
    slot: InFlight,
    ticket: u64,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let _ = self
            .slot
            .compare_exchange(self.ticket, 0, Ordering::SeqCst, Ordering::SeqCst);
    }
}

/// A payload snapshot taken by [`FormEngine::begin_submit`]. Hand it back to
/// [`FormEngine::finish_submit`] once the transport has answered. The engine
/// refuses new submissions while it is alive; dropping it unfinished (for
/// example when the `submit` future is cancelled) unlocks the engine and
/// leaves the record as it is.
#[must_use = "dropping a submission abandons it"]
#[derive(Debug)]
pub struct Submission {
    payload: MultipartPayload,
    _guard: InFlightGuard,
}

impl Submission {
    pub fn payload(&self) -> &MultipartPayload {
        &self.payload
    }
}

/// Checks run before any network call, stopping at the first failure.
///
/// The identification slot and consent checks always run first and in this
/// order. With `enforce_required_fields` the remaining required fields and
/// numeric ranges are checked afterwards.
pub fn validate_for_submit(record: &FormRecord, enforce_required_fields: bool) -> Result<(), ValidationError> {
    match record.identification_mode {
        Some(IdentificationMode::Photo) if record.identification_photo.is_none() => {
            return Err(ValidationError::MissingIdentificationPhoto);
        }
        Some(IdentificationMode::Text) if record.identification_text.trim().is_empty() => {
            return Err(ValidationError::MissingIdentificationText);
        }
        _ => {}
    }

    if !record.consent_given {
        return Err(ValidationError::ConsentNotGiven);
    }

    if !enforce_required_fields {
        return Ok(());
    }

    let required_text = [
        (Field::Name, &record.name),
        (Field::Company, &record.company),
        (Field::Email, &record.email),
        (Field::Role, &record.role),
    ];
    if let Some((field, _)) = required_text.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(ValidationError::MissingField(*field));
    }
    if record.birth_date().is_none() {
        return Err(ValidationError::MissingField(Field::BirthDate));
    }
    if record.exercise_frequency.is_none() {
        return Err(ValidationError::MissingField(Field::ExerciseFrequency));
    }
    if record.identification_mode.is_none() {
        return Err(ValidationError::MissingField(Field::IdentificationMode));
    }

    check_range(Field::EnergyLevel, record.energy_level, ENERGY_RANGE)?;
    check_range(Field::SleepHours, record.sleep_hours, SLEEP_HOURS_RANGE)?;

    Ok(())
}

fn check_range(field: Field, value: Option<i64>, (min, max): (u32, u32)) -> Result<(), ValidationError> {
    match value {
        Some(v) if v < i64::from(min) || v > i64::from(max) => Err(ValidationError::OutOfRange { field, min, max, value: v }),
        _ => Ok(()),
    }
}

fn parse_choice<T: FromStr>(field: Field, raw: &str) -> Result<Option<T>, InputRejected> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<T>().map(Some).map_err(|_| InputRejected::UnknownChoice {
        field,
        value: raw.to_string(),
    })
}

/// Anything that is not a whole number reads as empty, like a number input.
fn parse_number(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

fn parse_checked(raw: RawValue) -> Result<bool, InputRejected> {
    match raw {
        RawValue::Checked(checked) => Ok(checked),
        RawValue::Text(text) => match text.trim() {
            "true" | "on" => Ok(true),
            "false" | "" => Ok(false),
            _ => Err(InputRejected::NotABoolean(Field::ConsentGiven)),
        },
    }
}

/// Owns the survey record and every transition on it.
pub struct FormEngine {
    record: FormRecord,
    preview: Option<Preview>,
    clock: Box<dyn Clock>,
    enforce_required_fields: bool,
    in_flight: InFlight,
    next_ticket: u64,
}

impl Default for FormEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FormEngine {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            record: FormRecord::new(),
            preview: None,
            clock: Box::new(clock),
            enforce_required_fields: true,
            in_flight: Arc::new(AtomicU64::new(0)),
            next_ticket: 0,
        }
    }

    pub fn enforce_required_fields(mut self, enforce: bool) -> Self {
        self.enforce_required_fields = enforce;
        self
    }

    pub fn record(&self) -> &FormRecord {
        &self.record
    }

    pub fn preview(&self) -> Option<PreviewHandle> {
        self.preview.as_ref().map(Preview::handle)
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) != 0
    }

    /// Apply one edit from an input control.
    pub fn set_field(&mut self, field: Field, raw: impl Into<RawValue>) -> Edit {
        let raw = raw.into();
        let result = match field {
            Field::BirthDate => return self.set_birth_date(&raw.into_text()),
            Field::Age => Err(InputRejected::ReadOnly(field)),
            Field::IdentificationPhoto => Err(InputRejected::NeedsFile(field)),
            Field::ConsentGiven => parse_checked(raw).map(|checked| self.record.consent_given = checked),
            _ => self.set_text_field(field, raw.into_text()),
        };

        match result {
            Ok(()) => Edit::Applied,
            Err(rejected) => {
                debug!(field = %field, reason = %rejected, "edit ignored");
                Edit::Ignored(rejected)
            }
        }
    }

    fn set_text_field(&mut self, field: Field, value: String) -> Result<(), InputRejected> {
        if field.is_letters_only() && !is_letters_and_spaces(&value) {
            return Err(InputRejected::NotLetters(field));
        }

        let record = &mut self.record;
        match field {
            Field::Name => record.name = value,
            Field::Company => record.company = value,
            Field::Role => record.role = value,
            Field::Email => record.email = value,
            Field::Hobby => record.hobby = value,
            Field::IdentificationText => record.identification_text = value,
            Field::Gender => record.gender = parse_choice(field, &value)?,
            Field::MoodToday => record.mood_today = parse_choice(field, &value)?,
            Field::SleepQuality => record.sleep_quality = parse_choice(field, &value)?,
            Field::ExerciseFrequency => record.exercise_frequency = parse_choice(field, &value)?,
            Field::IdentificationMode => record.identification_mode = parse_choice(field, &value)?,
            Field::EnergyLevel => record.energy_level = parse_number(&value),
            Field::SleepHours => record.sleep_hours = parse_number(&value),
            Field::BirthDate | Field::Age | Field::IdentificationPhoto | Field::ConsentGiven => {
                unreachable!("{field} is handled by set_field")
            }
        }
        Ok(())
    }

    /// Set the birth date (`YYYY-MM-DD`) and recompute the age from the
    /// current year. An empty value clears both.
    pub fn set_birth_date(&mut self, value: &str) -> Edit {
        let value = value.trim();
        if value.is_empty() {
            self.record.set_birth_date_and_age(None, None);
            return Edit::Applied;
        }

        match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            Ok(birth_date) => {
                let age = age_in_years(birth_date, self.clock.today());
                self.record.set_birth_date_and_age(Some(birth_date), Some(age));
                Edit::Applied
            }
            Err(_) => {
                let rejected = InputRejected::InvalidDate(Field::BirthDate);
                debug!(field = %Field::BirthDate, reason = %rejected, "edit ignored");
                Edit::Ignored(rejected)
            }
        }
    }

    /// Store the selected photo and replace the preview. The previous
    /// preview, if any, is released here.
    pub fn set_photo(&mut self, photo: IdentificationPhoto) -> PreviewHandle {
        let preview = Preview::new(&photo.content_type, photo.bytes.clone());
        let handle = preview.handle();
        debug!(bytes = photo.len(), "identification photo selected");
        self.record.identification_photo = Some(photo);
        self.preview = Some(preview);
        handle
    }

    /// Back to the empty record, releasing the preview and abandoning any
    /// submission still in flight.
    pub fn reset(&mut self) {
        self.record = FormRecord::new();
        self.preview = None;
        self.in_flight.store(0, Ordering::SeqCst);
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_for_submit(&self.record, self.enforce_required_fields)
    }

    pub fn build_payload(&self) -> MultipartPayload {
        build_payload(&self.record)
    }

    /// Validate and snapshot the record. Edits made after this call do not
    /// reach the returned payload.
    pub fn begin_submit(&mut self) -> Result<Submission, SubmitError> {
        if self.is_submitting() {
            warn!("submit ignored: another submission is in flight");
            return Err(SubmitError::AlreadyInFlight);
        }

        if let Err(error) = self.validate() {
            warn!(error = ?error, "submit blocked by validation");
            return Err(error.into());
        }

        let payload = self.build_payload();
        info!(parts = payload.len(), bytes = payload.total_size(), "submitting form");
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.in_flight.store(ticket, Ordering::SeqCst);
        Ok(Submission {
            payload,
            _guard: InFlightGuard {
                slot: Arc::clone(&self.in_flight),
                ticket,
            },
        })
    }

    /// Interpret the transport result. Success resets the record and
    /// releases the preview; any failure leaves the record as it is.
    pub fn finish_submit(&mut self, submission: Submission, result: Result<HttpStatus, TransportError>) -> Outcome {
        drop(submission);

        match result {
            Ok(status) if status.is_success() => {
                info!(%status, "form accepted");
                self.reset();
                Outcome::Success(status)
            }
            Ok(status) => {
                warn!(%status, "form rejected by server");
                Outcome::ServerRejected(status)
            }
            Err(error) => {
                warn!(%error, "form submission failed to connect");
                Outcome::ConnectionFailed(error)
            }
        }
    }

    /// The whole transaction: validate, snapshot, send, then reset or keep.
    pub async fn submit<T: Transport>(&mut self, transport: &T) -> Outcome {
        let submission = match self.begin_submit() {
            Ok(submission) => submission,
            Err(error) => return error.into(),
        };
        let result = transport.send(submission.payload()).await;
        self.finish_submit(submission, result)
    }
}
