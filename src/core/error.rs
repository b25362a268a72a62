use thiserror::Error;

use super::fields::Field;

/// Blocking pre-submit failure. The record is left untouched and no network
/// call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Debes tomar o subir una foto.")]
    MissingIdentificationPhoto,

    #[error("Debes escribir el texto de identificación.")]
    MissingIdentificationText,

    #[error("Debes aceptar la autorización.")]
    ConsentNotGiven,

    #[error("El campo {0} es obligatorio.")]
    MissingField(Field),

    #[error("El campo {field} está fuera de rango.")]
    OutOfRange {
        field: Field,
        min: u32,
        max: u32,
        value: i64,
    },
}

/// An edit the engine dropped. Never shown to the user; the record simply
/// keeps its previous value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputRejected {
    #[error("{0} only accepts letters and spaces")]
    NotLetters(Field),

    #[error("{field} does not accept {value:?}")]
    UnknownChoice { field: Field, value: String },

    #[error("{0} expects a YYYY-MM-DD date")]
    InvalidDate(Field),

    #[error("{0} expects a checked state")]
    NotABoolean(Field),

    #[error("{0} is derived and cannot be edited")]
    ReadOnly(Field),

    #[error("{0} is set through a file selection")]
    NeedsFile(Field),
}

/// Transport-level failure: the request never produced an HTTP status.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Could not build request: {0}")]
    Request(String),
}

/// Why a submission could not start.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Ya hay un envío en curso.")]
    AlreadyInFlight,

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}
