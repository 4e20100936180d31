use meetbook_common::{config_error, external_service_error, MeetbookError};
use thiserror::Error;

pub(crate) const SERVICE_NAME: &str = "google_calendar";

#[derive(Error, Debug)]
pub enum GcalError {
    #[error("Missing key_path in GcalConfig")]
    MissingKeyPath,
    #[error("Failed to read service account key: {0}")]
    ServiceAccountKey(std::io::Error),
    #[error("Failed to build service account authenticator: {0}")]
    Authenticator(std::io::Error),
    #[error("Failed to load TLS roots: {0}")]
    Tls(std::io::Error),
    #[error("Google API Error: {0}")]
    Api(#[from] google_calendar3::Error),
    #[error("Calendar {calendar_id} reported errors: {message}")]
    Calendar { calendar_id: String, message: String },
    #[error("Created event carries no id")]
    MissingEventId,
    #[error("No Google credentials available for calendar {0}")]
    NoCredentials(String),
}

impl From<GcalError> for MeetbookError {
    fn from(err: GcalError) -> Self {
        match err {
            GcalError::MissingKeyPath
            | GcalError::ServiceAccountKey(_)
            | GcalError::Authenticator(_)
            | GcalError::Tls(_) => config_error(err),
            GcalError::NoCredentials(_) => MeetbookError::AuthError(err.to_string()),
            other => external_service_error(SERVICE_NAME, other),
        }
    }
}
