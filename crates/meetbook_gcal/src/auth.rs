// File: crates/meetbook_gcal/src/auth.rs
use google_calendar3::{
    hyper_rustls::{self, HttpsConnectorBuilder},
    hyper_util::client::legacy::connect::HttpConnector,
    hyper_util::client::legacy::Client,
    yup_oauth2::{read_service_account_key, ServiceAccountAuthenticator},
    CalendarHub,
};
use meetbook_config::GcalConfig;
use std::path::Path;

use crate::error::GcalError;

pub type Connector = hyper_rustls::HttpsConnector<HttpConnector>;

pub type HubType = CalendarHub<Connector>;

pub fn https_connector() -> Result<Connector, GcalError> {
    Ok(HttpsConnectorBuilder::new()
        .with_native_roots()
        .map_err(GcalError::Tls)?
        .https_or_http()
        .enable_http1()
        .build())
}

/// Hub authenticated as the configured service account.
pub async fn create_calendar_hub(config: &GcalConfig) -> Result<HubType, GcalError> {
    let key_path = config
        .key_path
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .ok_or(GcalError::MissingKeyPath)?;

    let sa_key = read_service_account_key(Path::new(key_path))
        .await
        .map_err(GcalError::ServiceAccountKey)?;

    let auth = ServiceAccountAuthenticator::builder(sa_key)
        .build()
        .await
        .map_err(GcalError::Authenticator)?;

    let client = Client::builder(hyper_util::rt::TokioExecutor::new()).build(https_connector()?);
    Ok(CalendarHub::new(client, auth))
}

/// Hub that sends an owner's delegated OAuth access token as-is.
pub fn hub_for_access_token(access_token: &str) -> Result<HubType, GcalError> {
    let client = Client::builder(hyper_util::rt::TokioExecutor::new()).build(https_connector()?);
    Ok(CalendarHub::new(client, access_token.to_string()))
}
