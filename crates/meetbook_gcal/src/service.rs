// --- File: crates/meetbook_gcal/src/service.rs ---
//! Google Calendar implementation of [`CalendarPort`].
//!
//! Owners that signed in with Google carry a delegated access token in their
//! credential; requests for them run on a hub built around that token. Owners
//! without a token fall back to the service-account hub, which only works for
//! calendars shared with the service account.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use meetbook_common::{
    timeout_error, BusyPeriod, CalendarCredential, CalendarEventRequest, CalendarEventResult,
    CalendarPort, MeetbookError,
};
use meetbook_config::GcalConfig;
use tracing::{debug, info};

use crate::auth::{create_calendar_hub, hub_for_access_token, HubType};
use crate::convert::{busy_periods, event_from_request, freebusy_request, join_url};
use crate::error::GcalError;

const DEFAULT_CALENDAR_ID: &str = "primary";
const DEFAULT_CALL_TIMEOUT_SECS: u64 = 15;

pub struct GoogleCalendarPort {
    service_account: Option<Arc<HubType>>,
    default_calendar_id: String,
    call_timeout: Duration,
}

impl GoogleCalendarPort {
    /// Builds the port from config. A missing `key_path` is fine as long as
    /// every owner supplies an access token.
    pub async fn from_config(config: &GcalConfig) -> Result<Self, GcalError> {
        let service_account = match config.key_path.as_deref() {
            Some(path) if !path.trim().is_empty() => {
                info!("Using Google service account key at {}", path);
                Some(Arc::new(create_calendar_hub(config).await?))
            }
            _ => None,
        };
        Ok(Self {
            service_account,
            default_calendar_id: config
                .calendar_id
                .clone()
                .unwrap_or_else(|| DEFAULT_CALENDAR_ID.to_string()),
            call_timeout: Duration::from_secs(
                config.event_timeout_secs.unwrap_or(DEFAULT_CALL_TIMEOUT_SECS),
            ),
        })
    }

    fn calendar_id<'a>(&'a self, credential: &'a CalendarCredential) -> &'a str {
        if credential.calendar_id.trim().is_empty() {
            &self.default_calendar_id
        } else {
            &credential.calendar_id
        }
    }

    fn hub_for(&self, credential: &CalendarCredential) -> Result<Arc<HubType>, GcalError> {
        match credential.access_token.as_deref() {
            Some(token) if !token.is_empty() => Ok(Arc::new(hub_for_access_token(token)?)),
            _ => self
                .service_account
                .clone()
                .ok_or_else(|| GcalError::NoCredentials(self.calendar_id(credential).to_string())),
        }
    }

    async fn bounded<T, F>(&self, what: &str, call: F) -> Result<T, MeetbookError>
    where
        F: std::future::Future<Output = Result<T, GcalError>>,
    {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result.map_err(MeetbookError::from),
            Err(_) => Err(timeout_error(format!(
                "Google Calendar {} exceeded {:?}",
                what, self.call_timeout
            ))),
        }
    }
}

#[async_trait]
impl CalendarPort for GoogleCalendarPort {
    async fn list_busy_intervals(
        &self,
        credential: &CalendarCredential,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<BusyPeriod>, MeetbookError> {
        let calendar_id = self.calendar_id(credential).to_string();
        let hub = self.hub_for(credential)?;
        debug!(
            "Querying free/busy for {} between {} and {}",
            calendar_id, window_start, window_end
        );

        self.bounded("free/busy query", async move {
            let request = freebusy_request(&calendar_id, window_start, window_end);
            let (_response, body) = hub.freebusy().query(request).doit().await?;
            busy_periods(&calendar_id, body)
        })
        .await
    }

    async fn create_event(
        &self,
        credential: &CalendarCredential,
        event: CalendarEventRequest,
    ) -> Result<CalendarEventResult, MeetbookError> {
        let calendar_id = self.calendar_id(credential).to_string();
        let hub = self.hub_for(credential)?;
        let request_id = uuid::Uuid::new_v4().to_string();
        let body = event_from_request(&event, &request_id);
        let with_conference = event.request_conference;

        self.bounded("event insert", async move {
            let mut call = hub.events().insert(body, &calendar_id).send_updates("all");
            if with_conference {
                call = call.conference_data_version(1);
            }
            let (_response, created) = call.doit().await?;
            let event_id = created.id.clone().ok_or(GcalError::MissingEventId)?;
            info!("Created Google Calendar event {} in {}", event_id, calendar_id);
            Ok(CalendarEventResult {
                join_url: join_url(&created),
                event_id,
            })
        })
        .await
    }
}
