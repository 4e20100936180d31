// --- File: crates/services/meetbook_backend/src/app_state.rs ---
use std::sync::Arc;

use meetbook_common::{CalendarPort, DisabledCalendar};
use meetbook_config::AppConfig;
use meetbook_scheduling::{
    InMemoryRepository, SchedulingError, SchedulingRepository, SchedulingSettings,
    SchedulingState, SystemClock,
};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Invalid scheduling configuration: {0}")]
    Scheduling(#[from] SchedulingError),
    #[cfg(feature = "database")]
    #[error(transparent)]
    Database(#[from] meetbook_db::DbError),
    #[cfg(feature = "gcal")]
    #[error(transparent)]
    Calendar(#[from] meetbook_gcal::GcalError),
    #[error("{0}")]
    Unsupported(String),
}

/// Everything the router needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub scheduling: Arc<SchedulingState>,
    /// "sql" or "memory", reported by the health endpoint.
    pub storage: &'static str,
    /// "google" or "disabled".
    pub calendar: &'static str,
}

/// Wires repository, calendar port and clock according to `config`.
///
/// Without a `[database]` section bookings live in memory and vanish on restart.
pub async fn build_state(config: Arc<AppConfig>) -> Result<AppState, StartupError> {
    let settings = SchedulingSettings::from_config(&config.scheduling)?;
    let (repository, storage) = build_repository(&config).await?;
    let (calendar, calendar_kind) = build_calendar(&config).await?;

    info!(
        "Scheduling in {} with {:?} slot step, storage={}, calendar={}",
        settings.time_zone, settings.slot_step, storage, calendar_kind
    );
    let scheduling = SchedulingState::new(repository, calendar, Arc::new(SystemClock), settings);

    Ok(AppState {
        config,
        scheduling: Arc::new(scheduling),
        storage,
        calendar: calendar_kind,
    })
}

async fn build_repository(
    config: &AppConfig,
) -> Result<(Arc<dyn SchedulingRepository>, &'static str), StartupError> {
    match &config.database {
        #[cfg(feature = "database")]
        Some(db_config) => {
            let client = meetbook_db::DbClient::from_config(db_config).await?;
            let repository = meetbook_db::SqlSchedulingRepository::new(client);
            repository.init_schema().await?;
            Ok((Arc::new(repository), "sql"))
        }
        #[cfg(not(feature = "database"))]
        Some(_) => Err(StartupError::Unsupported(
            "a [database] section is configured but the backend was built without the `database` feature"
                .to_string(),
        )),
        None => {
            warn!("No database configured, bookings are kept in memory only");
            Ok((Arc::new(InMemoryRepository::new()), "memory"))
        }
    }
}

async fn build_calendar(
    config: &AppConfig,
) -> Result<(Arc<dyn CalendarPort>, &'static str), StartupError> {
    if !config.use_gcal {
        return Ok((Arc::new(DisabledCalendar), "disabled"));
    }
    Ok((google_calendar(config).await?, "google"))
}

#[cfg(feature = "gcal")]
async fn google_calendar(config: &AppConfig) -> Result<Arc<dyn CalendarPort>, StartupError> {
    let gcal_config = config.gcal.clone().unwrap_or_default();
    let port = meetbook_gcal::GoogleCalendarPort::from_config(&gcal_config).await?;
    Ok(Arc::new(port))
}

#[cfg(not(feature = "gcal"))]
async fn google_calendar(_config: &AppConfig) -> Result<Arc<dyn CalendarPort>, StartupError> {
    Err(StartupError::Unsupported(
        "use_gcal is set but the backend was built without the `gcal` feature".to_string(),
    ))
}
