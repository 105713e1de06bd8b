//! Implements a struct that holds the state of the web server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{
    Error, backend::SqliteBackend, config::DashboardConfig, db::initialize,
    pagination::PaginationConfig, session::Session,
};

/// The state of the web server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The local timezone as a canonical timezone name, e.g. "America/Argentina/Buenos_Aires".
    pub local_timezone: String,

    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,

    /// The duplicate policy and accepted years for new expenses.
    pub dashboard_config: DashboardConfig,

    /// The selection and the expense lists loaded for it.
    pub session: Arc<Mutex<Session>>,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for services and expenses.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "America/Argentina/Buenos_Aires".
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        local_timezone: &str,
        pagination_config: PaginationConfig,
        dashboard_config: DashboardConfig,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            local_timezone: local_timezone.to_owned(),
            pagination_config,
            dashboard_config,
            session: Arc::new(Mutex::new(Session::new())),
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }

    /// The backend that reads and writes the shared database connection.
    pub fn backend(&self) -> SqliteBackend {
        SqliteBackend::new(self.db_connection.clone())
    }
}

/// The state shared by the pages that show expenses.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub backend: SqliteBackend,
    pub session: Arc<Mutex<Session>>,
    pub pagination_config: PaginationConfig,
    pub dashboard_config: DashboardConfig,
}

impl FromRef<AppState> for ViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            backend: state.backend(),
            session: state.session.clone(),
            pagination_config: state.pagination_config.clone(),
            dashboard_config: state.dashboard_config,
        }
    }
}

/// The state needed for creating, updating and deleting expenses.
#[derive(Debug, Clone)]
pub struct MutationState {
    pub backend: SqliteBackend,
    pub session: Arc<Mutex<Session>>,
    pub dashboard_config: DashboardConfig,
}

impl FromRef<AppState> for MutationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            backend: state.backend(),
            session: state.session.clone(),
            dashboard_config: state.dashboard_config,
        }
    }
}
