//! Defines the app level error type and conversions to rendered HTML pages, alerts and JSON.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    alert::Alert,
    amount::Amount,
    expense::ExpenseId,
    html::error_view,
    internal_server_error::InternalServerError,
    not_found::NotFoundError,
    service::ServiceId,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A required form or query field was empty or missing.
    #[error("the field \"{0}\" is required")]
    MissingField(&'static str),

    /// A field that should hold a whole number could not be parsed.
    #[error("\"{value}\" is not a valid number for the field \"{field}\"")]
    InvalidNumber {
        /// The name of the offending field.
        field: &'static str,
        /// The text that failed to parse.
        value: String,
    },

    /// The text could not be parsed as a currency amount.
    #[error("\"{0}\" is not a valid amount")]
    InvalidAmount(String),

    /// Expense amounts must not be negative.
    #[error("the amount {0} is negative, which is not allowed")]
    NegativeAmount(Amount),

    /// The amount is larger than [Amount::MAX].
    #[error("the amount {0} is too large, amounts must be at most {max}", max = Amount::MAX)]
    AmountTooLarge(Amount),

    /// Months must lie in 1..=12.
    #[error("{0} is not a valid month, months must be between 1 and 12")]
    InvalidMonth(i64),

    /// The year lies outside the configured plausible range.
    #[error("{year} is not a valid year, years must be between {min} and {max}")]
    InvalidYear {
        /// The rejected year.
        year: i64,
        /// The lowest accepted year.
        min: i32,
        /// The highest accepted year.
        max: i32,
    },

    /// The lower bound of a search is greater than the upper bound.
    #[error("the minimum amount {min} is greater than the maximum amount {max}")]
    InvalidAmountRange {
        /// The lower bound.
        min: Amount,
        /// The upper bound.
        max: Amount,
    },

    /// The number of years to extend by is outside of the accepted range.
    #[error("cannot extend by {0} years, the count must be between 1 and 10")]
    InvalidYearCount(u32),

    /// The service ID does not refer to a known service.
    #[error("the service ID {0} does not refer to a known service")]
    UnknownService(ServiceId),

    /// An expense already exists for the same service, year and month.
    ///
    /// This is a recoverable condition: the client should offer to update the
    /// existing expense instead.
    #[error("an expense already exists for this service and month (ID {0})")]
    DuplicateExpense(ExpenseId),

    /// A delete was requested without explicit confirmation.
    #[error("deleting an expense requires confirmation")]
    DeleteNotConfirmed,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update an expense that does not exist
    #[error("tried to update an expense that is not in the database")]
    UpdateMissingExpense,

    /// Tried to delete an expense that does not exist
    #[error("tried to delete an expense that is not in the database")]
    DeleteMissingExpense,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Could not acquire the dashboard session lock
    #[error("could not acquire the session lock")]
    SessionLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

/// The broad classes of failure, which decide how an error is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad input caught before any data was read or written.
    Validation,
    /// The referenced record does not exist.
    NotFound,
    /// The request collides with an existing record and needs a decision from the user.
    Conflict,
    /// The data store failed. Nothing was changed and the request may be retried.
    Transport,
}

impl Error {
    /// The category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::MissingField(_)
            | Error::InvalidNumber { .. }
            | Error::InvalidAmount(_)
            | Error::NegativeAmount(_)
            | Error::AmountTooLarge(_)
            | Error::InvalidMonth(_)
            | Error::InvalidYear { .. }
            | Error::InvalidAmountRange { .. }
            | Error::InvalidYearCount(_)
            | Error::UnknownService(_)
            | Error::DeleteNotConfirmed => ErrorCategory::Validation,
            Error::NotFound | Error::UpdateMissingExpense | Error::DeleteMissingExpense => {
                ErrorCategory::NotFound
            }
            Error::DuplicateExpense(_) => ErrorCategory::Conflict,
            Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::SessionLockError
            | Error::InvalidTimezoneError(_) => ErrorCategory::Transport,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self.category() {
            ErrorCategory::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            ErrorCategory::Conflict => StatusCode::CONFLICT,
            ErrorCategory::Transport => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self.category() {
            ErrorCategory::NotFound => NotFoundError.into_response(),
            ErrorCategory::Validation | ErrorCategory::Conflict => {
                let page = error_view(
                    "Solicitud inválida",
                    "400",
                    &self.to_string(),
                    "Revise los datos ingresados e intente nuevamente.",
                );

                (StatusCode::BAD_REQUEST, page).into_response()
            }
            ErrorCategory::Transport => match self {
                Error::InvalidTimezoneError(timezone) => {
                    InternalServerError::invalid_timezone(&timezone).into_response()
                }
                Error::DatabaseLockError | Error::SessionLockError => {
                    InternalServerError::default().into_response()
                }
                error => {
                    tracing::error!("An unexpected error occurred: {}", error);
                    InternalServerError::default().into_response()
                }
            },
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let status_code = self.status_code();

        let alert = match self {
            Error::UpdateMissingExpense => Alert::Error {
                message: "No se pudo modificar el gasto".to_owned(),
                details: "El gasto no existe.".to_owned(),
            },
            Error::DeleteMissingExpense => Alert::Error {
                message: "No se pudo eliminar el gasto".to_owned(),
                details: "El gasto no existe. \
                    Actualice la página para ver si ya fue eliminado."
                    .to_owned(),
            },
            Error::DeleteNotConfirmed => Alert::Error {
                message: "Eliminación no confirmada".to_owned(),
                details: "Confirme la eliminación para continuar.".to_owned(),
            },
            Error::DuplicateExpense(_) => Alert::Error {
                message: "Gasto duplicado".to_owned(),
                details: "Ya existe un gasto para ese servicio, año y mes.".to_owned(),
            },
            Error::UnknownService(service_id) => Alert::Error {
                message: "Servicio inválido".to_owned(),
                details: format!("No existe un servicio con el ID {service_id}."),
            },
            error if error.category() == ErrorCategory::Validation => Alert::Error {
                message: "Datos inválidos".to_owned(),
                details: error.to_string(),
            },
            Error::NotFound => Alert::Error {
                message: "No encontrado".to_owned(),
                details: "El recurso solicitado no existe.".to_owned(),
            },
            error => {
                tracing::error!("An unexpected error occurred: {}", error);

                Alert::Error {
                    message: "Algo salió mal".to_owned(),
                    details: "Ocurrió un error inesperado, nada fue modificado. \
                        Intente nuevamente o revise los registros del servidor."
                        .to_owned(),
                }
            }
        };

        (status_code, alert.into_html()).into_response()
    }

    /// Convert the error into a JSON response of the form `{"error": "..."}`.
    pub fn into_json_response(self) -> Response {
        let status_code = self.status_code();

        let message = match self.category() {
            ErrorCategory::Transport => {
                tracing::error!("An unexpected error occurred: {}", self);
                "internal server error".to_owned()
            }
            _ => self.to_string(),
        };

        (status_code, Json(json!({ "error": message }))).into_response()
    }
}
