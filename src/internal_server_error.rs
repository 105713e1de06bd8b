//! The page to display when the server fails to handle a request.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::html::error_view;

/// A 500 page with an explanation and a suggested fix.
pub struct InternalServerError {
    description: String,
    fix: String,
}

impl InternalServerError {
    /// The page shown when the server was started with an unknown timezone.
    pub fn invalid_timezone(timezone: &str) -> Self {
        Self {
            description: "Zona horaria inválida".to_owned(),
            fix: format!(
                "No se pudo obtener la zona horaria \"{timezone}\". Revise la configuración \
                del servidor y use un nombre canónico, p. ej. \"America/Argentina/Buenos_Aires\"."
            ),
        }
    }
}

impl Default for InternalServerError {
    fn default() -> Self {
        Self {
            description: "Lo sentimos, algo salió mal.".to_owned(),
            fix: "Intente nuevamente más tarde o revise los registros del servidor.".to_owned(),
        }
    }
}

impl IntoResponse for InternalServerError {
    fn into_response(self) -> Response {
        let page = error_view("Error interno", "500", &self.description, &self.fix);

        (StatusCode::INTERNAL_SERVER_ERROR, page).into_response()
    }
}

pub async fn get_internal_server_error_page() -> Response {
    InternalServerError::default().into_response()
}
