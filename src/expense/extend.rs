//! Copying a year's services into the following years.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    alert::Alert,
    app_state::MutationState,
    coordinator::{MAX_EXTEND_YEARS, MutationCoordinator},
    endpoints,
    expense::parse_whole_number,
    html::{BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
};

/// The form for extending the years after `base_year`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtendYearsForm {
    pub base_year: String,
    pub year_count: String,
}

impl ExtendYearsForm {
    fn parse(&self) -> Result<(i32, u32), Error> {
        let base_year = parse_whole_number("año", &self.base_year)?;
        let base_year = i32::try_from(base_year).map_err(|_| Error::InvalidNumber {
            field: "año",
            value: self.base_year.clone(),
        })?;

        let year_count = parse_whole_number("cantidad de años", &self.year_count)?;
        let year_count = u32::try_from(year_count).map_err(|_| Error::InvalidNumber {
            field: "cantidad de años",
            value: self.year_count.clone(),
        })?;

        Ok((base_year, year_count))
    }
}

/// Add zero amount expenses for the services of `base_year` to the following years.
///
/// Redirects to the last added year, or shows an alert if every year already
/// had those services.
pub async fn extend_years_endpoint(
    State(state): State<MutationState>,
    Form(form): Form<ExtendYearsForm>,
) -> Response {
    let (base_year, year_count) = match form.parse() {
        Ok(parsed) => parsed,
        Err(error) => return error.into_alert_response(),
    };

    let coordinator = MutationCoordinator::new(&state.backend, &state.dashboard_config);

    match coordinator.extend_years(&state.session, base_year, year_count) {
        Ok(0) => Alert::SuccessSimple {
            message: "Los años siguientes ya tenían todos los servicios".to_owned(),
        }
        .into_response(),
        Ok(_) => {
            let last_year = i64::from(base_year) + i64::from(year_count);

            (
                HxRedirect(format!(
                    "{}?year={last_year}",
                    endpoints::EXPENSES_BY_YEAR_VIEW
                )),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("could not extend the years after {base_year}: {error}");
            error.into_alert_response()
        }
    }
}

/// The form shown under a year's expenses.
pub(crate) fn extend_years_form(base_year: i32) -> Markup {
    html! {
        form
            hx-post=(endpoints::EXTEND_YEARS)
            hx-target-error="#alert-container"
            hx-confirm="¿Agregar gastos en cero para los servicios de este año?"
            class="flex flex-wrap items-end gap-4"
        {
            input type="hidden" name="base_year" value=(base_year);

            div
            {
                label for="year_count" class=(FORM_LABEL_STYLE) { "Años a extender" }

                input
                    id="year_count"
                    type="number"
                    name="year_count"
                    min="1"
                    max=(MAX_EXTEND_YEARS)
                    value="1"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Extender servicios" }
            }
        }
    }
}
