//! Expense editing page and endpoint.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};

use crate::{
    Error,
    app_state::{MutationState, ViewState},
    backend::ExpenseBackend,
    coordinator::MutationCoordinator,
    endpoints::{self, format_endpoint},
    error::ErrorCategory,
    expense::{
        Expense, ExpenseForm, ExpenseId,
        create::services_for_form,
        form::{ExpenseFormView, FormMethod},
    },
    html::{FORM_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
    service::Service,
};

impl From<&Expense> for ExpenseForm {
    fn from(expense: &Expense) -> Self {
        Self {
            service_id: expense.service_id.to_string(),
            year: expense.year.to_string(),
            month: expense.month.number().to_string(),
            amount: expense.amount.to_string(),
        }
    }
}

/// Render the page for editing an expense.
pub async fn get_edit_expense_page(
    State(state): State<ViewState>,
    Path(expense_id): Path<ExpenseId>,
) -> Result<Response, Error> {
    let expense = state
        .backend
        .expense(expense_id)
        .inspect_err(|error| tracing::error!("could not get expense {expense_id}: {error}"))?;
    let services = services_for_form(&state.session, &state.backend)
        .inspect_err(|error| tracing::error!("could not get services: {error}"))?;

    Ok(edit_expense_view(expense_id, &services, &ExpenseForm::from(&expense)).into_response())
}

fn edit_expense_view(expense_id: ExpenseId, services: &[Service], values: &ExpenseForm) -> Markup {
    let nav_bar = NavBar::new(endpoints::EDIT_EXPENSE_VIEW).into_html();
    let form = edit_expense_form_view(expense_id, services, values, "");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-4" { "Editar gasto" }
            (form)
        }
    };

    base("Editar gasto", &[dollar_input_styles()], &content)
}

fn edit_expense_form_view(
    expense_id: ExpenseId,
    services: &[Service],
    values: &ExpenseForm,
    error_message: &str,
) -> Markup {
    let endpoint = format_endpoint(endpoints::PUT_EXPENSE, expense_id);

    ExpenseFormView {
        endpoint: &endpoint,
        method: FormMethod::Put,
        services,
        values,
        submit_label: "Guardar cambios",
        error_message,
    }
    .into_html()
}

/// Handle the expense editing form.
pub async fn update_expense_endpoint(
    State(state): State<MutationState>,
    Path(expense_id): Path<ExpenseId>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let render_form_error = |error: Error| -> Response {
        match services_for_form(&state.session, &state.backend) {
            Ok(services) => {
                edit_expense_form_view(expense_id, &services, &form, &format!("Error: {error}"))
                    .into_response()
            }
            Err(services_error) => services_error.into_alert_response(),
        }
    };

    let new_expense = match form.validate(&state.dashboard_config.year_bounds) {
        Ok(new_expense) => new_expense,
        Err(error) => return render_form_error(error),
    };

    let coordinator = MutationCoordinator::new(&state.backend, &state.dashboard_config);

    match coordinator.update(&state.session, expense_id, new_expense) {
        Ok(expense) => (
            HxRedirect(format!(
                "{}?year={}",
                endpoints::EXPENSES_BY_YEAR_VIEW,
                expense.year
            )),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) if error.category() == ErrorCategory::Validation => render_form_error(error),
        Err(error) => {
            tracing::error!("could not update expense {expense_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod edit_expense_page_tests {
    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };

    use crate::{
        Error,
        app_state::test_states::test_states,
        expense::edit::get_edit_expense_page,
        test_utils::{
            assert_form_input_with_value, assert_hx_endpoint, assert_valid_html, insert_expense,
            must_get_form, parse_html_document,
        },
    };

    #[tokio::test]
    async fn render_page_with_current_values() {
        let (state, _) = test_states();
        insert_expense(&state.backend, 2, 2024, 6, 4_550);

        let response = get_edit_expense_page(State(state), Path(1)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, "/api/gastos/1", "hx-put");
        assert_form_input_with_value(&form, "year", "number", "2024");
        assert_form_input_with_value(&form, "amount", "number", "45.50");
    }

    #[tokio::test]
    async fn missing_expense_is_not_found() {
        let (state, _) = test_states();

        let result = get_edit_expense_page(State(state), Path(9)).await;

        let error = result.err().expect("want an error");
        assert_eq!(error, Error::NotFound);
        assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
    }
}
