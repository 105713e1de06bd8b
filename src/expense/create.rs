//! Expense creation page and endpoints, including resolving a duplicate by
//! updating the existing expense's amount.

use std::sync::Mutex;

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
    amount::Amount,
    app_state::{MutationState, ViewState},
    backend::ExpenseBackend,
    coordinator::{CreateOutcome, MutationCoordinator},
    endpoints,
    error::ErrorCategory,
    expense::{
        ExpenseForm, ExpenseId,
        form::{AmountForm, ExpenseFormView, FormMethod, duplicate_confirmation_view},
    },
    html::{FORM_CONTAINER_STYLE, base, dollar_input_styles, loading_placeholder},
    navigation::NavBar,
    service::Service,
    session::{FetchOutcome, Selection, Session, ViewMode, lock_session, select_and_fetch},
};

/// Render the page for adding an expense.
///
/// The year and month default to the ones last selected in the dashboard.
pub async fn get_new_expense_page(State(state): State<ViewState>) -> Result<Response, Error> {
    let previous = lock_session(&state.session)?.selection();
    let selection = Selection {
        view_mode: ViewMode::AddForm,
        ..previous
    };

    let outcome = select_and_fetch(&state.session, &state.backend, selection)
        .inspect_err(|error| tracing::error!("could not load services: {error}"))?;

    let session = lock_session(&state.session)?;
    let services = match (outcome, session.services()) {
        (FetchOutcome::Committed, Some(services)) => services,
        _ => {
            let content = html! {
                (NavBar::new(endpoints::NEW_EXPENSE_VIEW).into_html())
                (loading_placeholder(endpoints::NEW_EXPENSE_VIEW, "Cargando servicios..."))
            };

            return Ok(base("Agregar gasto", &[], &content).into_response());
        }
    };

    let values = ExpenseForm {
        year: previous
            .year
            .map(|year| year.to_string())
            .unwrap_or_default(),
        month: previous
            .month
            .map(|month| month.number().to_string())
            .unwrap_or_default(),
        ..Default::default()
    };

    Ok(new_expense_view(services, &values).into_response())
}

fn new_expense_view(services: &[Service], values: &ExpenseForm) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_EXPENSE_VIEW).into_html();
    let form = new_expense_form_view(services, values, "");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-4" { "Agregar gasto" }
            (form)
        }
    };

    base("Agregar gasto", &[dollar_input_styles()], &content)
}

fn new_expense_form_view(services: &[Service], values: &ExpenseForm, error_message: &str) -> Markup {
    ExpenseFormView {
        endpoint: endpoints::POST_EXPENSE,
        method: FormMethod::Post,
        services,
        values,
        submit_label: "Agregar gasto",
        error_message,
    }
    .into_html()
}

/// The services for rendering a form, from the session if loaded.
pub(crate) fn services_for_form<B: ExpenseBackend>(
    session: &Mutex<Session>,
    backend: &B,
) -> Result<Vec<Service>, Error> {
    if let Some(services) = lock_session(session)?.services() {
        return Ok(services.to_vec());
    }

    backend.services()
}

/// Handle the expense creation form.
///
/// Invalid input re-renders the form with a message. If the service already
/// has an expense that month, the user is asked whether to update its amount
/// instead.
pub async fn create_expense_endpoint(
    State(state): State<MutationState>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let render_form_error = |error: Error| -> Response {
        match services_for_form(&state.session, &state.backend) {
            Ok(services) => {
                new_expense_form_view(&services, &form, &format!("Error: {error}")).into_response()
            }
            Err(services_error) => services_error.into_alert_response(),
        }
    };

    let new_expense = match form.validate(&state.dashboard_config.year_bounds) {
        Ok(new_expense) => new_expense,
        Err(error) => return render_form_error(error),
    };

    let coordinator = MutationCoordinator::new(&state.backend, &state.dashboard_config);

    match coordinator.create(&state.session, new_expense) {
        Ok(CreateOutcome::Created(expense)) => (
            HxRedirect(format!(
                "{}?year={}",
                endpoints::EXPENSES_BY_YEAR_VIEW,
                expense.year
            )),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Ok(CreateOutcome::DuplicateFound {
            existing,
            proposed_amount,
        }) => duplicate_confirmation_view(&existing, proposed_amount).into_response(),
        Err(error) if error.category() == ErrorCategory::Validation => render_form_error(error),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating an expense: {error}");
            error.into_alert_response()
        }
    }
}

/// Replace only the amount of an existing expense.
pub async fn update_expense_amount_endpoint(
    State(state): State<MutationState>,
    Path(expense_id): Path<ExpenseId>,
    Form(form): Form<AmountForm>,
) -> Response {
    if form.amount.trim().is_empty() {
        return Error::MissingField("importe").into_alert_response();
    }

    let amount = match Amount::parse(&form.amount) {
        Ok(amount) => amount,
        Err(error) => return error.into_alert_response(),
    };

    let coordinator = MutationCoordinator::new(&state.backend, &state.dashboard_config);

    match coordinator.update_existing_amount(&state.session, expense_id, amount) {
        Ok(expense) => (
            HxRedirect(format!(
                "{}?year={}",
                endpoints::EXPENSES_BY_YEAR_VIEW,
                expense.year
            )),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not update the amount of expense {expense_id}: {error}");
            error.into_alert_response()
        }
    }
}


#[cfg(test)]
mod create_expense_endpoint_tests {
    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;
    use scraper::Selector;

    use crate::{
        amount::Amount,
        app_state::{MutationState, test_states::test_states},
        backend::ExpenseBackend,
        endpoints,
        expense::{
            ExpenseForm,
            create::{create_expense_endpoint, update_expense_amount_endpoint},
            form::AmountForm,
        },
        test_utils::{
            assert_form_error_message, assert_hx_endpoint, assert_hx_redirect, assert_valid_html,
            must_get_form, parse_html_fragment,
        },
    };

    fn form(service_id: &str, year: &str, month: &str, amount: &str) -> ExpenseForm {
        ExpenseForm {
            service_id: service_id.to_owned(),
            year: year.to_owned(),
            month: month.to_owned(),
            amount: amount.to_owned(),
        }
    }

    async fn create(state: &MutationState, form: ExpenseForm) -> axum::response::Response {
        create_expense_endpoint(State(state.clone()), Form(form)).await
    }

    #[tokio::test]
    async fn can_create_expense() {
        let (_, state) = test_states();

        let response = create(&state, form("1", "2024", "3", "100")).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(
            &response,
            &format!("{}?year=2024", endpoints::EXPENSES_BY_YEAR_VIEW),
        );
        let expenses = state.backend.expenses(Some(2024)).unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].service_name, "GAS");
        assert_eq!(expenses[0].amount, Amount::from_cents(10_000));
    }

    #[tokio::test]
    async fn invalid_month_rerenders_form_with_message() {
        let (_, state) = test_states();

        let response = create(&state, form("1", "2024", "13", "100")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_form_error_message(
            &form,
            "Error: 13 is not a valid month, months must be between 1 and 12",
        );
        assert!(state.backend.expenses(None).unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_service_rerenders_form_with_message() {
        let (_, state) = test_states();

        let response = create(&state, form("99", "2024", "3", "100")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(
            &form,
            "Error: the service ID 99 does not refer to a known service",
        );
    }

    #[tokio::test]
    async fn duplicate_offers_to_update_amount() {
        let (_, state) = test_states();
        create(&state, form("1", "2024", "3", "100")).await;

        let response = create(&state, form("1", "2024", "3", "120")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, "/api/gastos/1/importe", "hx-put");
        let amount = form
            .select(&Selector::parse("input[name='amount']").unwrap())
            .next()
            .and_then(|input| input.value().attr("value"));
        assert_eq!(amount, Some("120.00"));
        assert_eq!(state.backend.expenses(None).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_amount_resolves_duplicate() {
        let (_, state) = test_states();
        create(&state, form("1", "2024", "3", "100")).await;

        let response = update_expense_amount_endpoint(
            State(state.clone()),
            Path(1),
            Form(AmountForm {
                amount: "120.00".to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let expenses = state.backend.expenses(None).unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].amount, Amount::from_cents(12_000));
    }

    #[tokio::test]
    async fn update_amount_of_missing_expense_fails() {
        let (_, state) = test_states();

        let response = update_expense_amount_endpoint(
            State(state),
            Path(42),
            Form(AmountForm {
                amount: "1".to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
