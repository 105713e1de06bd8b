//! The JSON API under `/rest`.
//!
//! Reads go straight to the backend. Mutations go through the
//! [MutationCoordinator] so that the lists cached by the dashboard stay in
//! sync with what the API changed.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    AppState, Error,
    app_state::{MutationState, ViewState},
    backend::ExpenseBackend,
    coordinator::{CreateOutcome, DeleteConfirmation, MutationCoordinator},
    endpoints,
    expense::{Expense, ExpenseId, Month, NewExpense},
};

/// The routes of the JSON API, relative to [endpoints::REST].
pub fn rest_router() -> Router<AppState> {
    Router::new()
        .route(endpoints::REST_SERVICES, get(get_services))
        .route(
            endpoints::REST_EXPENSES,
            get(get_expenses).post(create_expense),
        )
        .route(
            endpoints::REST_EXPENSE,
            put(update_expense).delete(delete_expense),
        )
        .route(endpoints::REST_ANNUAL_TOTALS, get(get_annual_totals))
        .route(
            endpoints::REST_GLOBAL_ANNUAL_TOTALS,
            get(get_global_annual_totals),
        )
        .route(endpoints::REST_MONTHLY_TOTALS, get(get_monthly_totals))
        .route(endpoints::REST_YEARS, get(get_years))
        .route(endpoints::REST_MONTHS, get(get_months))
        .route(endpoints::REST_EXPENSE_PAGE, get(get_expense_page))
        .route(endpoints::REST_GROUPED_EXPENSES, get(get_grouped_expenses))
        .route(endpoints::REST_EXTEND_YEARS, post(extend_years))
}

fn json_or_error<T: Serialize>(result: Result<T, Error>) -> Response {
    match result {
        Ok(body) => Json(body).into_response(),
        Err(error) => error.into_json_response(),
    }
}

async fn get_services(State(state): State<ViewState>) -> Response {
    json_or_error(
        state
            .backend
            .services()
            .inspect_err(|error| tracing::error!("could not get services: {error}")),
    )
}

/// The query parameters of `GET /gastos`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExpensesQuery {
    /// Wrap the list as `{"gastos": [...]}`.
    #[serde(rename = "completo")]
    pub complete: bool,
    #[serde(rename = "año", alias = "anio")]
    pub year: Option<i32>,
}

#[derive(Debug, Serialize)]
struct ExpenseList {
    #[serde(rename = "gastos")]
    expenses: Vec<Expense>,
}

async fn get_expenses(
    State(state): State<ViewState>,
    Query(query): Query<ExpensesQuery>,
) -> Response {
    let expenses = match state.backend.expenses(query.year) {
        Ok(expenses) => expenses,
        Err(error) => {
            tracing::error!("could not get expenses: {error}");
            return error.into_json_response();
        }
    };

    if query.complete {
        Json(ExpenseList { expenses }).into_response()
    } else {
        Json(expenses).into_response()
    }
}

/// Create an expense.
///
/// Responds with `201 Created` and the new record, or `409 Conflict` with the
/// existing record when the service already has an expense that month.
async fn create_expense(
    State(state): State<MutationState>,
    Json(new_expense): Json<NewExpense>,
) -> Response {
    let coordinator = MutationCoordinator::new(&state.backend, &state.dashboard_config);

    match coordinator.create(&state.session, new_expense) {
        Ok(CreateOutcome::Created(expense)) => (StatusCode::CREATED, Json(expense)).into_response(),
        Ok(CreateOutcome::DuplicateFound {
            existing,
            proposed_amount,
        }) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": Error::DuplicateExpense(existing.id).to_string(),
                "existente": existing,
                "importe_propuesto": proposed_amount,
            })),
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not create expense: {error}");
            error.into_json_response()
        }
    }
}

async fn update_expense(
    State(state): State<MutationState>,
    Path(expense_id): Path<ExpenseId>,
    Json(new_expense): Json<NewExpense>,
) -> Response {
    let coordinator = MutationCoordinator::new(&state.backend, &state.dashboard_config);

    json_or_error(
        coordinator
            .update(&state.session, expense_id, new_expense)
            .inspect_err(|error| tracing::error!("could not update expense {expense_id}: {error}")),
    )
}

/// Delete an expense. API clients confirm by making the request.
async fn delete_expense(
    State(state): State<MutationState>,
    Path(expense_id): Path<ExpenseId>,
) -> Response {
    let coordinator = MutationCoordinator::new(&state.backend, &state.dashboard_config);

    match coordinator.delete(&state.session, expense_id, DeleteConfirmation::Confirmed) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => {
            tracing::error!("could not delete expense {expense_id}: {error}");
            error.into_json_response()
        }
    }
}

async fn get_annual_totals(State(state): State<ViewState>) -> Response {
    json_or_error(state.backend.annual_totals())
}

async fn get_global_annual_totals(State(state): State<ViewState>) -> Response {
    json_or_error(state.backend.global_annual_totals())
}

async fn get_monthly_totals(State(state): State<ViewState>) -> Response {
    json_or_error(state.backend.monthly_totals())
}

async fn get_years(State(state): State<ViewState>) -> Response {
    json_or_error(state.backend.expense_years())
}

async fn get_months(State(state): State<ViewState>, Path(year): Path<i32>) -> Response {
    json_or_error(state.backend.expense_months(year))
}

/// The query parameters of `GET /gastos-paginados`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExpensePageQuery {
    #[serde(rename = "año", alias = "anio")]
    pub year: Option<i32>,
    #[serde(rename = "mes")]
    pub month: Option<Month>,
    pub limit: Option<u64>,
    pub offset: u64,
}

async fn get_expense_page(
    State(state): State<ViewState>,
    Query(query): Query<ExpensePageQuery>,
) -> Response {
    let limit = query
        .limit
        .unwrap_or(state.pagination_config.default_page_size);

    json_or_error(
        state
            .backend
            .expense_page(query.year, query.month, limit, query.offset),
    )
}

/// The query parameters of `GET /gastos-agrupados`.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupedExpensesQuery {
    #[serde(rename = "año", alias = "anio")]
    pub year: i32,
    #[serde(rename = "mes", default)]
    pub month: Option<Month>,
}

async fn get_grouped_expenses(
    State(state): State<ViewState>,
    Query(query): Query<GroupedExpensesQuery>,
) -> Response {
    json_or_error(state.backend.totals_by_service(query.year, query.month))
}

/// The body of `POST /anios/extender`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtendYearsRequest {
    #[serde(rename = "año_base", alias = "anio_base")]
    pub base_year: i32,
    #[serde(rename = "cantidad")]
    pub year_count: u32,
}

async fn extend_years(
    State(state): State<MutationState>,
    Json(request): Json<ExtendYearsRequest>,
) -> Response {
    let coordinator = MutationCoordinator::new(&state.backend, &state.dashboard_config);

    json_or_error(
        coordinator
            .extend_years(&state.session, request.base_year, request.year_count)
            .map(|inserted| json!({ "insertados": inserted }))
            .inspect_err(|error| tracing::error!("could not extend years: {error}")),
    )
}
