//! Application router configuration.

use axum::{
    Router,
    response::Redirect,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    dashboard::{get_chart_page, get_totals_page},
    endpoints,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, extend_years_endpoint,
        get_edit_expense_page, get_expenses_by_year_page, get_expenses_page,
        get_new_expense_page, get_search_page, update_expense_amount_endpoint,
        update_expense_endpoint,
    },
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    rest::rest_router,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::EXPENSES_VIEW, get(get_expenses_page))
        .route(
            endpoints::EXPENSES_BY_YEAR_VIEW,
            get(get_expenses_by_year_page),
        )
        .route(endpoints::CHART_VIEW, get(get_chart_page))
        .route(endpoints::TOTALS_VIEW, get(get_totals_page))
        .route(endpoints::NEW_EXPENSE_VIEW, get(get_new_expense_page))
        .route(endpoints::EDIT_EXPENSE_VIEW, get(get_edit_expense_page))
        .route(endpoints::SEARCH_VIEW, get(get_search_page))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    // The htmx form endpoints.
    let api_routes = Router::new()
        .route(endpoints::POST_EXPENSE, post(create_expense_endpoint))
        .route(
            endpoints::PUT_EXPENSE,
            put(update_expense_endpoint).delete(delete_expense_endpoint),
        )
        .route(
            endpoints::PUT_EXPENSE_AMOUNT,
            put(update_expense_amount_endpoint),
        )
        .route(endpoints::EXTEND_YEARS, post(extend_years_endpoint));

    page_routes
        .merge(api_routes)
        .nest(endpoints::REST, rest_router())
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the list of expenses.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::EXPENSES_VIEW)
}

#[cfg(test)]
mod root_route_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{endpoints, routing::get_index_page};

    #[tokio::test]
    async fn root_redirects_to_expense_list() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::EXPENSES_VIEW);
    }
}
