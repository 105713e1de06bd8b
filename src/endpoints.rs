//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/gastos/{expense_id}/editar', use [format_endpoint].

/// The root route which redirects to the list of expenses.
pub const ROOT: &str = "/";
/// The page listing every expense.
pub const EXPENSES_VIEW: &str = "/gastos";
/// The page listing the expenses of one year.
pub const EXPENSES_BY_YEAR_VIEW: &str = "/gastos/anio";
/// The page with the chart of one year.
pub const CHART_VIEW: &str = "/grafico";
/// The page with the totals per year and service.
pub const TOTALS_VIEW: &str = "/totales";
/// The page for creating a new expense.
pub const NEW_EXPENSE_VIEW: &str = "/gastos/nuevo";
/// The page for editing an existing expense.
pub const EDIT_EXPENSE_VIEW: &str = "/gastos/{expense_id}/editar";
/// The page for searching expenses.
pub const SEARCH_VIEW: &str = "/buscar";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to create an expense.
pub const POST_EXPENSE: &str = "/api/gastos";
/// The route to update an expense.
pub const PUT_EXPENSE: &str = "/api/gastos/{expense_id}";
/// The route to delete an expense.
pub const DELETE_EXPENSE: &str = "/api/gastos/{expense_id}";
/// The route to replace only the amount of an expense.
pub const PUT_EXPENSE_AMOUNT: &str = "/api/gastos/{expense_id}/importe";
/// The route to copy a year's services into the following years.
pub const EXTEND_YEARS: &str = "/api/anios/extender";

/// The prefix of the JSON API.
pub const REST: &str = "/rest";
/// The JSON list of services.
pub const REST_SERVICES: &str = "/servicios";
/// The JSON list of expenses, and the route to create one.
pub const REST_EXPENSES: &str = "/gastos";
/// The JSON route to update or delete an expense.
pub const REST_EXPENSE: &str = "/gastos/{expense_id}";
/// The JSON totals per year and service.
pub const REST_ANNUAL_TOTALS: &str = "/totales/anuales";
/// The JSON totals per year.
pub const REST_GLOBAL_ANNUAL_TOTALS: &str = "/totales/globales-anuales";
/// The JSON totals per year, month and service.
pub const REST_MONTHLY_TOTALS: &str = "/totales/mensuales-todos";
/// The JSON list of years with expenses.
pub const REST_YEARS: &str = "/anios";
/// The JSON list of months with expenses in a year.
pub const REST_MONTHS: &str = "/anios/{year}/meses";
/// One page of expenses as JSON.
pub const REST_EXPENSE_PAGE: &str = "/gastos-paginados";
/// The JSON totals per service for a year or month.
pub const REST_GROUPED_EXPENSES: &str = "/gastos-agrupados";
/// The JSON route to copy a year's services into the following years.
pub const REST_EXTEND_YEARS: &str = "/anios/extender";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/gastos/{expense_id}', '{expense_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
