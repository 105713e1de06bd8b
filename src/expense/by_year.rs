//! The page listing the expenses of one year.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    Error,
    amount::Amount,
    app_state::ViewState,
    backend::ExpenseBackend,
    endpoints,
    expense::{Expense, extend::extend_years_form, table::expense_table},
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, PILL_ACTIVE_STYLE, PILL_STYLE, base, format_currency,
        loading_placeholder,
    },
    navigation::NavBar,
    session::{FetchOutcome, Selection, ViewMode, lock_session, select_and_fetch},
};

/// The query parameters of the pages that show a single year.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

/// Pick the year to show: the requested one, else the most recent year with expenses.
///
/// `years` must be ordered most recent first.
pub(crate) fn resolve_year(requested: Option<i32>, years: &[i32]) -> Option<i32> {
    requested.or_else(|| years.first().copied())
}

/// Render the expenses of the selected year.
pub async fn get_expenses_by_year_page(
    State(state): State<ViewState>,
    Query(query): Query<YearQuery>,
) -> Result<Response, Error> {
    let years = state
        .backend
        .expense_years()
        .inspect_err(|error| tracing::error!("could not get the years with expenses: {error}"))?;

    let Some(year) = resolve_year(query.year, &years) else {
        return Ok(empty_view().into_response());
    };

    let selection = Selection {
        view_mode: ViewMode::ListByYear,
        year: Some(year),
        month: None,
    };
    let outcome = select_and_fetch(&state.session, &state.backend, selection)
        .inspect_err(|error| tracing::error!("could not load the expenses of {year}: {error}"))?;

    let session = lock_session(&state.session)?;
    let expenses = match (outcome, session.year_expenses(year)) {
        (FetchOutcome::Committed, Some(expenses)) => expenses,
        _ => {
            let reload_url = format!("{}?year={year}", endpoints::EXPENSES_BY_YEAR_VIEW);
            let content = html! {
                (NavBar::new(endpoints::EXPENSES_BY_YEAR_VIEW).into_html())
                (loading_placeholder(&reload_url, "Cargando gastos del año..."))
            };

            return Ok(base("Gastos por año", &[], &content).into_response());
        }
    };

    Ok(year_view(year, &years, expenses).into_response())
}

/// Links to each year with expenses, highlighting `selected`.
pub(crate) fn year_selector(endpoint: &str, years: &[i32], selected: i32) -> Markup {
    html! {
        nav class="flex flex-wrap gap-2" aria-label="Años"
        {
            @for year in years {
                @let style = if *year == selected { PILL_ACTIVE_STYLE } else { PILL_STYLE };
                a href={(endpoint) "?year=" (year)} class=(style) { (year) }
            }
        }
    }
}

fn year_view(year: i32, years: &[i32], expenses: &[Expense]) -> Markup {
    let total: Amount = expenses.iter().map(|expense| expense.amount).sum();

    let content = html! {
        (NavBar::new(endpoints::EXPENSES_BY_YEAR_VIEW).into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl space-y-4"
            {
                div class="flex flex-wrap items-center justify-between gap-2"
                {
                    h1 class="text-2xl font-bold" { "Gastos de " (year) }

                    a href={(endpoints::CHART_VIEW) "?year=" (year)} class=(LINK_STYLE)
                    {
                        "Ver gráfico"
                    }
                }

                (year_selector(endpoints::EXPENSES_BY_YEAR_VIEW, years, year))

                p class="text-lg"
                {
                    "Total del año: "
                    span class="font-semibold" data-year-total { (format_currency(total)) }
                }

                (expense_table(expenses))

                section class="pt-4 border-t border-gray-200 dark:border-gray-700 space-y-2"
                {
                    h2 class="text-lg font-semibold" { "Extender al año siguiente" }

                    p class="text-sm text-gray-600 dark:text-gray-400"
                    {
                        "Agrega gastos en cero para cada servicio usado en " (year)
                        " en los años siguientes, sin modificar los existentes."
                    }

                    (extend_years_form(year))
                }
            }
        }
    };

    base("Gastos por año", &[], &content)
}

fn empty_view() -> Markup {
    let content = html! {
        (NavBar::new(endpoints::EXPENSES_BY_YEAR_VIEW).into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            p
            {
                "Todavía no hay gastos. "
                a href=(endpoints::NEW_EXPENSE_VIEW) class=(LINK_STYLE) { "Agregue el primero" }
                "."
            }
        }
    };

    base("Gastos por año", &[], &content)
}

#[cfg(test)]
mod tests {
    use axum::{
        extract::{Query, State},
        http::StatusCode,
    };
    use scraper::{Html, Selector};

    use crate::{
        app_state::{ViewState, test_states::test_states},
        session::lock_session,
        test_utils::{assert_valid_html, insert_expense, parse_html_document},
    };

    use super::{YearQuery, get_expenses_by_year_page, resolve_year};

    async fn get_page(state: &ViewState, year: Option<i32>) -> Html {
        let response = get_expenses_by_year_page(State(state.clone()), Query(YearQuery { year }))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        html
    }

    fn year_total(html: &Html) -> String {
        html.select(&Selector::parse("[data-year-total]").unwrap())
            .next()
            .expect("No year total")
            .text()
            .collect()
    }

    #[test]
    fn resolves_requested_or_latest_year() {
        assert_eq!(resolve_year(Some(2020), &[2024, 2023]), Some(2020));
        assert_eq!(resolve_year(None, &[2024, 2023]), Some(2024));
        assert_eq!(resolve_year(None, &[]), None);
    }

    #[tokio::test]
    async fn defaults_to_most_recent_year() {
        let (state, _) = test_states();
        insert_expense(&state.backend, 1, 2023, 1, 1_000);
        insert_expense(&state.backend, 1, 2024, 1, 2_000);
        insert_expense(&state.backend, 2, 2024, 2, 500);

        let html = get_page(&state, None).await;

        assert_eq!(year_total(&html), "$25.00");
        assert_eq!(lock_session(&state.session).unwrap().selection().year, Some(2024));
    }

    #[tokio::test]
    async fn shows_requested_year() {
        let (state, _) = test_states();
        insert_expense(&state.backend, 1, 2023, 1, 1_000);
        insert_expense(&state.backend, 1, 2024, 1, 2_000);

        let html = get_page(&state, Some(2023)).await;

        assert_eq!(year_total(&html), "$10.00");
        let rows = html
            .select(&Selector::parse("tbody tr[data-expense-id]").unwrap())
            .count();
        assert_eq!(rows, 1);
        let extend_base = html
            .select(&Selector::parse("input[name='base_year']").unwrap())
            .next()
            .and_then(|input| input.value().attr("value"));
        assert_eq!(extend_base, Some("2023"));
    }

    #[tokio::test]
    async fn invites_first_expense_when_empty() {
        let (state, _) = test_states();

        let html = get_page(&state, None).await;

        let link = html
            .select(&Selector::parse("main a[href='/gastos/nuevo']").unwrap())
            .count();
        assert_eq!(link, 1);
    }
}
