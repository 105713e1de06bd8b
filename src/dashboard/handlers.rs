//! Dashboard HTTP handlers and view rendering.
//!
//! This module contains:
//! - The chart page: one year's expenses by month and service
//! - The totals page: every year's expenses by service

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    aggregation::{MonthServiceMatrix, YearServiceMatrix, month_service_matrix, year_service_matrix},
    app_state::ViewState,
    backend::ExpenseBackend,
    dashboard::{
        charts::{
            DashboardChart, ECHARTS_SCRIPT, charts_script, charts_view, monthly_services_chart,
        },
        tables::{month_service_table, year_service_table},
    },
    endpoints,
    expense::{YearQuery, resolve_year, year_selector},
    html::{HeadElement, PAGE_CONTAINER_STYLE, base, link, loading_placeholder},
    navigation::NavBar,
    session::{FetchKey, FetchOutcome, Selection, ViewMode, fetch, lock_session, select_and_fetch},
};

/// Display the stacked bar chart and monthly totals of the selected year.
pub async fn get_chart_page(
    State(state): State<ViewState>,
    Query(query): Query<YearQuery>,
) -> Result<Response, Error> {
    let years = state
        .backend
        .expense_years()
        .inspect_err(|error| tracing::error!("could not get the years with expenses: {error}"))?;

    let Some(year) = resolve_year(query.year, &years) else {
        return Ok(no_data_view(endpoints::CHART_VIEW, "Gráfico").into_response());
    };

    let selection = Selection {
        view_mode: ViewMode::ChartByYear,
        year: Some(year),
        month: None,
    };
    let outcome = select_and_fetch(&state.session, &state.backend, selection)
        .inspect_err(|error| tracing::error!("could not load the expenses of {year}: {error}"))?;

    let session = lock_session(&state.session)?;
    let matrix = match (outcome, session.year_expenses(year)) {
        (FetchOutcome::Committed, Some(expenses)) => month_service_matrix(year, expenses),
        _ => {
            let reload_url = format!("{}?year={year}", endpoints::CHART_VIEW);
            let content = html! {
                (NavBar::new(endpoints::CHART_VIEW).into_html())
                (loading_placeholder(&reload_url, "Cargando gráfico..."))
            };

            return Ok(base("Gráfico", &[], &content).into_response());
        }
    };
    drop(session);

    Ok(chart_view(&years, &matrix).into_response())
}

fn chart_view(years: &[i32], matrix: &MonthServiceMatrix) -> Markup {
    let charts = [DashboardChart {
        id: "monthly-services-chart",
        options: monthly_services_chart(matrix).to_string(),
    }];

    let content = html! {
        (NavBar::new(endpoints::CHART_VIEW).into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-6xl space-y-4"
            {
                h1 class="text-2xl font-bold" { "Gráfico de " (matrix.year) }

                (year_selector(endpoints::CHART_VIEW, years, matrix.year))

                (charts_view(&charts))

                h2 class="text-xl font-semibold" { "Totales por mes" }

                (month_service_table(matrix))
            }
        }
    };

    let scripts = [
        HeadElement::ScriptLink(ECHARTS_SCRIPT.to_owned()),
        charts_script(&charts),
    ];

    base("Gráfico", &scripts, &content)
}

/// Display the totals of every year by service.
///
/// Loads the full expense list into the session without changing the
/// selected view.
pub async fn get_totals_page(State(state): State<ViewState>) -> Result<Response, Error> {
    let needs_fetch = lock_session(&state.session)?.needs(FetchKey::AllExpenses);
    let outcome = if needs_fetch {
        fetch(&state.session, &state.backend, FetchKey::AllExpenses).inspect_err(|error| {
            tracing::error!("could not load expenses for the totals: {error}")
        })?
    } else {
        FetchOutcome::Committed
    };

    let session = lock_session(&state.session)?;
    let matrix = match (outcome, session.all_expenses()) {
        (FetchOutcome::Committed | FetchOutcome::Coalesced, Some(expenses)) => {
            year_service_matrix(expenses)
        }
        _ => {
            let content = html! {
                (NavBar::new(endpoints::TOTALS_VIEW).into_html())
                (loading_placeholder(endpoints::TOTALS_VIEW, "Cargando totales..."))
            };

            return Ok(base("Totales", &[], &content).into_response());
        }
    };
    drop(session);

    if matrix.years.is_empty() {
        return Ok(no_data_view(endpoints::TOTALS_VIEW, "Totales").into_response());
    }

    Ok(totals_view(&matrix).into_response())
}

fn totals_view(matrix: &YearServiceMatrix) -> Markup {
    let content = html! {
        (NavBar::new(endpoints::TOTALS_VIEW).into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-6xl space-y-4"
            {
                h1 class="text-2xl font-bold" { "Totales por año" }

                (year_service_table(matrix))
            }
        }
    };

    base("Totales", &[], &content)
}

fn no_data_view(active_endpoint: &str, title: &str) -> Markup {
    let content = html! {
        (NavBar::new(active_endpoint).into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="text-center space-y-2"
            {
                h1 class="text-2xl font-bold" { (title) }
                p { "Todavía no hay gastos cargados." }
                p { (link(endpoints::NEW_EXPENSE_VIEW, "Agregar el primer gasto")) }
            }
        }
    };

    base(title, &[], &content)
}

#[cfg(test)]
mod chart_page_tests {
    use axum::{
        extract::{Query, State},
        http::StatusCode,
    };
    use scraper::Selector;

    use crate::{
        amount::Amount,
        app_state::test_states::test_states,
        dashboard::handlers::get_chart_page,
        expense::YearQuery,
        html::format_currency,
        session::{ViewMode, lock_session},
        test_utils::{assert_valid_html, insert_expense, parse_html_document},
    };

    #[tokio::test]
    async fn renders_chart_and_month_table() {
        let (state, _) = test_states();
        insert_expense(&state.backend, 1, 2024, 3, 10_000);
        insert_expense(&state.backend, 2, 2024, 3, 5_000);
        insert_expense(&state.backend, 1, 2023, 1, 700);

        let response = get_chart_page(State(state.clone()), Query(YearQuery { year: Some(2024) }))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        assert_eq!(
            html.select(&Selector::parse("#monthly-services-chart").unwrap())
                .count(),
            1
        );
        assert_eq!(
            html.select(&Selector::parse("#month-service-table tbody tr").unwrap())
                .count(),
            12
        );
        let grand_total = html
            .select(&Selector::parse("td[data-grand-total]").unwrap())
            .next()
            .unwrap()
            .text()
            .collect::<String>();
        assert_eq!(grand_total.trim(), format_currency(Amount::from_cents(15_000)));

        let selection = lock_session(&state.session).unwrap().selection();
        assert_eq!(selection.view_mode, ViewMode::ChartByYear);
        assert_eq!(selection.year, Some(2024));
    }

    #[tokio::test]
    async fn defaults_to_most_recent_year() {
        let (state, _) = test_states();
        insert_expense(&state.backend, 1, 2022, 3, 100);
        insert_expense(&state.backend, 1, 2025, 3, 100);

        let response = get_chart_page(State(state.clone()), Query(YearQuery::default()))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        let heading = html
            .select(&Selector::parse("h1").unwrap())
            .next()
            .unwrap()
            .text()
            .collect::<String>();
        assert_eq!(heading, "Gráfico de 2025");
    }

    #[tokio::test]
    async fn no_expenses_links_to_new_expense_page() {
        let (state, _) = test_states();

        let response = get_chart_page(State(state), Query(YearQuery::default()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_eq!(
            html.select(&Selector::parse("main a[href='/gastos/nuevo']").unwrap())
                .count(),
            1
        );
    }
}
