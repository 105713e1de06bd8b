//! The page listing every expense, with year and month filters and pagination.

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
    endpoints,
    expense::{Expense, Month, parse_whole_number, table::expense_table},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, base, format_currency, loading_placeholder,
    },
    navigation::NavBar,
    pagination::{create_pagination_indicators, page_count, page_slice, pagination_view},
    session::{FetchOutcome, Selection, ViewMode, lock_session, select_and_fetch},
};

/// The query parameters of the expense list.
///
/// The year and month are text so that the "all" option can be sent as an empty value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub year: String,
    pub month: String,
    pub refresh: bool,
}

impl ListQuery {
    fn year(&self) -> Result<Option<i32>, Error> {
        if self.year.trim().is_empty() {
            return Ok(None);
        }

        let year = parse_whole_number("año", &self.year)?;
        i32::try_from(year)
            .map(Some)
            .map_err(|_| Error::InvalidNumber {
                field: "año",
                value: self.year.clone(),
            })
    }

    fn month(&self) -> Result<Option<Month>, Error> {
        if self.month.trim().is_empty() {
            return Ok(None);
        }

        Month::new(parse_whole_number("mes", &self.month)?).map(Some)
    }
}

/// Render the list of every expense.
///
/// Passing `refresh=true` drops the cached expenses and loads them again.
pub async fn get_expenses_page(
    State(state): State<ViewState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, Error> {
    let year = query.year()?;
    let month = query.month()?;

    if query.refresh {
        tracing::debug!("refreshing the expense list");
        lock_session(&state.session)?.invalidate_expenses();
    }

    let selection = Selection {
        view_mode: ViewMode::ListAll,
        year,
        month,
    };
    let outcome = select_and_fetch(&state.session, &state.backend, selection)
        .inspect_err(|error| tracing::error!("could not load expenses: {error}"))?;

    let session = lock_session(&state.session)?;
    let all_expenses = match (outcome, session.all_expenses()) {
        (FetchOutcome::Committed, Some(expenses)) => expenses,
        _ => return Ok(loading_page(&reload_url(&query)).into_response()),
    };

    let mut years = all_expenses
        .iter()
        .map(|expense| expense.year)
        .collect::<Vec<_>>();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();

    let filtered = all_expenses
        .iter()
        .filter(|expense| year.is_none_or(|year| expense.year == year))
        .filter(|expense| month.is_none_or(|month| expense.month == month))
        .cloned()
        .collect::<Vec<_>>();
    drop(session);

    let per_page = query
        .per_page
        .unwrap_or(state.pagination_config.default_page_size)
        .max(1);
    let page_total = page_count(filtered.len(), per_page);
    let page = query
        .page
        .unwrap_or(state.pagination_config.default_page)
        .clamp(1, page_total);

    let view = ExpensesView {
        filters: &Filters {
            years: &years,
            year,
            month,
        },
        expenses: page_slice(&filtered, page, per_page),
        matching_count: filtered.len(),
        matching_total: filtered.iter().map(|expense| expense.amount).sum(),
        pagination: pagination_view(
            &create_pagination_indicators(page, page_total, state.pagination_config.max_pages),
            |page| page_url(year, month, page, per_page),
        ),
    };

    Ok(view.into_html().into_response())
}

fn page_url(year: Option<i32>, month: Option<Month>, page: u64, per_page: u64) -> String {
    let year = year.map(|year| year.to_string()).unwrap_or_default();
    let month = month
        .map(|month| month.number().to_string())
        .unwrap_or_default();

    format!(
        "{}?year={year}&month={month}&page={page}&per_page={per_page}",
        endpoints::EXPENSES_VIEW
    )
}

fn reload_url(query: &ListQuery) -> String {
    format!(
        "{}?year={}&month={}&page={}",
        endpoints::EXPENSES_VIEW,
        query.year.trim(),
        query.month.trim(),
        query.page.unwrap_or(1)
    )
}

fn loading_page(reload_url: &str) -> Markup {
    let content = html! {
        (NavBar::new(endpoints::EXPENSES_VIEW).into_html())
        (loading_placeholder(reload_url, "Cargando gastos..."))
    };

    base("Gastos", &[], &content)
}

struct Filters<'a> {
    years: &'a [i32],
    year: Option<i32>,
    month: Option<Month>,
}

struct ExpensesView<'a> {
    filters: &'a Filters<'a>,
    expenses: &'a [Expense],
    matching_count: usize,
    matching_total: Amount,
    pagination: Markup,
}

impl ExpensesView<'_> {
    fn into_html(self) -> Markup {
        let refresh_url = format!("{}?refresh=true", endpoints::EXPENSES_VIEW);

        let content = html! {
            (NavBar::new(endpoints::EXPENSES_VIEW).into_html())

            main class=(PAGE_CONTAINER_STYLE)
            {
                div class="w-full max-w-5xl space-y-4"
                {
                    div class="flex flex-wrap items-center justify-between gap-2"
                    {
                        h1 class="text-2xl font-bold" { "Todos los gastos" }

                        div class="space-x-4"
                        {
                            a href=(endpoints::NEW_EXPENSE_VIEW) class=(LINK_STYLE) { "Agregar gasto" }
                            a href=(refresh_url) class=(LINK_STYLE) { "Actualizar" }
                        }
                    }

                    (filter_form(self.filters))

                    p class="text-sm text-gray-600 dark:text-gray-400"
                    {
                        (self.matching_count) " gastos, total "
                        span class="font-semibold" { (format_currency(self.matching_total)) }
                    }

                    (expense_table(self.expenses))
                    (self.pagination)
                }
            }
        };

        base("Gastos", &[], &content)
    }
}

fn filter_form(filters: &Filters) -> Markup {
    html! {
        form method="get" action=(endpoints::EXPENSES_VIEW) class="flex flex-wrap items-end gap-4"
        {
            div
            {
                label for="year" class=(FORM_LABEL_STYLE) { "Año" }

                select id="year" name="year" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" selected[filters.year.is_none()] { "Todos" }

                    @for year in filters.years {
                        option value=(year) selected[filters.year == Some(*year)] { (year) }
                    }
                }
            }

            div
            {
                label for="month" class=(FORM_LABEL_STYLE) { "Mes" }

                select id="month" name="month" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" selected[filters.month.is_none()] { "Todos" }

                    @for month in Month::all() {
                        option value=(month.number()) selected[filters.month == Some(month)] { (month) }
                    }
                }
            }

            div
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Filtrar" }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        extract::{Query, State},
        http::StatusCode,
    };
    use scraper::{Html, Selector};

    use crate::{
        Error,
        app_state::{ViewState, test_states::test_states},
        session::{FetchKey, lock_session},
        test_utils::{assert_valid_html, expense_row_ids, insert_expense, parse_html_document},
    };

    use super::{ListQuery, get_expenses_page};

    fn row_count(html: &Html) -> usize {
        expense_row_ids(html).len()
    }

    async fn get_page(state: &ViewState, query: ListQuery) -> Html {
        let response = get_expenses_page(State(state.clone()), Query(query))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        html
    }

    #[tokio::test]
    async fn lists_every_expense() {
        let (state, _) = test_states();
        insert_expense(&state.backend, 1, 2023, 12, 1_000);
        insert_expense(&state.backend, 2, 2024, 1, 2_000);

        let html = get_page(&state, ListQuery::default()).await;

        assert_eq!(row_count(&html), 2);
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("$30.00"), "want filtered total in {text}");
    }

    #[tokio::test]
    async fn filters_by_year_and_month() {
        let (state, _) = test_states();
        insert_expense(&state.backend, 1, 2023, 3, 1_000);
        insert_expense(&state.backend, 1, 2024, 3, 2_000);
        insert_expense(&state.backend, 2, 2024, 4, 3_000);

        let query = ListQuery {
            year: "2024".to_owned(),
            month: "3".to_owned(),
            ..Default::default()
        };
        let html = get_page(&state, query).await;

        assert_eq!(row_count(&html), 1);
        let selected_year = html
            .select(&Selector::parse("select[name='year'] option[selected]").unwrap())
            .next()
            .and_then(|option| option.value().attr("value"));
        assert_eq!(selected_year, Some("2024"));
    }

    #[tokio::test]
    async fn paginates_with_page_size() {
        let (state, _) = test_states();
        for month in 1..=12 {
            insert_expense(&state.backend, 1, 2024, month, 100);
        }

        let query = ListQuery {
            page: Some(3),
            per_page: Some(5),
            ..Default::default()
        };
        let html = get_page(&state, query).await;

        assert_eq!(row_count(&html), 2);
        let current = html
            .select(&Selector::parse("nav.pagination [aria-current='page']").unwrap())
            .next()
            .expect("No current page")
            .text()
            .collect::<String>();
        assert_eq!(current.trim(), "3");
    }

    #[tokio::test]
    async fn refresh_reloads_from_backend() {
        let (state, _) = test_states();
        get_page(&state, ListQuery::default()).await;
        // Written behind the session's back, so only a refresh shows it.
        insert_expense(&state.backend, 1, 2024, 1, 100);

        let cached = get_page(&state, ListQuery::default()).await;
        let refreshed = get_page(
            &state,
            ListQuery {
                refresh: true,
                ..Default::default()
            },
        )
        .await;

        assert_eq!(row_count(&cached), 0);
        assert_eq!(row_count(&refreshed), 1);
    }

    #[tokio::test]
    async fn shows_placeholder_while_another_request_loads() {
        let (state, _) = test_states();
        let ticket = lock_session(&state.session)
            .unwrap()
            .begin_fetch(FetchKey::AllExpenses)
            .unwrap();

        let html = get_page(&state, ListQuery::default()).await;

        assert_eq!(row_count(&html), 0);
        let placeholder = html
            .select(&Selector::parse("main[hx-get]").unwrap())
            .count();
        assert_eq!(placeholder, 1);
        lock_session(&state.session).unwrap().abandon(ticket);
    }

    #[tokio::test]
    async fn rejects_invalid_month() {
        let (state, _) = test_states();

        let result = get_expenses_page(
            State(state),
            Query(ListQuery {
                month: "13".to_owned(),
                ..Default::default()
            }),
        )
        .await;

        assert_eq!(result.err(), Some(Error::InvalidMonth(13)));
    }
}
