//! Searching the expense list by service, date and amount.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    aggregation::{SearchCriteria, search},
    amount::Amount,
    app_state::ViewState,
    endpoints,
    expense::{Expense, Month, parse_whole_number, table::expense_table},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base,
        format_currency, loading_placeholder,
    },
    navigation::NavBar,
    session::{FetchOutcome, Selection, ViewMode, lock_session, select_and_fetch},
};

/// The raw search form. Empty fields match every expense.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchForm {
    pub service: String,
    pub year: String,
    pub month: String,
    pub min_amount: String,
    pub max_amount: String,
}

impl SearchForm {
    fn is_empty(&self) -> bool {
        [
            &self.service,
            &self.year,
            &self.month,
            &self.min_amount,
            &self.max_amount,
        ]
        .iter()
        .all(|field| field.trim().is_empty())
    }

    /// Parse the form into search criteria.
    pub fn criteria(&self) -> Result<SearchCriteria, Error> {
        let year = optional(&self.year)
            .map(|year| {
                let number = parse_whole_number("año", year)?;
                i32::try_from(number).map_err(|_| Error::InvalidNumber {
                    field: "año",
                    value: year.to_owned(),
                })
            })
            .transpose()?;
        let month = optional(&self.month)
            .map(|month| Month::new(parse_whole_number("mes", month)?))
            .transpose()?;
        let min_amount = optional(&self.min_amount).map(Amount::parse).transpose()?;
        let max_amount = optional(&self.max_amount).map(Amount::parse).transpose()?;

        SearchCriteria::new(
            Some(self.service.clone()),
            year,
            month,
            min_amount,
            max_amount,
        )
    }
}

fn optional(field: &str) -> Option<&str> {
    Some(field.trim()).filter(|field| !field.is_empty())
}

/// Render the search form and the matching expenses.
///
/// Without any filters the results of the last search are shown again.
pub async fn get_search_page(
    State(state): State<ViewState>,
    Query(form): Query<SearchForm>,
) -> Result<Response, Error> {
    if form.is_empty() {
        let session = lock_session(&state.session)?;
        let last_search = session
            .search_results()
            .map(|results| (results.criteria.clone(), results.expenses.clone()));
        drop(session);

        let view = match last_search {
            Some((criteria, expenses)) => search_view(&form_from(&criteria), "", Some(&expenses)),
            None => search_view(&form, "", None),
        };
        return Ok(view.into_response());
    }

    let criteria = match form.criteria() {
        Ok(criteria) => criteria,
        Err(error) => return Ok(search_view(&form, &format!("Error: {error}"), None).into_response()),
    };

    let selection = Selection {
        view_mode: ViewMode::Search,
        year: criteria.year,
        month: criteria.month,
    };
    let outcome = select_and_fetch(&state.session, &state.backend, selection)
        .inspect_err(|error| tracing::error!("could not load expenses to search: {error}"))?;

    let mut session = lock_session(&state.session)?;
    let matches = match (outcome, session.all_expenses()) {
        (FetchOutcome::Committed, Some(expenses)) => search(expenses, &criteria),
        _ => {
            let reload_url = format!(
                "{}?{}",
                endpoints::SEARCH_VIEW,
                serde_urlencoded::to_string(&form).unwrap_or_default()
            );
            let content = html! {
                (NavBar::new(endpoints::SEARCH_VIEW).into_html())
                (loading_placeholder(&reload_url, "Cargando gastos..."))
            };

            return Ok(base("Buscar", &[], &content).into_response());
        }
    };

    tracing::debug!("search matched {} expenses", matches.len());
    session.set_search_results(criteria, matches.clone());
    drop(session);

    Ok(search_view(&form, "", Some(&matches)).into_response())
}

fn form_from(criteria: &SearchCriteria) -> SearchForm {
    SearchForm {
        service: criteria.service_name.clone().unwrap_or_default(),
        year: criteria.year.map(|year| year.to_string()).unwrap_or_default(),
        month: criteria
            .month
            .map(|month| month.number().to_string())
            .unwrap_or_default(),
        min_amount: criteria
            .min_amount
            .map(|amount| amount.to_string())
            .unwrap_or_default(),
        max_amount: criteria
            .max_amount
            .map(|amount| amount.to_string())
            .unwrap_or_default(),
    }
}

fn search_view(form: &SearchForm, error_message: &str, results: Option<&[Expense]>) -> Markup {
    let selected_month = form.month.trim();

    let content = html! {
        (NavBar::new(endpoints::SEARCH_VIEW).into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl space-y-4"
            {
                h1 class="text-2xl font-bold" { "Buscar gastos" }

                form
                    method="get"
                    action=(endpoints::SEARCH_VIEW)
                    class="grid grid-cols-2 md:grid-cols-6 gap-4 items-end"
                {
                    div class="col-span-2"
                    {
                        label for="service" class=(FORM_LABEL_STYLE) { "Servicio" }
                        input
                            id="service"
                            type="text"
                            name="service"
                            placeholder="p. ej. luz"
                            value=(form.service)
                            class=(FORM_TEXT_INPUT_STYLE);
                    }

                    div
                    {
                        label for="year" class=(FORM_LABEL_STYLE) { "Año" }
                        input
                            id="year"
                            type="number"
                            name="year"
                            value=(form.year)
                            class=(FORM_TEXT_INPUT_STYLE);
                    }

                    div
                    {
                        label for="month" class=(FORM_LABEL_STYLE) { "Mes" }
                        select id="month" name="month" class=(FORM_TEXT_INPUT_STYLE)
                        {
                            option value="" selected[selected_month.is_empty()] { "Todos" }

                            @for month in Month::all() {
                                @let number = month.number().to_string();
                                option value=(number) selected[number == selected_month] { (month) }
                            }
                        }
                    }

                    div
                    {
                        label for="min_amount" class=(FORM_LABEL_STYLE) { "Importe mínimo" }
                        input
                            id="min_amount"
                            type="number"
                            name="min_amount"
                            step="0.01"
                            value=(form.min_amount)
                            class=(FORM_TEXT_INPUT_STYLE);
                    }

                    div
                    {
                        label for="max_amount" class=(FORM_LABEL_STYLE) { "Importe máximo" }
                        input
                            id="max_amount"
                            type="number"
                            name="max_amount"
                            step="0.01"
                            value=(form.max_amount)
                            class=(FORM_TEXT_INPUT_STYLE);
                    }

                    div class="col-span-2 md:col-span-6"
                    {
                        @if !error_message.is_empty() {
                            p class="text-red-600 dark:text-red-400 mb-2" { (error_message) }
                        }

                        button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Buscar" }
                    }
                }

                @if let Some(results) = results {
                    @let total: Amount = results.iter().map(|expense| expense.amount).sum();

                    p class="text-sm text-gray-600 dark:text-gray-400"
                    {
                        (results.len()) " resultados, total "
                        span class="font-semibold" { (format_currency(total)) }
                    }

                    (expense_table(results))
                }
            }
        }
    };

    base("Buscar", &[], &content)
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
        test_utils::{
            assert_form_error_message, assert_valid_html, expense_row_ids, insert_expense,
            must_get_form, parse_html_document,
        },
    };

    use super::{SearchForm, get_search_page};

    async fn get_page(state: &ViewState, form: SearchForm) -> Html {
        let response = get_search_page(State(state.clone()), Query(form))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        html
    }

    #[test]
    fn missing_fields_parse_as_empty() {
        let form: SearchForm = serde_html_form::from_str("service=gas&year=2024").unwrap();

        assert_eq!(
            form,
            SearchForm {
                service: "gas".to_owned(),
                year: "2024".to_owned(),
                ..Default::default()
            }
        );
    }

    #[tokio::test]
    async fn finds_by_service_and_amount_range() {
        let (state, _) = test_states();
        insert_expense(&state.backend, 1, 2024, 1, 500);
        insert_expense(&state.backend, 2, 2024, 1, 1_500);
        insert_expense(&state.backend, 2, 2024, 2, 5_000);

        let html = get_page(
            &state,
            SearchForm {
                service: "luz".to_owned(),
                max_amount: "20".to_owned(),
                ..Default::default()
            },
        )
        .await;

        assert_eq!(expense_row_ids(&html), ["2"]);
        let session = lock_session(&state.session).unwrap();
        assert_eq!(session.search_results().unwrap().expenses.len(), 1);
    }

    #[tokio::test]
    async fn empty_form_shows_last_search() {
        let (state, _) = test_states();
        insert_expense(&state.backend, 1, 2024, 1, 500);
        insert_expense(&state.backend, 2, 2024, 1, 1_500);
        get_page(
            &state,
            SearchForm {
                service: "gas".to_owned(),
                ..Default::default()
            },
        )
        .await;

        let html = get_page(&state, SearchForm::default()).await;

        assert_eq!(expense_row_ids(&html), ["1"]);
        let service = html
            .select(&Selector::parse("input[name='service']").unwrap())
            .next()
            .and_then(|input| input.value().attr("value"));
        assert_eq!(service, Some("gas"));
    }

    #[tokio::test]
    async fn inverted_amount_range_shows_error() {
        let (state, _) = test_states();

        let html = get_page(
            &state,
            SearchForm {
                min_amount: "10".to_owned(),
                max_amount: "5".to_owned(),
                ..Default::default()
            },
        )
        .await;

        let form = must_get_form(&html);
        assert_form_error_message(
            &form,
            "Error: the minimum amount 10.00 is greater than the maximum amount 5.00",
        );
        assert!(expense_row_ids(&html).is_empty());
    }
}
