use axum::{body::Body, response::Response};
use scraper::{Html, Selector};

async fn body_text(response: Response<Body>) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not get response body");

    String::from_utf8_lossy(&body).to_string()
}

pub(crate) async fn parse_html_document(response: Response<Body>) -> Html {
    Html::parse_document(&body_text(response).await)
}

pub(crate) async fn parse_html_fragment(response: Response<Body>) -> Html {
    Html::parse_fragment(&body_text(response).await)
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}",
        html.errors
    );
}

/// The trimmed text of each element matching `selector`.
#[track_caller]
pub(crate) fn element_texts(html: &Html, selector: &str) -> Vec<String> {
    html.select(&Selector::parse(selector).unwrap())
        .map(|element| element.text().collect::<String>().trim().to_owned())
        .collect()
}

/// The `data-expense-id` of each expense table row, top to bottom.
pub(crate) fn expense_row_ids(html: &Html) -> Vec<String> {
    html.select(&Selector::parse("tbody tr[data-expense-id]").unwrap())
        .filter_map(|row| row.value().attr("data-expense-id"))
        .map(str::to_owned)
        .collect()
}

/// Checks the headline of the alert in `html`.
#[track_caller]
pub(crate) fn assert_alert_message(html: &Html, want: &str) {
    let message = element_texts(html, "[role='alert'] p");

    assert_eq!(
        message.first().map(String::as_str),
        Some(want),
        "want alert {want:?}, got {message:?}"
    );
}
