//! Shared page layout, styles and small view helpers.

use std::sync::OnceLock;

use maud::{DOCTYPE, Markup, PreEscaped, html};
use numfmt::{Formatter, Precision};

use crate::amount::Amount;

pub const LINK_STYLE: &str = "text-sky-700 underline hover:text-sky-500 \
    dark:text-sky-400 dark:hover:text-sky-300";

pub const BUTTON_PRIMARY_STYLE: &str = "w-full rounded-md bg-sky-600 px-4 py-2 \
    font-semibold text-white hover:enabled:bg-sky-700 disabled:bg-sky-900 \
    dark:bg-sky-500 hover:enabled:dark:bg-sky-600";

pub const BUTTON_SECONDARY_STYLE: &str = "w-full rounded-md border border-gray-300 \
    bg-white px-4 py-2 text-sm font-medium text-gray-800 hover:bg-gray-100 \
    dark:border-gray-600 dark:bg-gray-800 dark:text-gray-300 dark:hover:bg-gray-700";

pub const BUTTON_DELETE_STYLE: &str = "cursor-pointer border-none bg-transparent \
    text-red-600 underline hover:text-red-500 dark:text-red-400";

pub const FORM_CONTAINER_STYLE: &str = "mx-auto flex w-full max-w-md flex-col \
    items-center px-6 py-8 text-gray-900 dark:text-gray-100";
pub const FORM_LABEL_STYLE: &str = "mb-1 block text-sm font-medium text-gray-800 dark:text-gray-200";
pub const FORM_TEXT_INPUT_STYLE: &str = "block w-full rounded-md border border-gray-300 \
    bg-white p-2 text-sm text-gray-900 focus:border-sky-500 focus:ring-sky-500 \
    disabled:text-gray-500 dark:border-gray-600 dark:bg-gray-700 dark:text-white";

pub const TABLE_HEADER_STYLE: &str = "bg-gray-100 text-xs uppercase tracking-wide \
    text-gray-600 dark:bg-gray-700 dark:text-gray-300";
pub const TABLE_ROW_STYLE: &str = "border-b border-gray-200 bg-white dark:border-gray-700 dark:bg-gray-800";
pub const TABLE_CELL_STYLE: &str = "px-4 py-3";

pub const SERVICE_BADGE_STYLE: &str = "inline-flex items-center rounded-full bg-sky-100 \
    px-2.5 py-0.5 text-xs font-semibold text-sky-800 dark:bg-sky-900 dark:text-sky-200";

pub const PAGE_CONTAINER_STYLE: &str =
    "mx-auto flex flex-col items-center px-6 py-6 text-gray-900 dark:text-gray-100";

/// Links for picking a year or month.
pub const PILL_STYLE: &str = "rounded-full border border-gray-300 px-3 py-1 text-sm \
    hover:bg-gray-100 dark:border-gray-600 dark:hover:bg-gray-700";
pub const PILL_ACTIVE_STYLE: &str = "rounded-full border border-sky-600 bg-sky-600 \
    px-3 py-1 text-sm text-white";

pub enum HeadElement {
    /// The file path or URL to a JavaScript script.
    ScriptLink(String),
    /// JavaScript source code.
    ScriptSource(PreEscaped<String>),
    Style(PreEscaped<String>),
}

pub fn base(title: &str, head_elements: &[HeadElement], content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="es"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Gastos" }
                link rel="icon" type="image/png" href="/static/favicon-32x32.png" sizes="32x32";
                link href="/static/main.css" rel="stylesheet";

                script src="/static/htmx-2.0.8-min.js" integrity="sha384-/TgkGk7p307TH7EXJDuUlgG3Ce1UVolAOFopFekQkkXihi5u/6OCvVKyz1W+idaz" {}
                script src="/static/htmx-ext-response-targets-2.0.4.js" integrity="sha384-T41oglUPvXLGBVyRdZsVRxNWnOOqCynaPubjUVjxhsjFTKrFJGEMm3/0KGmNQ+Pg" {}

                style
                {
                    r#"
                    #indicator.htmx-indicator {
                        display: none;
                    }

                    #indicator.htmx-request .htmx-indicator {
                        display: inline;
                    }

                    #indicator.htmx-request.htmx-indicator {
                        display: inline;
                    }

                    .echarts-tooltip {
                        z-index: 30 !important;
                    }
                    "#
                }

                @for element in head_elements
                {
                    @match element
                    {
                        HeadElement::ScriptSource(text) => script { (text) }
                        HeadElement::ScriptLink(path) => script src=(path) {}
                        HeadElement::Style(text) => style { (text) }
                    }
                }
            }

            body
                hx-ext="response-targets"
                class="min-h-screen bg-gray-50 dark:bg-gray-900"
            {
                (content)

                // Alert container for out-of-band swaps
                div
                    id="alert-container"
                    class="hidden w-full max-w-md px-4"
                    style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
                {}
            }
        }
    }
}

/// A full page explaining what went wrong and how the user might fix it.
pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    let content = html! {
        main class="mx-auto flex min-h-screen max-w-xl flex-col items-center justify-center gap-4 px-6 text-center"
        {
            h1 class="text-8xl font-extrabold text-sky-500" { (header) }
            p class="text-3xl font-bold text-gray-900 dark:text-white" { (description) }
            p class="text-lg text-gray-700 dark:text-gray-300" { (fix) }
            a href="/" class=(BUTTON_PRIMARY_STYLE) { "Volver al inicio" }
        }
    };

    base(title, &[], &content)
}

pub fn loading_spinner() -> Markup {
    html! {
        span
            role="status"
            aria-hidden="true"
            class="me-2 inline-block h-4 w-4 animate-spin rounded-full border-2 border-sky-500 border-t-transparent align-middle"
        {}
    }
}

/// A placeholder shown while another request is loading the same data.
///
/// The placeholder reloads `reload_url` after a short delay and swaps in the
/// `main` element of the response.
pub fn loading_placeholder(reload_url: &str, message: &str) -> Markup {
    html! {
        main
            class=(PAGE_CONTAINER_STYLE)
            hx-get=(reload_url)
            hx-trigger="load delay:500ms"
            hx-select="main"
            hx-swap="outerHTML"
        {
            p class="text-gray-600 dark:text-gray-400"
            {
                (loading_spinner())
                (message)
            }
        }
    }
}

/// Returns the CSS styles for adding a dollar sign prefix to number inputs.
pub fn dollar_input_styles() -> HeadElement {
    HeadElement::Style(PreEscaped(
        r#"
        .input-wrapper {
            position: relative;
            display: block;
        }
        .input-wrapper input {
            padding-left: 1.4rem;
        }
        .input-wrapper::before {
            content: '$';
            position: absolute;
            left: 0.6rem;
            top: 50%;
            transform: translateY(-50%);
            pointer-events: none;
        }
        "#
        .to_owned(),
    ))
}

/// Format an amount as currency with thousands separators and two decimals, e.g. "$1,234.50".
pub fn format_currency(amount: Amount) -> String {
    static FORMATTER: OnceLock<Option<Formatter>> = OnceLock::new();

    let formatter = FORMATTER.get_or_init(|| {
        Formatter::currency("$")
            .map(|formatter| formatter.precision(Precision::Decimals(2)))
            .ok()
    });

    let sign = if amount.is_negative() { "-" } else { "" };
    let magnitude = Amount::from_cents(amount.cents().abs());

    let formatted = match formatter {
        // Zero is hardcoded as "0" by numfmt
        Some(formatter) if magnitude != Amount::zero() => {
            pad_decimals(formatter.fmt_string(magnitude.as_f64()))
        }
        _ => format!("${magnitude}"),
    };

    format!("{sign}{formatted}")
}

/// numfmt drops trailing zeros, so "12.30" comes out as "12.3" and "12.00" as "12".
fn pad_decimals(formatted: String) -> String {
    match formatted.rfind('.') {
        None => format!("{formatted}.00"),
        Some(point) if formatted.len() - point == 2 => format!("{formatted}0"),
        Some(_) => formatted,
    }
}

/// A link with blue text for use in a <p> tag.
pub fn link(url: &str, text: &str) -> Markup {
    html! (
        a href=(url) class=(LINK_STYLE)
        {
          (text)
        }
    )
}

/// The edit link and delete button shown on each table row.
///
/// The delete button asks for confirmation before sending the request and
/// removes the closest matching `target` element on success.
pub fn edit_delete_action_links(
    edit_url: &str,
    delete_url: &str,
    confirm_message: &str,
    target: &str,
) -> Markup {
    html! {
        a href=(edit_url) class=(LINK_STYLE) { "Editar" }

        button
            type="button"
            hx-delete=(delete_url)
            hx-vals=r#"{"confirmed": "true"}"#
            hx-confirm=(confirm_message)
            hx-target=(target)
            hx-target-error="#alert-container"
            hx-swap="delete"
            class=(BUTTON_DELETE_STYLE)
        {
            "Eliminar"
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::amount::Amount;

    use super::format_currency;

    #[test]
    fn formats_currency_with_two_decimals() {
        assert_eq!(format_currency(Amount::from_cents(0)), "$0.00");
        assert_eq!(format_currency(Amount::from_cents(1_230)), "$12.30");
        assert_eq!(format_currency(Amount::from_cents(10_000)), "$100.00");
        assert_eq!(format_currency(Amount::from_cents(-550)), "-$5.50");
    }
}
