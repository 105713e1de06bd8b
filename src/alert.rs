//! Alert messages for reporting the result of an action to the user.
//!
//! Alerts are rendered as out-of-band swaps into the `#alert-container`
//! element defined in [crate::html::base], so they can be returned from any
//! htmx endpoint regardless of its target.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

/// An alert that can be rendered as an HTML fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message with extra details.
    Success {
        /// The headline.
        message: String,
        /// Extra information shown under the headline.
        details: String,
    },
    /// A success message without details.
    SuccessSimple {
        /// The headline.
        message: String,
    },
    /// An error message with details on how to fix it.
    Error {
        /// The headline.
        message: String,
        /// Extra information shown under the headline.
        details: String,
    },
}

impl Alert {
    /// Render the alert.
    pub fn into_html(self) -> Markup {
        let (container_style, message, details) = match self {
            Alert::Success { message, details } => (SUCCESS_STYLE, message, details),
            Alert::SuccessSimple { message } => (SUCCESS_STYLE, message, String::new()),
            Alert::Error { message, details } => (ERROR_STYLE, message, details),
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div class=(container_style) role="alert"
                {
                    div class="flex items-start justify-between gap-4"
                    {
                        div
                        {
                            p class="font-semibold" { (message) }

                            @if !details.is_empty() {
                                p class="text-sm mt-1" { (details) }
                            }
                        }

                        button
                            type="button"
                            class="text-lg leading-none"
                            aria-label="Cerrar"
                            onclick="this.closest('#alert-container').classList.add('hidden')"
                        {
                            "×"
                        }
                    }
                }
            }
        }
    }
}

const SUCCESS_STYLE: &str = "p-4 rounded shadow-lg text-green-800 bg-green-50 \
    border border-green-300 dark:bg-gray-800 dark:text-green-400 dark:border-green-800";

const ERROR_STYLE: &str = "p-4 rounded shadow-lg text-red-800 bg-red-50 \
    border border-red-300 dark:bg-gray-800 dark:text-red-400 dark:border-red-800";

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}
