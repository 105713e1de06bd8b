//! The header with the dashboard's view tabs, shown at the top of every page.

use maud::{Markup, html};

use crate::endpoints;

const TAB_STYLE: &str = "inline-flex items-center gap-1.5 rounded-md border-2 \
    border-sky-400 px-4 py-2 text-sm font-semibold text-gray-200 \
    hover:bg-sky-400/10 focus:outline-none focus:ring-2 focus:ring-sky-300";

const ACTIVE_TAB_STYLE: &str = "inline-flex items-center gap-1.5 rounded-md border-2 \
    border-sky-400 bg-sky-400 px-4 py-2 text-sm font-semibold text-gray-900 \
    focus:outline-none focus:ring-2 focus:ring-sky-300";

/// One tab of the header.
///
/// Only one tab should be current at any one time.
struct Tab<'a> {
    url: &'a str,
    icon: &'a str,
    title: &'a str,
    is_current: bool,
}

impl Tab<'_> {
    fn into_html(self) -> Markup {
        let style = if self.is_current {
            ACTIVE_TAB_STYLE
        } else {
            TAB_STYLE
        };

        html! {
            li {
                a
                    href=(self.url)
                    class=(style)
                    aria-current=[self.is_current.then_some("page")]
                {
                    span aria-hidden="true" { (self.icon) }
                    span { (self.title) }
                }
            }
        }
    }
}

pub struct NavBar<'a> {
    tabs: Vec<Tab<'a>>,
}

impl NavBar<'_> {
    /// Get the header for a page.
    ///
    /// The tab whose URL equals `active_endpoint` is marked as the current page.
    pub fn new(active_endpoint: &str) -> NavBar<'_> {
        let tabs = [
            (endpoints::EXPENSES_VIEW, "📋", "Todos"),
            (endpoints::EXPENSES_BY_YEAR_VIEW, "📅", "Por año"),
            (endpoints::CHART_VIEW, "📊", "Gráfico"),
            (endpoints::TOTALS_VIEW, "💵", "Totales"),
            (endpoints::SEARCH_VIEW, "🔍", "Buscar"),
            (endpoints::NEW_EXPENSE_VIEW, "➕", "Agregar"),
        ]
        .into_iter()
        .map(|(url, icon, title)| Tab {
            url,
            icon,
            title,
            is_current: active_endpoint == url,
        })
        .collect();

        NavBar { tabs }
    }

    pub fn into_html(self) -> Markup {
        html! {
            header class="mb-6 bg-gray-800 px-8 py-4 shadow-md"
            {
                div class="mx-auto flex max-w-screen-xl flex-wrap items-center justify-between gap-4"
                {
                    a href=(endpoints::ROOT) class="text-2xl font-bold tracking-tight text-sky-400"
                    {
                        "💰 Dashboard de Gastos"
                    }

                    nav aria-label="Vistas"
                    {
                        ul class="flex flex-wrap gap-2"
                        {
                            @for tab in self.tabs {
                                (tab.into_html())
                            }
                        }
                    }
                }
            }
        }
    }
}
