//! Table views for the dashboard totals.

use maud::{Markup, html};

use crate::{
    aggregation::{MonthServiceMatrix, YearServiceMatrix},
    html::{TABLE_CELL_STYLE, TABLE_ROW_STYLE, format_currency},
    service::display_name,
};

const TABLE_HEADER_CELL_STYLE: &str = "px-3 py-3 text-right min-w-[100px]";
const TABLE_HEADER_FIRST_CELL_STYLE: &str =
    "px-3 py-3 sticky left-0 bg-gray-100 dark:bg-gray-700 z-10 font-semibold";
const TABLE_STICKY_CELL_STYLE: &str = "px-3 py-4 font-medium text-gray-900 dark:text-white sticky left-0 bg-white dark:bg-gray-800 z-10";
const TABLE_DATA_CELL_STYLE: &str = "text-right whitespace-nowrap";
const TABLE_TOTAL_ROW_STYLE: &str =
    "bg-gray-100 dark:bg-gray-700 font-semibold text-gray-900 dark:text-white";

fn table_header(first_column: &str, services: &[String]) -> Markup {
    html! {
        thead class="text-xs text-gray-900 uppercase bg-gray-100 dark:bg-gray-700 dark:text-gray-400"
        {
            tr
            {
                th scope="col" class={(TABLE_HEADER_FIRST_CELL_STYLE) " text-left"} { (first_column) }

                @for service in services {
                    th scope="col" class=(TABLE_HEADER_CELL_STYLE) { (display_name(service)) }
                }

                th scope="col" class={(TABLE_HEADER_CELL_STYLE) " font-bold"} { "Total" }
            }
        }
    }
}

/// Renders the totals of one year by month (rows) and service (columns).
///
/// Every month gets a row, with zero where there are no expenses, followed by
/// a row of per-service totals.
pub(super) fn month_service_table(matrix: &MonthServiceMatrix) -> Markup {
    let service_totals = matrix.service_totals();

    html! {
        div class="overflow-x-auto rounded-lg shadow"
        {
            table id="month-service-table" class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                (table_header("Mes", &matrix.services))

                tbody
                {
                    @for month in &matrix.months {
                        tr class=(TABLE_ROW_STYLE) data-month=(month.month.number())
                        {
                            th scope="row" class={(TABLE_STICKY_CELL_STYLE) " text-left"} { (month.month) }

                            @for service in &matrix.services {
                                td class={(TABLE_CELL_STYLE) " " (TABLE_DATA_CELL_STYLE)}
                                {
                                    (format_currency(month.totals.get(service)))
                                }
                            }

                            td class={(TABLE_CELL_STYLE) " " (TABLE_DATA_CELL_STYLE) " font-bold"}
                            {
                                (format_currency(month.total_for_month()))
                            }
                        }
                    }
                }

                tfoot
                {
                    tr class=(TABLE_TOTAL_ROW_STYLE)
                    {
                        th scope="row" class="px-3 py-4 text-left" { "Total" }

                        @for (_, total) in service_totals.iter() {
                            td class={(TABLE_CELL_STYLE) " " (TABLE_DATA_CELL_STYLE)} { (format_currency(total)) }
                        }

                        td class={(TABLE_CELL_STYLE) " " (TABLE_DATA_CELL_STYLE)} data-grand-total
                        {
                            (format_currency(matrix.grand_total()))
                        }
                    }
                }
            }
        }
    }
}

/// Renders the totals by year (rows) and service (columns).
///
/// The last column doubles as the global total of each year.
pub(super) fn year_service_table(matrix: &YearServiceMatrix) -> Markup {
    html! {
        div class="overflow-x-auto rounded-lg shadow"
        {
            table id="year-service-table" class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                (table_header("Año", &matrix.services))

                tbody
                {
                    @for annual in &matrix.years {
                        tr class=(TABLE_ROW_STYLE) data-year=(annual.year)
                        {
                            th scope="row" class={(TABLE_STICKY_CELL_STYLE) " text-left"} { (annual.year) }

                            @for service in &matrix.services {
                                td class={(TABLE_CELL_STYLE) " " (TABLE_DATA_CELL_STYLE)}
                                {
                                    (format_currency(annual.totals.get(service)))
                                }
                            }

                            td class={(TABLE_CELL_STYLE) " " (TABLE_DATA_CELL_STYLE) " font-bold"} data-year-total
                            {
                                (format_currency(annual.totals.total()))
                            }
                        }
                    }
                }
            }
        }
    }
}
