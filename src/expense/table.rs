//! The expense table shared by the list, year and search pages.

use maud::{Markup, html};

use crate::{
    endpoints::{self, format_endpoint},
    expense::Expense,
    html::{
        SERVICE_BADGE_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        edit_delete_action_links, format_currency,
    },
};

/// Render `expenses` as a table with edit and delete actions on each row.
pub(crate) fn expense_table(expenses: &[Expense]) -> Markup {
    html! {
        div class="relative overflow-x-auto shadow-md sm:rounded-lg w-full"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Servicio" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Año" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Mes" }
                        th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Importe" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Acciones" }
                    }
                }

                tbody
                {
                    @for expense in expenses {
                        (expense_row(expense))
                    }

                    @if expenses.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td colspan="5" class={(TABLE_CELL_STYLE) " text-center"}
                            {
                                "No hay gastos para mostrar."
                            }
                        }
                    }
                }
            }
        }
    }
}

fn expense_row(expense: &Expense) -> Markup {
    let edit_url = format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense.id);
    let delete_url = format_endpoint(endpoints::DELETE_EXPENSE, expense.id);
    let service_name = expense.service_display_name();
    let confirm_message = format!(
        "¿Eliminar el gasto de {service_name} de {} {}?",
        expense.month, expense.year
    );

    html! {
        tr class=(TABLE_ROW_STYLE) data-expense-id=(expense.id)
        {
            td class=(TABLE_CELL_STYLE)
            {
                span class=(SERVICE_BADGE_STYLE) { (service_name) }
            }
            td class=(TABLE_CELL_STYLE) { (expense.year) }
            td class=(TABLE_CELL_STYLE) { (expense.month) }
            td class={(TABLE_CELL_STYLE) " text-right font-mono"} { (format_currency(expense.amount)) }
            td class={(TABLE_CELL_STYLE) " space-x-3"}
            {
                (edit_delete_action_links(&edit_url, &delete_url, &confirm_message, "closest tr"))
            }
        }
    }
}
