//! The expense form shared by the create and edit pages.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    amount::Amount,
    endpoints::{self, format_endpoint},
    expense::{Expense, ExpenseForm, Month},
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        format_currency, link,
    },
    service::Service,
};

/// The HTTP method the form is submitted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FormMethod {
    Post,
    Put,
}

/// Everything needed to render the expense form.
pub(crate) struct ExpenseFormView<'a> {
    pub endpoint: &'a str,
    pub method: FormMethod,
    pub services: &'a [Service],
    pub values: &'a ExpenseForm,
    pub submit_label: &'a str,
    pub error_message: &'a str,
}

impl ExpenseFormView<'_> {
    pub(crate) fn into_html(self) -> Markup {
        let (hx_post, hx_put) = match self.method {
            FormMethod::Post => (Some(self.endpoint), None),
            FormMethod::Put => (None, Some(self.endpoint)),
        };
        let selected_service = self.values.service_id.trim();
        let selected_month = self.values.month.trim();

        html! {
            form
                hx-post=[hx_post]
                hx-put=[hx_put]
                hx-swap="outerHTML"
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                div
                {
                    label for="service_id" class=(FORM_LABEL_STYLE) { "Servicio" }

                    select
                        id="service_id"
                        name="service_id"
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="" disabled selected[selected_service.is_empty()] { "Elija un servicio" }

                        @for service in self.services {
                            @let id = service.id.to_string();
                            option value=(id) selected[id == selected_service]
                            {
                                (service.display_name())
                            }
                        }
                    }
                }

                div class="grid grid-cols-2 gap-4"
                {
                    div
                    {
                        label for="year" class=(FORM_LABEL_STYLE) { "Año" }

                        input
                            id="year"
                            type="number"
                            name="year"
                            step="1"
                            required
                            value=(self.values.year)
                            class=(FORM_TEXT_INPUT_STYLE);
                    }

                    div
                    {
                        label for="month" class=(FORM_LABEL_STYLE) { "Mes" }

                        select id="month" name="month" required class=(FORM_TEXT_INPUT_STYLE)
                        {
                            option value="" disabled selected[selected_month.is_empty()] { "Elija un mes" }

                            @for month in Month::all() {
                                @let number = month.number().to_string();
                                option value=(number) selected[number == selected_month] { (month) }
                            }
                        }
                    }
                }

                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Importe" }

                    div class="input-wrapper"
                    {
                        input
                            id="amount"
                            type="number"
                            name="amount"
                            step="0.01"
                            min="0"
                            placeholder="0.00"
                            required
                            value=(self.values.amount)
                            class=(FORM_TEXT_INPUT_STYLE);
                    }
                }

                @if !self.error_message.is_empty() {
                    p class="text-red-600 dark:text-red-400"
                    {
                        (self.error_message)
                    }
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { (self.submit_label) }
            }
        }
    }
}

/// The form that replaces only the amount of an expense.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmountForm {
    pub amount: String,
}

/// Offer to update an existing expense instead of creating a duplicate.
pub(crate) fn duplicate_confirmation_view(existing: &Expense, proposed_amount: Amount) -> Markup {
    let endpoint = format_endpoint(endpoints::PUT_EXPENSE_AMOUNT, existing.id);

    html! {
        form
            hx-put=(endpoint)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            p class="text-gray-900 dark:text-white"
            {
                "Ya existe un gasto de " strong { (existing.service_display_name()) }
                " para " (existing.month) " de " (existing.year)
                " por " strong { (format_currency(existing.amount)) } "."
            }

            p class="text-gray-900 dark:text-white"
            {
                "¿Desea actualizar su importe a " strong { (format_currency(proposed_amount)) } "?"
            }

            input type="hidden" name="amount" value=(proposed_amount);

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Actualizar importe" }

            a href=(endpoints::NEW_EXPENSE_VIEW) class=(BUTTON_SECONDARY_STYLE)
            {
                "Cancelar"
            }

            p class="text-sm text-gray-600 dark:text-gray-400"
            {
                "También puede " (link(&format_endpoint(endpoints::EDIT_EXPENSE_VIEW, existing.id), "editar el gasto existente")) "."
            }
        }
    }
}
