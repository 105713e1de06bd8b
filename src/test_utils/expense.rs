use crate::{
    amount::Amount,
    backend::ExpenseBackend,
    expense::{Expense, ExpenseRow, Month, NewExpense},
};

/// Store an expense of `cents` for a service and month.
#[track_caller]
pub(crate) fn insert_expense(
    backend: &impl ExpenseBackend,
    service_id: i64,
    year: i32,
    month: i64,
    cents: i64,
) -> ExpenseRow {
    backend
        .insert_expense(&NewExpense {
            service_id,
            year,
            month: Month::new(month).expect("Invalid month"),
            amount: Amount::from_cents(cents),
        })
        .expect("Could not insert expense")
}

/// An expense that only exists in memory, with `id` doubling as the service ID.
pub(crate) fn expense(id: i64, service_name: &str, year: i32, month: i64, cents: i64) -> Expense {
    Expense {
        id,
        service_id: id,
        service_name: service_name.to_owned(),
        year,
        month: Month::new(month).expect("Invalid month"),
        amount: Amount::from_cents(cents),
    }
}
