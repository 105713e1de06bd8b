//! Expenses (gastos): the records, their queries and the pages for managing them.

mod by_year;
mod create;
pub(crate) mod db;
mod delete;
mod domain;
mod edit;
mod extend;
mod form;
mod list;
mod search;
mod table;

pub use by_year::{YearQuery, get_expenses_by_year_page};
pub(crate) use by_year::{resolve_year, year_selector};
pub use create::{create_expense_endpoint, get_new_expense_page, update_expense_amount_endpoint};
pub use db::{
    AnnualServiceTotal, MonthlyServiceTotal, ServiceTotal, YearTotal, create_expense_table,
};
pub use delete::delete_expense_endpoint;
pub(crate) use domain::parse_whole_number;
pub use domain::{Expense, ExpenseForm, ExpenseId, ExpenseRow, Month, NewExpense};
pub use edit::{get_edit_expense_page, update_expense_endpoint};
pub use extend::extend_years_endpoint;
pub use list::get_expenses_page;
pub use search::get_search_page;
