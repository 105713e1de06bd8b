//! The data access layer used by the dashboard session and the mutation coordinator.
//!
//! [ExpenseBackend] bundles every lookup, aggregate and mutation the dashboard
//! needs so that callers do not depend on how the data is stored.
//! [SqliteBackend] implements it with the functions in [crate::expense] and
//! [crate::service].

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::{
    Error,
    amount::Amount,
    expense::{
        AnnualServiceTotal, Expense, ExpenseId, ExpenseRow, Month, MonthlyServiceTotal,
        NewExpense, ServiceTotal, YearTotal, db,
    },
    service::{Service, ServiceId, get_all_services, get_service},
};

/// The operations the dashboard needs from the store that owns the expense data.
pub trait ExpenseBackend {
    /// Every service, ordered by ID.
    fn services(&self) -> Result<Vec<Service>, Error>;

    /// A single service.
    fn service(&self, id: ServiceId) -> Result<Service, Error>;

    /// Every expense, or only those of `year`, ordered by year, month and ID.
    fn expenses(&self, year: Option<i32>) -> Result<Vec<Expense>, Error>;

    /// A single expense.
    fn expense(&self, id: ExpenseId) -> Result<Expense, Error>;

    /// One page of expenses, optionally restricted to a year and month.
    fn expense_page(
        &self,
        year: Option<i32>,
        month: Option<Month>,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Expense>, Error>;

    /// The years with expenses, most recent first.
    fn expense_years(&self) -> Result<Vec<i32>, Error>;

    /// The months of `year` with expenses.
    fn expense_months(&self, year: i32) -> Result<Vec<Month>, Error>;

    /// The total per service for a year or one month of it.
    fn totals_by_service(&self, year: i32, month: Option<Month>)
    -> Result<Vec<ServiceTotal>, Error>;

    /// The total per year and service.
    fn annual_totals(&self) -> Result<Vec<AnnualServiceTotal>, Error>;

    /// The total per year.
    fn global_annual_totals(&self) -> Result<Vec<YearTotal>, Error>;

    /// The total per year, month and service.
    fn monthly_totals(&self) -> Result<Vec<MonthlyServiceTotal>, Error>;

    /// Store a new expense.
    fn insert_expense(&self, expense: &NewExpense) -> Result<ExpenseRow, Error>;

    /// Replace every field of an expense.
    fn update_expense(&self, id: ExpenseId, expense: &NewExpense) -> Result<ExpenseRow, Error>;

    /// Replace the amount of an expense.
    fn update_expense_amount(&self, id: ExpenseId, amount: Amount) -> Result<ExpenseRow, Error>;

    /// Remove an expense.
    fn delete_expense(&self, id: ExpenseId) -> Result<(), Error>;

    /// The first expense for a service in a given month, if any.
    fn find_existing_expense(
        &self,
        service_id: ServiceId,
        year: i32,
        month: Month,
    ) -> Result<Option<ExpenseRow>, Error>;

    /// Copy the services used in `base_year` into the following years.
    fn extend_years(&self, base_year: i32, year_count: u32) -> Result<usize, Error>;
}

/// An [ExpenseBackend] over a shared SQLite connection.
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteBackend {
    /// Create a backend that shares `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)
    }
}

impl ExpenseBackend for SqliteBackend {
    fn services(&self) -> Result<Vec<Service>, Error> {
        get_all_services(&*self.lock()?)
    }

    fn service(&self, id: ServiceId) -> Result<Service, Error> {
        get_service(id, &*self.lock()?)
    }

    fn expenses(&self, year: Option<i32>) -> Result<Vec<Expense>, Error> {
        let connection = self.lock()?;

        match year {
            Some(year) => db::get_expenses_for_year(year, &connection),
            None => db::get_all_expenses(&connection),
        }
    }

    fn expense(&self, id: ExpenseId) -> Result<Expense, Error> {
        db::get_expense(id, &*self.lock()?)
    }

    fn expense_page(
        &self,
        year: Option<i32>,
        month: Option<Month>,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Expense>, Error> {
        db::get_expense_page(year, month, limit, offset, &*self.lock()?)
    }

    fn expense_years(&self) -> Result<Vec<i32>, Error> {
        db::get_expense_years(&*self.lock()?)
    }

    fn expense_months(&self, year: i32) -> Result<Vec<Month>, Error> {
        db::get_months_for_year(year, &*self.lock()?)
    }

    fn totals_by_service(
        &self,
        year: i32,
        month: Option<Month>,
    ) -> Result<Vec<ServiceTotal>, Error> {
        db::get_totals_by_service(year, month, &*self.lock()?)
    }

    fn annual_totals(&self) -> Result<Vec<AnnualServiceTotal>, Error> {
        db::get_annual_totals(&*self.lock()?)
    }

    fn global_annual_totals(&self) -> Result<Vec<YearTotal>, Error> {
        db::get_global_annual_totals(&*self.lock()?)
    }

    fn monthly_totals(&self) -> Result<Vec<MonthlyServiceTotal>, Error> {
        db::get_monthly_totals(&*self.lock()?)
    }

    fn insert_expense(&self, expense: &NewExpense) -> Result<ExpenseRow, Error> {
        db::insert_expense(expense, &*self.lock()?)
    }

    fn update_expense(&self, id: ExpenseId, expense: &NewExpense) -> Result<ExpenseRow, Error> {
        db::update_expense(id, expense, &*self.lock()?)
    }

    fn update_expense_amount(&self, id: ExpenseId, amount: Amount) -> Result<ExpenseRow, Error> {
        db::update_expense_amount(id, amount, &*self.lock()?)
    }

    fn delete_expense(&self, id: ExpenseId) -> Result<(), Error> {
        db::delete_expense(id, &*self.lock()?)
    }

    fn find_existing_expense(
        &self,
        service_id: ServiceId,
        year: i32,
        month: Month,
    ) -> Result<Option<ExpenseRow>, Error> {
        db::find_existing_expense(service_id, year, month, &*self.lock()?)
    }

    fn extend_years(&self, base_year: i32, year_count: u32) -> Result<usize, Error> {
        db::extend_years(base_year, year_count, &*self.lock()?)
    }
}
