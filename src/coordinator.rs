//! Creating, updating and deleting expenses.
//!
//! The [MutationCoordinator] validates a mutation, sends it to the backend and,
//! only once the backend accepted it, reconciles the cached lists of the
//! [Session]. A mutation that fails leaves the session untouched.

use std::sync::Mutex;

use crate::{
    Error,
    amount::Amount,
    backend::ExpenseBackend,
    config::{DashboardConfig, DuplicatePolicy, YearBounds},
    expense::{Expense, ExpenseId, NewExpense},
    service::{Service, ServiceId},
    session::{FetchKey, FetchOutcome, Session, fetch, lock_session},
};

/// The most years that can be added in one go.
pub const MAX_EXTEND_YEARS: u32 = 10;

/// The result of asking to create an expense.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    /// The expense was created.
    Created(Expense),
    /// An expense already exists for the same service and month, so nothing
    /// was created. The user may choose to update its amount instead.
    DuplicateFound {
        existing: Expense,
        proposed_amount: Amount,
    },
}

/// Whether the user confirmed a deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteConfirmation {
    Confirmed,
    Unconfirmed,
}

impl From<bool> for DeleteConfirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Self::Confirmed
        } else {
            Self::Unconfirmed
        }
    }
}

/// Sends mutations to the backend and reconciles the session afterwards.
pub struct MutationCoordinator<'a, B> {
    backend: &'a B,
    duplicate_policy: DuplicatePolicy,
    year_bounds: YearBounds,
}

impl<'a, B: ExpenseBackend> MutationCoordinator<'a, B> {
    /// Create a coordinator for `backend` with the settings in `config`.
    pub fn new(backend: &'a B, config: &DashboardConfig) -> Self {
        Self {
            backend,
            duplicate_policy: config.duplicate_policy,
            year_bounds: config.year_bounds,
        }
    }

    /// Create an expense.
    ///
    /// Under [DuplicatePolicy::ConfirmUpdate], nothing is created if the
    /// service already has an expense in the same month; the existing expense
    /// is returned instead.
    ///
    /// # Errors
    /// Returns a validation error if `new_expense` is out of range or refers
    /// to an unknown service, or the backend error if the insert failed.
    pub fn create(
        &self,
        session: &Mutex<Session>,
        new_expense: NewExpense,
    ) -> Result<CreateOutcome, Error> {
        new_expense.validate(&self.year_bounds)?;
        let service_name = self.service_name(session, new_expense.service_id)?;

        if self.duplicate_policy == DuplicatePolicy::ConfirmUpdate
            && let Some(existing) = self.backend.find_existing_expense(
                new_expense.service_id,
                new_expense.year,
                new_expense.month,
            )?
        {
            tracing::info!(
                "expense {} already exists for service {} in {}/{}",
                existing.id,
                new_expense.service_id,
                new_expense.month.number(),
                new_expense.year
            );

            return Ok(CreateOutcome::DuplicateFound {
                existing: existing.with_service_name(service_name),
                proposed_amount: new_expense.amount,
            });
        }

        let expense = self
            .backend
            .insert_expense(&new_expense)?
            .with_service_name(service_name);

        tracing::info!("created expense {}", expense.id);
        lock_session(session)?.apply_created(expense.clone());

        Ok(CreateOutcome::Created(expense))
    }

    /// Change only the amount of an existing expense.
    ///
    /// This is how a duplicate found by [MutationCoordinator::create] is resolved.
    pub fn update_existing_amount(
        &self,
        session: &Mutex<Session>,
        id: ExpenseId,
        amount: Amount,
    ) -> Result<Expense, Error> {
        if amount.is_negative() {
            return Err(Error::NegativeAmount(amount));
        }
        amount.within_limit()?;

        let row = self.backend.update_expense_amount(id, amount)?;
        let expense = match self.service_name(session, row.service_id) {
            Ok(service_name) => row.with_service_name(service_name),
            // The update was accepted, so reload the record rather than report a failure.
            Err(_) => self.backend.expense(id)?,
        };

        tracing::info!("updated the amount of expense {id}");
        lock_session(session)?.apply_updated(expense.clone());

        Ok(expense)
    }

    /// Replace every field of an expense.
    pub fn update(
        &self,
        session: &Mutex<Session>,
        id: ExpenseId,
        new_expense: NewExpense,
    ) -> Result<Expense, Error> {
        new_expense.validate(&self.year_bounds)?;
        let service_name = self.service_name(session, new_expense.service_id)?;

        let expense = self
            .backend
            .update_expense(id, &new_expense)?
            .with_service_name(service_name);

        tracing::info!("updated expense {id}");
        lock_session(session)?.apply_updated(expense.clone());

        Ok(expense)
    }

    /// Delete an expense.
    ///
    /// # Errors
    /// Returns [Error::DeleteNotConfirmed] without contacting the backend if
    /// the deletion was not confirmed.
    pub fn delete(
        &self,
        session: &Mutex<Session>,
        id: ExpenseId,
        confirmation: DeleteConfirmation,
    ) -> Result<(), Error> {
        if confirmation == DeleteConfirmation::Unconfirmed {
            return Err(Error::DeleteNotConfirmed);
        }

        self.backend.delete_expense(id)?;

        tracing::info!("deleted expense {id}");
        lock_session(session)?.apply_deleted(id);

        Ok(())
    }

    /// Add zero amount expenses for the services used in `base_year` to each
    /// of the following `year_count` years.
    ///
    /// Returns the number of expenses added. The cached lists are dropped
    /// rather than reconciled.
    pub fn extend_years(
        &self,
        session: &Mutex<Session>,
        base_year: i32,
        year_count: u32,
    ) -> Result<usize, Error> {
        if !(1..=MAX_EXTEND_YEARS).contains(&year_count) {
            return Err(Error::InvalidYearCount(year_count));
        }

        self.year_bounds.check(i64::from(base_year))?;
        self.year_bounds
            .check(i64::from(base_year) + i64::from(year_count))?;

        let inserted = self.backend.extend_years(base_year, year_count)?;

        tracing::info!("extended {year_count} years from {base_year}, adding {inserted} expenses");
        if inserted > 0 {
            lock_session(session)?.invalidate_expenses();
        }

        Ok(inserted)
    }

    /// Look up the name of a service among the known services.
    fn service_name(
        &self,
        session: &Mutex<Session>,
        service_id: ServiceId,
    ) -> Result<String, Error> {
        let cached = lock_session(session)?
            .services()
            .map(|services| find_service_name(services, service_id));

        if let Some(name) = cached {
            return name;
        }

        match fetch(session, self.backend, FetchKey::Services)? {
            FetchOutcome::Committed => {
                let session = lock_session(session)?;
                let services = session.services().unwrap_or_default();
                find_service_name(services, service_id)
            }
            // Another request is loading the services, so read this one directly.
            FetchOutcome::Coalesced | FetchOutcome::Stale => match self.backend.service(service_id) {
                Ok(service) => Ok(service.name),
                Err(Error::NotFound) => Err(Error::UnknownService(service_id)),
                Err(error) => Err(error),
            },
        }
    }
}

fn find_service_name(services: &[Service], service_id: ServiceId) -> Result<String, Error> {
    services
        .iter()
        .find(|service| service.id == service_id)
        .map(|service| service.name.clone())
        .ok_or(Error::UnknownService(service_id))
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, atomic::Ordering};

    use crate::{
        Error,
        aggregation::month_service_matrix,
        amount::Amount,
        backend::{
            ExpenseBackend,
            test_backends::{FailingWrites, sqlite_backend},
        },
        config::{DashboardConfig, DuplicatePolicy, YearBounds},
        expense::{Expense, Month, NewExpense},
        session::{FetchKey, Session, ViewMode, fetch},
    };

    use super::{CreateOutcome, DeleteConfirmation, MutationCoordinator};

    fn config(duplicate_policy: DuplicatePolicy) -> DashboardConfig {
        DashboardConfig {
            duplicate_policy,
            year_bounds: YearBounds {
                min: 2000,
                max: 2035,
            },
        }
    }

    fn new_expense(service_id: i64, year: i32, month: i64, cents: i64) -> NewExpense {
        NewExpense {
            service_id,
            year,
            month: Month::new(month).unwrap(),
            amount: Amount::from_cents(cents),
        }
    }

    /// A session viewing 2024 with every list loaded.
    fn loaded_session<B: ExpenseBackend>(backend: &B) -> Mutex<Session> {
        let session = Mutex::new(Session::new());
        {
            let mut guard = session.lock().unwrap();
            guard.select_view(ViewMode::ListByYear);
            guard.select_year(Some(2024));
        }
        for key in [
            FetchKey::Services,
            FetchKey::AllExpenses,
            FetchKey::ExpensesForYear(2024),
        ] {
            fetch(&session, backend, key).unwrap();
        }
        session
    }

    fn snapshot(session: &Mutex<Session>) -> (Vec<Expense>, Vec<Expense>) {
        let session = session.lock().unwrap();
        (
            session.all_expenses().unwrap().to_vec(),
            session.year_expenses(2024).unwrap().to_vec(),
        )
    }

    fn created(outcome: Result<CreateOutcome, Error>) -> Expense {
        match outcome {
            Ok(CreateOutcome::Created(expense)) => expense,
            other => panic!("want created expense, got {other:?}"),
        }
    }

    #[test]
    fn create_attaches_service_name_and_reconciles() {
        let backend = sqlite_backend();
        let session = loaded_session(&backend);
        let coordinator = MutationCoordinator::new(&backend, &config(DuplicatePolicy::Allow));

        let expense = created(coordinator.create(&session, new_expense(1, 2024, 3, 10_000)));

        assert_eq!(expense.service_name, "GAS");
        let (all, year) = snapshot(&session);
        assert_eq!(all, [expense.clone()]);
        assert_eq!(year, [expense]);
    }

    #[test]
    fn create_then_delete_updates_month_matrix() {
        let backend = sqlite_backend();
        let session = loaded_session(&backend);
        let coordinator = MutationCoordinator::new(&backend, &config(DuplicatePolicy::Allow));

        let gas = created(coordinator.create(&session, new_expense(1, 2024, 3, 10_000)));
        created(coordinator.create(&session, new_expense(2, 2024, 3, 5_000)));

        let (_, year) = snapshot(&session);
        let matrix = month_service_matrix(2024, &year);
        assert_eq!(matrix.months[2].totals.get("GAS"), Amount::from_cents(10_000));
        assert_eq!(matrix.months[2].totals.get("LUZ"), Amount::from_cents(5_000));

        coordinator
            .delete(&session, gas.id, DeleteConfirmation::Confirmed)
            .unwrap();

        let (_, year) = snapshot(&session);
        let matrix = month_service_matrix(2024, &year);
        assert_eq!(matrix.months[2].totals.get("GAS"), Amount::zero());
        assert_eq!(matrix.months[2].totals.get("LUZ"), Amount::from_cents(5_000));
    }

    #[test]
    fn duplicate_offers_update_instead() {
        let backend = sqlite_backend();
        let session = loaded_session(&backend);
        let coordinator =
            MutationCoordinator::new(&backend, &config(DuplicatePolicy::ConfirmUpdate));
        let existing = created(coordinator.create(&session, new_expense(1, 2024, 3, 10_000)));

        let outcome = coordinator.create(&session, new_expense(1, 2024, 3, 12_000));

        assert_eq!(
            outcome,
            Ok(CreateOutcome::DuplicateFound {
                existing: existing.clone(),
                proposed_amount: Amount::from_cents(12_000),
            })
        );
        assert_eq!(backend.expenses(None).unwrap().len(), 1);

        let updated = coordinator
            .update_existing_amount(&session, existing.id, Amount::from_cents(12_000))
            .unwrap();

        assert_eq!(updated.amount, Amount::from_cents(12_000));
        let (all, year) = snapshot(&session);
        assert_eq!(all, [updated.clone()]);
        assert_eq!(year, [updated]);
    }

    #[test]
    fn allow_policy_creates_duplicates() {
        let backend = sqlite_backend();
        let session = loaded_session(&backend);
        let coordinator = MutationCoordinator::new(&backend, &config(DuplicatePolicy::Allow));

        created(coordinator.create(&session, new_expense(1, 2024, 3, 10_000)));
        created(coordinator.create(&session, new_expense(1, 2024, 3, 10_000)));

        assert_eq!(snapshot(&session).0.len(), 2);
    }

    #[test]
    fn create_rejects_unknown_service_before_backend() {
        let backend = FailingWrites::new(sqlite_backend());
        let session = loaded_session(&backend);
        let coordinator = MutationCoordinator::new(&backend, &config(DuplicatePolicy::Allow));

        let result = coordinator.create(&session, new_expense(9, 2024, 3, 1));

        assert_eq!(result, Err(Error::UnknownService(9)));
        assert_eq!(backend.write_attempts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn create_rejects_out_of_range_year_before_backend() {
        let backend = FailingWrites::new(sqlite_backend());
        let session = loaded_session(&backend);
        let coordinator = MutationCoordinator::new(&backend, &config(DuplicatePolicy::Allow));

        let result = coordinator.create(&session, new_expense(1, 1999, 3, 1));

        assert!(matches!(result, Err(Error::InvalidYear { year: 1999, .. })));
        assert_eq!(backend.write_attempts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failed_mutations_leave_lists_unchanged() {
        let inner = sqlite_backend();
        let seeded = MutationCoordinator::new(&inner, &config(DuplicatePolicy::Allow));
        let scratch = Mutex::new(Session::new());
        let existing = created(seeded.create(&scratch, new_expense(1, 2024, 3, 10_000)));

        let backend = FailingWrites::new(inner);
        let session = loaded_session(&backend);
        let before = snapshot(&session);
        let coordinator = MutationCoordinator::new(&backend, &config(DuplicatePolicy::Allow));

        assert!(
            coordinator
                .create(&session, new_expense(2, 2024, 4, 1))
                .is_err()
        );
        assert!(
            coordinator
                .update(&session, existing.id, new_expense(1, 2024, 3, 5))
                .is_err()
        );
        assert!(
            coordinator
                .update_existing_amount(&session, existing.id, Amount::from_cents(5))
                .is_err()
        );
        assert!(
            coordinator
                .delete(&session, existing.id, DeleteConfirmation::Confirmed)
                .is_err()
        );
        assert!(coordinator.extend_years(&session, 2024, 1).is_err());

        assert_eq!(snapshot(&session), before);
        assert_eq!(backend.write_attempts.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn update_replaces_record_in_every_list() {
        let backend = sqlite_backend();
        let session = loaded_session(&backend);
        let coordinator = MutationCoordinator::new(&backend, &config(DuplicatePolicy::Allow));
        let expense = created(coordinator.create(&session, new_expense(1, 2024, 3, 10_000)));

        let updated = coordinator
            .update(&session, expense.id, new_expense(2, 2024, 5, 7_500))
            .unwrap();

        assert_eq!(updated.service_name, "LUZ");
        let (all, year) = snapshot(&session);
        assert_eq!(all, [updated.clone()]);
        assert_eq!(year, [updated]);
    }

    #[test]
    fn unconfirmed_delete_is_rejected() {
        let backend = FailingWrites::new(sqlite_backend());
        let session = loaded_session(&backend);
        let coordinator = MutationCoordinator::new(&backend, &config(DuplicatePolicy::Allow));

        let result = coordinator.delete(&session, 1, DeleteConfirmation::Unconfirmed);

        assert_eq!(result, Err(Error::DeleteNotConfirmed));
        assert_eq!(backend.write_attempts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn extend_years_invalidates_cached_lists() {
        let backend = sqlite_backend();
        let session = loaded_session(&backend);
        let coordinator = MutationCoordinator::new(&backend, &config(DuplicatePolicy::Allow));
        created(coordinator.create(&session, new_expense(1, 2024, 3, 10_000)));

        let inserted = coordinator.extend_years(&session, 2024, 1).unwrap();

        assert_eq!(inserted, 12);
        assert!(session.lock().unwrap().needs(FetchKey::AllExpenses));
    }

    #[test]
    fn extend_years_checks_count_and_bounds() {
        let backend = sqlite_backend();
        let session = loaded_session(&backend);
        let coordinator = MutationCoordinator::new(&backend, &config(DuplicatePolicy::Allow));

        assert_eq!(
            coordinator.extend_years(&session, 2024, 0),
            Err(Error::InvalidYearCount(0))
        );
        assert_eq!(
            coordinator.extend_years(&session, 2024, 11),
            Err(Error::InvalidYearCount(11))
        );
        assert_eq!(
            coordinator.extend_years(&session, 2030, 10),
            Err(Error::InvalidYear {
                year: 2040,
                min: 2000,
                max: 2035
            })
        );
    }
}
