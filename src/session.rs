//! The dashboard session: what the user is looking at and the data loaded for it.
//!
//! A [Session] holds the current selection (view, year and month) and the
//! lists fetched from the [ExpenseBackend]. Changing the selection reports
//! which fetches are needed. Fetches run without holding the session lock,
//! so each one is issued a [FetchTicket] and its result is only stored if the
//! ticket is still relevant when the data arrives:
//!
//! - a year scoped fetch is discarded if the selected year changed meanwhile,
//! - any expense fetch is discarded if a mutation was reconciled meanwhile,
//! - a second identical fetch while the first is in flight is not issued.
//!
//! Mutations are reconciled into every cached list by ID through the
//! `apply_*` methods, which are the only place cached lists change.

use std::{
    collections::HashSet,
    sync::{Mutex, MutexGuard},
};

use crate::{
    Error,
    aggregation::SearchCriteria,
    backend::ExpenseBackend,
    expense::{Expense, ExpenseId, Month},
    service::Service,
};

/// The views of the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    /// Every expense, paginated.
    #[default]
    ListAll,
    /// The expenses of the selected year.
    ListByYear,
    /// The chart of the selected year.
    ChartByYear,
    /// The form for adding an expense.
    AddForm,
    /// Searching the expense list.
    Search,
}

/// What the user has selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub view_mode: ViewMode,
    pub year: Option<i32>,
    pub month: Option<Month>,
}

/// The data sets that can be fetched into the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKey {
    Services,
    AllExpenses,
    ExpensesForYear(i32),
}

/// Proof that a fetch was started, used to decide whether its result is still wanted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    key: FetchKey,
    generation: u64,
    epoch: u64,
}

impl FetchTicket {
    /// The data set being fetched.
    pub fn key(&self) -> FetchKey {
        self.key
    }
}

/// The data returned by a fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchedData {
    Services(Vec<Service>),
    Expenses(Vec<Expense>),
}

/// What happened to a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The data was stored in the session.
    Committed,
    /// The selection or the data changed while fetching, so the result was dropped.
    Stale,
    /// An identical fetch was already in flight, so no fetch was made.
    Coalesced,
}

#[derive(Debug, Clone, PartialEq)]
struct YearExpenses {
    year: i32,
    expenses: Vec<Expense>,
}

/// The last search and its results.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults {
    pub criteria: SearchCriteria,
    pub expenses: Vec<Expense>,
}

/// The selection and cached data of the dashboard.
#[derive(Debug, Default)]
pub struct Session {
    selection: Selection,
    /// Incremented when the selected year changes.
    generation: u64,
    /// Incremented when a mutation is reconciled into the cached lists.
    epoch: u64,
    in_flight: HashSet<FetchKey>,
    services: Option<Vec<Service>>,
    all_expenses: Option<Vec<Expense>>,
    year_expenses: Option<YearExpenses>,
    search: Option<SearchResults>,
}

impl Session {
    /// Create an empty session showing the list of all expenses.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current selection.
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Switch to `view_mode` and return the fetches it needs.
    pub fn select_view(&mut self, view_mode: ViewMode) -> Vec<FetchKey> {
        self.selection.view_mode = view_mode;
        self.required_fetches()
    }

    /// Select `year` and return the fetches the current view needs.
    pub fn select_year(&mut self, year: Option<i32>) -> Vec<FetchKey> {
        if self.selection.year != year {
            self.selection.year = year;
            self.generation += 1;
        }

        self.required_fetches()
    }

    /// Select `month` and return the fetches the current view needs.
    ///
    /// Months only filter data that is already loaded.
    pub fn select_month(&mut self, month: Option<Month>) -> Vec<FetchKey> {
        self.selection.month = month;
        self.required_fetches()
    }

    /// The fetches the current selection needs that are not loaded yet.
    pub fn required_fetches(&self) -> Vec<FetchKey> {
        let wanted = match self.selection.view_mode {
            ViewMode::ListAll | ViewMode::Search => vec![FetchKey::AllExpenses],
            ViewMode::ListByYear | ViewMode::ChartByYear => self
                .selection
                .year
                .map(FetchKey::ExpensesForYear)
                .into_iter()
                .collect(),
            ViewMode::AddForm => vec![FetchKey::Services],
        };

        wanted.into_iter().filter(|key| self.needs(*key)).collect()
    }

    /// Whether `key` has not been loaded.
    pub fn needs(&self, key: FetchKey) -> bool {
        match key {
            FetchKey::Services => self.services.is_none(),
            FetchKey::AllExpenses => self.all_expenses.is_none(),
            FetchKey::ExpensesForYear(year) => self.year_expenses(year).is_none(),
        }
    }

    /// Start fetching `key`.
    ///
    /// Returns `None` if the same fetch is already in flight.
    pub fn begin_fetch(&mut self, key: FetchKey) -> Option<FetchTicket> {
        if !self.in_flight.insert(key) {
            tracing::debug!("fetch of {key:?} is already in flight, coalescing");
            return None;
        }

        Some(FetchTicket {
            key,
            generation: self.generation,
            epoch: self.epoch,
        })
    }

    /// Store the result of a fetch if it is still relevant.
    pub fn commit(&mut self, ticket: FetchTicket, data: FetchedData) -> FetchOutcome {
        self.in_flight.remove(&ticket.key);

        if self.is_stale(&ticket) {
            tracing::debug!("discarding stale result for {:?}", ticket.key);
            return FetchOutcome::Stale;
        }

        match (ticket.key, data) {
            (FetchKey::Services, FetchedData::Services(services)) => {
                self.services = Some(services);
            }
            (FetchKey::AllExpenses, FetchedData::Expenses(expenses)) => {
                self.all_expenses = Some(expenses);
            }
            (FetchKey::ExpensesForYear(year), FetchedData::Expenses(expenses)) => {
                self.year_expenses = Some(YearExpenses { year, expenses });
            }
            (key, _) => {
                tracing::error!("fetched data does not match {key:?}, discarding it");
                return FetchOutcome::Stale;
            }
        }

        FetchOutcome::Committed
    }

    /// Release a fetch that failed.
    pub fn abandon(&mut self, ticket: FetchTicket) {
        self.in_flight.remove(&ticket.key);
    }

    fn is_stale(&self, ticket: &FetchTicket) -> bool {
        match ticket.key {
            // Services are read only, so mutations cannot make them stale.
            FetchKey::Services => false,
            FetchKey::AllExpenses => ticket.epoch != self.epoch,
            FetchKey::ExpensesForYear(year) => {
                ticket.epoch != self.epoch
                    || ticket.generation != self.generation
                    || self.selection.year != Some(year)
            }
        }
    }

    /// The services, if loaded.
    pub fn services(&self) -> Option<&[Service]> {
        self.services.as_deref()
    }

    /// Every expense, if loaded.
    pub fn all_expenses(&self) -> Option<&[Expense]> {
        self.all_expenses.as_deref()
    }

    /// The expenses of `year`, if they are the loaded year.
    pub fn year_expenses(&self, year: i32) -> Option<&[Expense]> {
        self.year_expenses
            .as_ref()
            .filter(|loaded| loaded.year == year)
            .map(|loaded| loaded.expenses.as_slice())
    }

    /// The last search, if any.
    pub fn search_results(&self) -> Option<&SearchResults> {
        self.search.as_ref()
    }

    /// Replace the last search.
    pub fn set_search_results(&mut self, criteria: SearchCriteria, expenses: Vec<Expense>) {
        self.search = Some(SearchResults { criteria, expenses });
    }

    /// Add a newly created expense to the lists that should show it.
    pub fn apply_created(&mut self, expense: Expense) {
        self.epoch += 1;

        if let Some(all) = self.all_expenses.as_mut() {
            upsert(all, expense.clone());
            sort_by_date(all);
        }

        if let Some(loaded) = self.year_expenses.as_mut()
            && loaded.year == expense.year
        {
            upsert(&mut loaded.expenses, expense);
            sort_by_date(&mut loaded.expenses);
        }
    }

    /// Replace an updated expense in every list that contains it.
    ///
    /// If the expense moved to another year it leaves the loaded year's list,
    /// and if it moved into the loaded year it joins it.
    pub fn apply_updated(&mut self, expense: Expense) {
        self.epoch += 1;

        if let Some(all) = self.all_expenses.as_mut() {
            upsert(all, expense.clone());
            sort_by_date(all);
        }

        if let Some(loaded) = self.year_expenses.as_mut() {
            if loaded.year == expense.year {
                upsert(&mut loaded.expenses, expense.clone());
                sort_by_date(&mut loaded.expenses);
            } else {
                loaded.expenses.retain(|existing| existing.id != expense.id);
            }
        }

        if let Some(search) = self.search.as_mut()
            && let Some(existing) = search
                .expenses
                .iter_mut()
                .find(|existing| existing.id == expense.id)
        {
            *existing = expense;
        }
    }

    /// Remove a deleted expense from every list.
    pub fn apply_deleted(&mut self, id: ExpenseId) {
        self.epoch += 1;

        if let Some(all) = self.all_expenses.as_mut() {
            all.retain(|expense| expense.id != id);
        }

        if let Some(loaded) = self.year_expenses.as_mut() {
            loaded.expenses.retain(|expense| expense.id != id);
        }

        if let Some(search) = self.search.as_mut() {
            search.expenses.retain(|expense| expense.id != id);
        }
    }

    /// Drop every cached expense list so that it is fetched again.
    pub fn invalidate_expenses(&mut self) {
        self.epoch += 1;
        self.all_expenses = None;
        self.year_expenses = None;
        self.search = None;
    }
}

fn upsert(expenses: &mut Vec<Expense>, expense: Expense) {
    match expenses.iter_mut().find(|existing| existing.id == expense.id) {
        Some(existing) => *existing = expense,
        None => expenses.push(expense),
    }
}

fn sort_by_date(expenses: &mut [Expense]) {
    expenses.sort_by_key(|expense| (expense.year, expense.month, expense.id));
}

/// Lock the session, mapping a poisoned lock to [Error::SessionLockError].
pub fn lock_session(session: &Mutex<Session>) -> Result<MutexGuard<'_, Session>, Error> {
    session
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire session lock: {error}"))
        .map_err(|_| Error::SessionLockError)
}

/// Fetch `key` from `backend` into `session`.
///
/// The session lock is only held to start and to finish the fetch.
///
/// # Errors
/// Returns the backend error if the fetch failed. The session is unchanged
/// apart from releasing the fetch.
pub fn fetch<B: ExpenseBackend>(
    session: &Mutex<Session>,
    backend: &B,
    key: FetchKey,
) -> Result<FetchOutcome, Error> {
    let Some(ticket) = lock_session(session)?.begin_fetch(key) else {
        return Ok(FetchOutcome::Coalesced);
    };

    let data = match key {
        FetchKey::Services => backend.services().map(FetchedData::Services),
        FetchKey::AllExpenses => backend.expenses(None).map(FetchedData::Expenses),
        FetchKey::ExpensesForYear(year) => backend.expenses(Some(year)).map(FetchedData::Expenses),
    };

    match data {
        Ok(data) => Ok(lock_session(session)?.commit(ticket, data)),
        Err(error) => {
            tracing::error!("could not fetch {key:?}: {error}");
            lock_session(session)?.abandon(ticket);
            Err(error)
        }
    }
}

/// Run each fetch in `keys`.
///
/// Returns [FetchOutcome::Committed] only if every fetch committed,
/// otherwise the first outcome that did not.
pub fn fetch_all<B: ExpenseBackend>(
    session: &Mutex<Session>,
    backend: &B,
    keys: Vec<FetchKey>,
) -> Result<FetchOutcome, Error> {
    for key in keys {
        match fetch(session, backend, key)? {
            FetchOutcome::Committed => {}
            outcome => return Ok(outcome),
        }
    }

    Ok(FetchOutcome::Committed)
}

/// Update the selection to what a page shows, then load what it needs.
pub fn select_and_fetch<B: ExpenseBackend>(
    session: &Mutex<Session>,
    backend: &B,
    selection: Selection,
) -> Result<FetchOutcome, Error> {
    let fetches = {
        let mut session = lock_session(session)?;
        session.select_view(selection.view_mode);
        session.select_month(selection.month);
        session.select_year(selection.year)
    };

    fetch_all(session, backend, fetches)
}
