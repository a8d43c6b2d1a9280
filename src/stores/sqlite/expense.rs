//! Implements a SQLite backed expense store.
//!
//! Dates are stored as ISO calendar dates (TEXT) and amounts as integer
//! cents, so the period filters can use `strftime` and the aggregates stay
//! exact until the final conversion to dollars.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, params_from_iter, types::Value};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{CategoryName, DatabaseID, Expense, ExpenseBuilder, UserID},
    stores::{CategoryAmount, ExpenseQuery, ExpenseStore, Period},
};

/// Stores expenses in a SQLite database.
///
/// Note that because an expense belongs to a [User](crate::models::User), the
/// user model must be set up in the database.
#[derive(Debug, Clone)]
pub struct SQLiteExpenseStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteExpenseStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

/// Render the WHERE clause for `query` along with its positional parameters.
///
/// The owning user is always bound; the period adds `strftime` comparisons on
/// the ISO date column.
fn build_where_clause(query: &ExpenseQuery) -> (String, Vec<Value>) {
    let mut clause = String::from("WHERE user_id = ?1");
    let mut parameters = vec![Value::Integer(query.user_id.as_i64())];

    match query.period {
        Some(Period::Year(year)) => {
            clause.push_str(" AND strftime('%Y', date) = ?2");
            parameters.push(Value::Text(format!("{year:04}")));
        }
        Some(Period::Month { year, month }) => {
            clause.push_str(" AND strftime('%Y', date) = ?2 AND strftime('%m', date) = ?3");
            parameters.push(Value::Text(format!("{year:04}")));
            parameters.push(Value::Text(format!("{:02}", month as u8)));
        }
        None => {}
    }

    (clause, parameters)
}

const EXPENSE_COLUMNS: &str = "id, user_id, date, category, amount_cents, description";

impl ExpenseStore for SQLiteExpenseStore {
    /// Insert a new expense into the database and return it with its
    /// assigned ID.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if an SQL related error occurred.
    fn create(&mut self, builder: ExpenseBuilder) -> Result<Expense, Error> {
        let connection = self.connection.lock().unwrap();

        connection.execute(
            "INSERT INTO expense (user_id, date, category, amount_cents, description)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                builder.user_id.as_i64(),
                builder.date,
                builder.category.as_ref(),
                builder.amount_cents,
                &builder.description,
            ),
        )?;

        let id = connection.last_insert_rowid();

        Ok(builder.finalise(id))
    }

    /// Insert many expenses in one transaction.
    ///
    /// If any insert fails, the transaction is rolled back and none of the
    /// expenses are persisted.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if an SQL related error occurred.
    fn import(&mut self, builders: Vec<ExpenseBuilder>) -> Result<Vec<Expense>, Error> {
        let connection = self.connection.lock().unwrap();

        let tx = connection.unchecked_transaction()?;
        let mut imported = Vec::with_capacity(builders.len());

        {
            let mut stmt = tx.prepare(
                "INSERT INTO expense (user_id, date, category, amount_cents, description)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;

            for builder in builders {
                stmt.execute((
                    builder.user_id.as_i64(),
                    builder.date,
                    builder.category.as_ref(),
                    builder.amount_cents,
                    &builder.description,
                ))?;

                let id = tx.last_insert_rowid();
                imported.push(builder.finalise(id));
            }
        }

        tx.commit()?;

        Ok(imported)
    }

    /// Retrieve an expense from the database by its `id`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if `id` does not refer to an expense, or
    /// [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: DatabaseID) -> Result<Expense, Error> {
        let expense = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {EXPENSE_COLUMNS} FROM expense WHERE id = :id"
            ))?
            .query_row(&[(":id", &id)], Self::map_row)?;

        Ok(expense)
    }

    /// Replace the date, category, amount and description of the expense with
    /// the matching ID. The owning user is never touched by an update.
    ///
    /// # Errors
    /// Returns [Error::UpdateMissingExpense] if the ID does not refer to an
    /// expense, or [Error::SqlError] if there is some other SQL error.
    fn update(&mut self, expense: &Expense) -> Result<(), Error> {
        let rows_changed = self.connection.lock().unwrap().execute(
            "UPDATE expense
             SET date = ?1, category = ?2, amount_cents = ?3, description = ?4
             WHERE id = ?5",
            (
                expense.date(),
                expense.category().as_ref(),
                expense.amount_cents(),
                expense.description(),
                expense.id(),
            ),
        )?;

        if rows_changed == 0 {
            return Err(Error::UpdateMissingExpense);
        }

        Ok(())
    }

    /// Delete the expense with the given `id`. A missing ID is a no-op.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if there is an SQL error.
    fn delete(&mut self, id: DatabaseID) -> Result<(), Error> {
        self.connection
            .lock()
            .unwrap()
            .execute("DELETE FROM expense WHERE id = ?1", (id,))?;

        Ok(())
    }

    /// Retrieve a page of expenses matching `query`, ordered by date
    /// descending (ties broken by newest ID first).
    ///
    /// # Errors
    /// Returns [Error::SqlError] if there is an SQL error.
    fn get_query(
        &self,
        query: ExpenseQuery,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Expense>, Error> {
        let (where_clause, parameters) = build_where_clause(&query);
        let query_string = format!(
            "SELECT {EXPENSE_COLUMNS} FROM expense {where_clause}
             ORDER BY date DESC, id DESC LIMIT {limit} OFFSET {offset}"
        );

        self.connection
            .lock()
            .unwrap()
            .prepare(&query_string)?
            .query_map(params_from_iter(parameters.iter()), Self::map_row)?
            .map(|maybe_expense| maybe_expense.map_err(Error::SqlError))
            .collect()
    }

    /// Count the expenses matching `query`.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if there is an SQL error.
    fn count(&self, query: ExpenseQuery) -> Result<u64, Error> {
        let (where_clause, parameters) = build_where_clause(&query);

        let count: i64 = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!("SELECT COUNT(id) FROM expense {where_clause}"))?
            .query_row(params_from_iter(parameters.iter()), |row| row.get(0))?;

        Ok(count as u64)
    }

    /// Sum the amounts of the expenses matching `query`, in dollars.
    ///
    /// The sum is computed over integer cents and only converted to dollars
    /// at the end.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if there is an SQL error.
    fn sum(&self, query: ExpenseQuery) -> Result<f64, Error> {
        let (where_clause, parameters) = build_where_clause(&query);

        let total_cents: i64 = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT COALESCE(SUM(amount_cents), 0) FROM expense {where_clause}"
            ))?
            .query_row(params_from_iter(parameters.iter()), |row| row.get(0))?;

        Ok(total_cents as f64 / 100.0)
    }

    /// Sum amounts per category for the expenses matching `query`.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if there is an SQL error.
    fn sum_by_category(&self, query: ExpenseQuery) -> Result<Vec<CategoryAmount>, Error> {
        let (where_clause, parameters) = build_where_clause(&query);
        let query_string = format!(
            "SELECT category, SUM(amount_cents) FROM expense {where_clause}
             GROUP BY category ORDER BY category ASC"
        );

        self.connection
            .lock()
            .unwrap()
            .prepare(&query_string)?
            .query_map(params_from_iter(parameters.iter()), |row| {
                let category: String = row.get(0)?;
                let total_cents: i64 = row.get(1)?;

                Ok(CategoryAmount {
                    category: CategoryName::new_unchecked(&category),
                    amount: total_cents as f64 / 100.0,
                })
            })?
            .map(|maybe_amount| maybe_amount.map_err(Error::SqlError))
            .collect()
    }

    /// Average amounts per category for the expenses matching `query`.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if there is an SQL error.
    fn average_by_category(&self, query: ExpenseQuery) -> Result<Vec<CategoryAmount>, Error> {
        let (where_clause, parameters) = build_where_clause(&query);
        let query_string = format!(
            "SELECT category, AVG(amount_cents) FROM expense {where_clause}
             GROUP BY category ORDER BY category ASC"
        );

        self.connection
            .lock()
            .unwrap()
            .prepare(&query_string)?
            .query_map(params_from_iter(parameters.iter()), |row| {
                let category: String = row.get(0)?;
                let average_cents: f64 = row.get(1)?;

                Ok(CategoryAmount {
                    category: CategoryName::new_unchecked(&category),
                    amount: average_cents / 100.0,
                })
            })?
            .map(|maybe_amount| maybe_amount.map_err(Error::SqlError))
            .collect()
    }

    /// The distinct years in which `user_id` recorded at least one expense,
    /// most recent first.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if there is an SQL error.
    fn expenditure_years(&self, user_id: UserID) -> Result<Vec<i32>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT DISTINCT CAST(strftime('%Y', date) AS INTEGER) AS year
                 FROM expense WHERE user_id = ?1 ORDER BY year DESC",
            )?
            .query_map((user_id.as_i64(),), |row| row.get(0))?
            .map(|maybe_year| maybe_year.map_err(Error::SqlError))
            .collect()
    }
}

impl CreateTable for SQLiteExpenseStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS expense (
                    id INTEGER PRIMARY KEY,
                    user_id INTEGER NOT NULL REFERENCES user(id),
                    date TEXT NOT NULL,
                    category TEXT NOT NULL,
                    amount_cents INTEGER NOT NULL,
                    description TEXT NOT NULL
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteExpenseStore {
    type ReturnType = Expense;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let user_id = UserID::new(row.get(offset + 1)?);
        let date = row.get(offset + 2)?;
        let raw_category: String = row.get(offset + 3)?;
        let amount_cents = row.get(offset + 4)?;
        let description: String = row.get(offset + 5)?;

        let builder = ExpenseBuilder {
            user_id,
            date,
            category: CategoryName::new_unchecked(&raw_category),
            amount_cents,
            description,
        };

        Ok(builder.finalise(id))
    }
}

#[cfg(test)]
mod expense_store_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::{Month, macros::date};

    use crate::{
        db::initialize,
        models::{ExpenseBuilder, PasswordHash, UserID, Username},
        stores::{CategoryAmount, ExpenseQuery, ExpenseStore, Period, UserStore,
            sqlite::SQLiteUserStore},
    };

    use super::{Error, SQLiteExpenseStore};

    /// Creates a store with two users so that `expense(1, ...)` and
    /// `expense(2, ...)` satisfy the foreign key on the expense table.
    fn get_store() -> SQLiteExpenseStore {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let connection = Arc::new(Mutex::new(conn));

        let mut user_store = SQLiteUserStore::new(connection.clone());
        for username in ["bobby", "alice"] {
            user_store
                .create(
                    Username::new(username).unwrap(),
                    PasswordHash::new_unchecked("hunter2"),
                )
                .unwrap();
        }

        SQLiteExpenseStore::new(connection)
    }

    fn expense(
        user_id: i64,
        amount_cents: i64,
        date: time::Date,
        category: &str,
    ) -> ExpenseBuilder {
        ExpenseBuilder::new(UserID::new(user_id), amount_cents, "test expense", date, category)
            .expect("invalid test expense")
    }

    #[test]
    fn create_fails_for_unknown_user() {
        let mut store = get_store();

        let result = store.create(expense(999, 1250, date!(2024 - 03 - 05), "groceries"));

        assert!(
            matches!(result, Err(Error::SqlError(_))),
            "expenses must reference an existing user, got {result:?}"
        );
    }

    #[test]
    fn create_then_get_returns_same_fields() {
        let mut store = get_store();

        let created = store
            .create(expense(1, 1250, date!(2024 - 03 - 05), "groceries"))
            .unwrap();

        assert!(created.id() > 0);

        let retrieved = store.get(created.id()).unwrap();

        assert_eq!(retrieved, created);
        assert_eq!(retrieved.user_id(), UserID::new(1));
        assert_eq!(retrieved.amount_cents(), 1250);
        assert_eq!(retrieved.date(), date!(2024 - 03 - 05));
        assert_eq!(retrieved.category().as_ref(), "groceries");
        assert_eq!(retrieved.description(), "test expense");
    }

    #[test]
    fn get_fails_on_missing_id() {
        let store = get_store();

        assert_eq!(store.get(999), Err(Error::NotFound));
    }

    #[test]
    fn update_replaces_all_mutable_fields() {
        let mut store = get_store();
        let created = store
            .create(expense(1, 1250, date!(2024 - 03 - 05), "groceries"))
            .unwrap();

        let updated = created
            .with_fields(890, "bus fare", date!(2024 - 03 - 01), "transport")
            .unwrap();
        store.update(&updated).unwrap();

        let retrieved = store.get(created.id()).unwrap();

        // A full replace, never a mix of old and new values.
        assert_eq!(retrieved, updated);
        assert_eq!(retrieved.user_id(), created.user_id());
    }

    #[test]
    fn update_fails_on_missing_expense() {
        let mut store = get_store();

        let never_persisted = expense(1, 1250, date!(2024 - 03 - 05), "groceries").finalise(999);

        assert_eq!(
            store.update(&never_persisted),
            Err(Error::UpdateMissingExpense)
        );
    }

    #[test]
    fn delete_then_get_returns_not_found() {
        let mut store = get_store();
        let created = store
            .create(expense(1, 1250, date!(2024 - 03 - 05), "groceries"))
            .unwrap();

        store.delete(created.id()).unwrap();

        assert_eq!(store.get(created.id()), Err(Error::NotFound));
    }

    #[test]
    fn delete_is_idempotent() {
        let mut store = get_store();
        let created = store
            .create(expense(1, 1250, date!(2024 - 03 - 05), "groceries"))
            .unwrap();

        assert_eq!(Ok(()), store.delete(created.id()));
        assert_eq!(Ok(()), store.delete(created.id()));
    }

    #[test]
    fn query_filters_by_month_and_owner() {
        let mut store = get_store();

        let in_march = [
            store
                .create(expense(1, 100, date!(2024 - 03 - 01), "groceries"))
                .unwrap(),
            store
                .create(expense(1, 200, date!(2024 - 03 - 31), "groceries"))
                .unwrap(),
        ];

        // None of the below should match the query.
        store
            .create(expense(1, 300, date!(2024 - 02 - 29), "groceries"))
            .unwrap();
        store
            .create(expense(1, 400, date!(2023 - 03 - 15), "groceries"))
            .unwrap();
        store
            .create(expense(2, 500, date!(2024 - 03 - 15), "groceries"))
            .unwrap();

        let got = store
            .get_query(
                ExpenseQuery::for_month(UserID::new(1), 2024, Month::March),
                0,
                20,
            )
            .unwrap();

        // Newest first.
        assert_eq!(got, vec![in_march[1].clone(), in_march[0].clone()]);
    }

    #[test]
    fn query_filters_by_year() {
        let mut store = get_store();

        let in_2024 = [
            store
                .create(expense(1, 100, date!(2024 - 12 - 31), "groceries"))
                .unwrap(),
            store
                .create(expense(1, 200, date!(2024 - 01 - 01), "groceries"))
                .unwrap(),
        ];
        store
            .create(expense(1, 300, date!(2023 - 12 - 31), "groceries"))
            .unwrap();

        let got = store
            .get_query(
                ExpenseQuery {
                    user_id: UserID::new(1),
                    period: Some(Period::Year(2024)),
                },
                0,
                20,
            )
            .unwrap();

        assert_eq!(got, in_2024.to_vec());
    }

    #[test]
    fn query_without_period_returns_all_for_user() {
        let mut store = get_store();

        store
            .create(expense(1, 100, date!(2023 - 06 - 15), "groceries"))
            .unwrap();
        store
            .create(expense(1, 200, date!(2024 - 06 - 15), "transport"))
            .unwrap();
        store
            .create(expense(2, 300, date!(2024 - 06 - 15), "groceries"))
            .unwrap();

        let got = store
            .get_query(ExpenseQuery::for_user(UserID::new(1)), 0, 20)
            .unwrap();

        assert_eq!(got.len(), 2);
        assert!(got.iter().all(|e| e.user_id() == UserID::new(1)));
    }

    #[test]
    fn query_paginates_with_offset_and_limit() {
        let mut store = get_store();
        let mut created = Vec::new();

        for day in 1..=9 {
            let date = date!(2024 - 03 - 01).replace_day(day).unwrap();
            created.push(store.create(expense(1, 100, date, "groceries")).unwrap());
        }

        // Newest first, so the second page of three starts at day 6.
        created.reverse();
        let want: Vec<_> = created[3..6].to_vec();

        let got = store
            .get_query(ExpenseQuery::for_user(UserID::new(1)), 3, 3)
            .unwrap();

        assert_eq!(got, want);
    }

    #[test]
    fn count_is_independent_of_pagination_window() {
        let mut store = get_store();

        for day in 1..=9 {
            let date = date!(2024 - 03 - 01).replace_day(day).unwrap();
            store.create(expense(1, 100, date, "groceries")).unwrap();
        }
        store
            .create(expense(2, 100, date!(2024 - 03 - 01), "groceries"))
            .unwrap();

        let query = ExpenseQuery::for_month(UserID::new(1), 2024, Month::March);

        let page = store.get_query(query, 0, 4).unwrap();
        let count = store.count(query).unwrap();

        assert_eq!(page.len(), 4);
        assert_eq!(count, 9);
    }

    #[test]
    fn sum_returns_zero_when_no_rows_match() {
        let store = get_store();

        let total = store
            .sum(ExpenseQuery::for_month(UserID::new(1), 2024, Month::March))
            .unwrap();

        assert_eq!(total, 0.0);
    }

    #[test]
    fn sum_converts_cents_to_dollars() {
        let mut store = get_store();

        store
            .create(expense(1, 1000, date!(2024 - 03 - 05), "groceries"))
            .unwrap();
        store
            .create(expense(1, 2500, date!(2024 - 03 - 10), "groceries"))
            .unwrap();
        store
            .create(expense(1, 9999, date!(2024 - 04 - 01), "groceries"))
            .unwrap();

        let total = store
            .sum(ExpenseQuery::for_month(UserID::new(1), 2024, Month::March))
            .unwrap();

        assert_eq!(total, 35.0);
    }

    #[test]
    fn sum_by_category_groups_matching_rows() {
        let mut store = get_store();

        store
            .create(expense(1, 1000, date!(2024 - 03 - 05), "groceries"))
            .unwrap();
        store
            .create(expense(1, 2500, date!(2024 - 03 - 10), "groceries"))
            .unwrap();
        store
            .create(expense(1, 500, date!(2024 - 03 - 12), "transport"))
            .unwrap();

        let got = store
            .sum_by_category(ExpenseQuery::for_month(UserID::new(1), 2024, Month::March))
            .unwrap();

        let want = vec![
            CategoryAmount {
                category: crate::models::CategoryName::new_unchecked("groceries"),
                amount: 35.0,
            },
            CategoryAmount {
                category: crate::models::CategoryName::new_unchecked("transport"),
                amount: 5.0,
            },
        ];

        assert_eq!(got, want);
    }

    #[test]
    fn average_by_category_computes_mean() {
        let mut store = get_store();

        store
            .create(expense(1, 1000, date!(2024 - 03 - 05), "groceries"))
            .unwrap();
        store
            .create(expense(1, 2500, date!(2024 - 03 - 10), "groceries"))
            .unwrap();

        let got = store
            .average_by_category(ExpenseQuery::for_month(UserID::new(1), 2024, Month::March))
            .unwrap();

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].category.as_ref(), "groceries");
        assert_eq!(got[0].amount, 17.5);
    }

    #[test]
    fn expenditure_years_are_distinct_and_descending() {
        let mut store = get_store();

        for date in [
            date!(2022 - 01 - 15),
            date!(2024 - 06 - 15),
            date!(2024 - 07 - 01),
            date!(2023 - 12 - 31),
        ] {
            store.create(expense(1, 100, date, "groceries")).unwrap();
        }
        store
            .create(expense(2, 100, date!(2021 - 01 - 01), "groceries"))
            .unwrap();

        let got = store.expenditure_years(UserID::new(1)).unwrap();

        assert_eq!(got, vec![2024, 2023, 2022]);
    }

    #[test]
    fn import_inserts_all_rows_with_ids() {
        let mut store = get_store();

        let builders = vec![
            expense(1, 100, date!(2024 - 03 - 01), "groceries"),
            expense(1, 200, date!(2024 - 03 - 02), "transport"),
            expense(1, 300, date!(2024 - 03 - 03), "utilities"),
        ];

        let imported = store.import(builders).unwrap();

        assert_eq!(imported.len(), 3);
        for expense in &imported {
            assert_eq!(store.get(expense.id()).unwrap(), *expense);
        }
    }
}
