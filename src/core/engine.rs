//! Aggregation engine
//!
//! This module provides the AggregationEngine that turns a stream of
//! individual transactions into the three derived aggregates:
//! - directed daily group-to-group transfer totals (`group_transfers`)
//! - per-group daily balances (`group_balance`)
//! - a bounded per-account recent-activity window (`recent_activity`)
//!
//! All writes triggered by one transaction share a single atomic scope on the
//! store. Either every aggregate reflects the transaction or none does.

use crate::core::group_balance;
use crate::core::group_transfers;
use crate::core::recent_activity::{self, WindowEntry, RECENT_ACTIVITY_LIMIT};
use crate::core::traits::DataStore;
use crate::types::{to_units, AggregationError, Direction, Transaction};

/// Transaction aggregation engine
///
/// Holds no durable state of its own: the store is the source of truth, so a
/// restarted engine continues exactly where the previous one committed.
pub struct AggregationEngine<S: DataStore> {
    store: S,
    window_size: usize,
}

impl<S: DataStore> AggregationEngine<S> {
    /// Create an engine with the default 20-entry recent-activity window
    pub fn new(store: S) -> Self {
        AggregationEngine {
            store,
            window_size: RECENT_ACTIVITY_LIMIT,
        }
    }

    /// Create an engine with a custom recent-activity window size
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `window_size` is zero.
    pub fn with_window_size(store: S, window_size: usize) -> Result<Self, AggregationError> {
        if window_size == 0 {
            return Err(AggregationError::invalid_config(
                "recent-activity window size must be at least 1",
            ));
        }
        Ok(AggregationEngine { store, window_size })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Process a single transaction
    ///
    /// Applies the group-transfer, group-balance, and recent-activity updates
    /// inside one atomic scope and commits them together. The caller is
    /// responsible for `sender != recipient`; it is not re-checked here.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The amount is negative or not representable (`InvalidAmount`); nothing
    ///   is written in this case
    /// - Any update step fails; the whole scope is rolled back and the step's
    ///   error is returned
    /// - The commit fails; a rollback is attempted and the commit error is
    ///   returned
    ///
    /// The engine never retries. A failed transaction counts as not processed
    /// and may be presented again by the caller.
    pub fn process_transaction(&mut self, tx: &Transaction) -> Result<(), AggregationError> {
        let units = to_units(tx.amount, tx.id)?;

        log::debug!("Processing transaction {}", tx);

        self.store.begin()?;

        if let Err(e) = self.apply(tx, units) {
            self.abort(tx, &e);
            return Err(e);
        }

        if let Err(e) = self.store.commit() {
            self.abort(tx, &e);
            return Err(e);
        }

        Ok(())
    }

    fn apply(&mut self, tx: &Transaction, units: i64) -> Result<(), AggregationError> {
        let date = tx.date();

        group_transfers::accumulate(
            &mut self.store,
            tx.sender.group,
            tx.recipient.group,
            date,
            units,
        )?;

        group_balance::apply_delta(&mut self.store, tx.sender.group, date, -units)?;
        group_balance::apply_delta(&mut self.store, tx.recipient.group, date, units)?;

        let sent = WindowEntry {
            account: tx.sender.id,
            transaction_id: tx.id,
            counterparty: tx.recipient.id,
            units,
            direction: Direction::Sent,
            timestamp: tx.timestamp,
        };
        let received = WindowEntry {
            account: tx.recipient.id,
            counterparty: tx.sender.id,
            direction: Direction::Received,
            ..sent
        };

        recent_activity::record(&mut self.store, &sent, self.window_size)?;
        recent_activity::record(&mut self.store, &received, self.window_size)?;

        Ok(())
    }

    fn abort(&mut self, tx: &Transaction, cause: &AggregationError) {
        log::debug!("Rolling back transaction {}: {}", tx.id, cause);
        if let Err(rollback_error) = self.store.rollback() {
            log::error!(
                "Rollback of transaction {} failed after '{}': {}",
                tx.id,
                cause,
                rollback_error
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reports::{
        daily_group_transfer, daily_group_transfers, group_balance, group_balance_as_of,
        group_balances, recent_activity,
    };
    use crate::store::{Row, SqliteStore, StoreValue};
    use crate::types::Account;
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use rstest::rstest;
    use rust_decimal::Decimal;

    const A: Account = Account { id: 1000000000000001, group: 1 };
    const B: Account = Account { id: 2000000000000001, group: 2 };
    const C: Account = Account { id: 3000000000000001, group: 3 };
    const A2: Account = Account { id: 1000000000000002, group: 1 };

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()
    }

    fn at(seconds: i64) -> NaiveDateTime {
        day().and_hms_opt(8, 0, 0).unwrap() + Duration::seconds(seconds)
    }

    fn tx(id: i64, amount: i64, sender: Account, recipient: Account, when: NaiveDateTime) -> Transaction {
        Transaction::new(id, Decimal::new(amount, 0), sender, recipient, when)
    }

    fn engine() -> AggregationEngine<SqliteStore> {
        AggregationEngine::new(SqliteStore::open_in_memory().unwrap())
    }

    fn balance(engine: &AggregationEngine<SqliteStore>, group: i64) -> Decimal {
        group_balance(engine.store(), group, day())
            .unwrap()
            .unwrap()
            .amount
    }

    #[test]
    fn test_two_transaction_scenario() {
        let mut engine = engine();

        engine.process_transaction(&tx(1, 500, A, B, at(0))).unwrap();

        let forward = daily_group_transfer(engine.store(), 1, 2, day()).unwrap().unwrap();
        assert_eq!((forward.sum, forward.count), (Decimal::new(500, 0), 1));
        assert_eq!(balance(&engine, 1), Decimal::new(-500, 0));
        assert_eq!(balance(&engine, 2), Decimal::new(500, 0));

        engine.process_transaction(&tx(2, 200, B, A, at(1))).unwrap();

        let forward = daily_group_transfer(engine.store(), 1, 2, day()).unwrap().unwrap();
        assert_eq!((forward.sum, forward.count), (Decimal::new(500, 0), 1));
        let backward = daily_group_transfer(engine.store(), 2, 1, day()).unwrap().unwrap();
        assert_eq!((backward.sum, backward.count), (Decimal::new(200, 0), 1));
        assert_eq!(balance(&engine, 1), Decimal::new(-300, 0));
        assert_eq!(balance(&engine, 2), Decimal::new(300, 0));
    }

    #[test]
    fn test_new_day_seeds_from_prior_history() {
        let mut engine = engine();
        let yesterday = at(-86_400);

        // group 3 nets +1000 before today
        engine.process_transaction(&tx(1, 1500, A, C, yesterday)).unwrap();
        engine.process_transaction(&tx(2, 500, C, B, yesterday)).unwrap();

        engine.process_transaction(&tx(3, 50, C, A, at(0))).unwrap();

        assert_eq!(balance(&engine, 3), Decimal::new(950, 0));
    }

    #[test]
    fn test_recent_activity_records_both_parties() {
        let mut engine = engine();

        engine.process_transaction(&tx(7, 25, A, B, at(0))).unwrap();

        let sender = recent_activity(engine.store(), A.id).unwrap();
        assert_eq!(sender.len(), 1);
        assert_eq!(sender[0].counterparty, B.id);
        assert_eq!(sender[0].direction, Direction::Sent);
        assert_eq!(sender[0].amount, Decimal::new(25, 0));
        assert_eq!(sender[0].timestamp, at(0));

        let recipient = recent_activity(engine.store(), B.id).unwrap();
        assert_eq!(recipient[0].counterparty, A.id);
        assert_eq!(recipient[0].direction, Direction::Received);
    }

    #[test]
    fn test_same_group_transfer_keeps_windows_apart() {
        let mut engine = engine();

        engine.process_transaction(&tx(1, 40, A, A2, at(0))).unwrap();

        assert_eq!(recent_activity(engine.store(), A.id).unwrap().len(), 1);
        assert_eq!(recent_activity(engine.store(), A2.id).unwrap().len(), 1);
        // money stays in the group
        assert_eq!(balance(&engine, 1), Decimal::ZERO);
        let internal = daily_group_transfer(engine.store(), 1, 1, day()).unwrap().unwrap();
        assert_eq!(internal.sum, Decimal::new(40, 0));
    }

    #[test]
    fn test_window_bound_over_many_transactions() {
        let mut engine = engine();

        for i in 0..45 {
            let (sender, recipient) = if i % 2 == 0 { (A, B) } else { (C, A) };
            engine.process_transaction(&tx(i, 1, sender, recipient, at(i))).unwrap();
        }

        let window = recent_activity(engine.store(), A.id).unwrap();
        assert_eq!(window.len(), RECENT_ACTIVITY_LIMIT);
        let ids: Vec<_> = window.iter().map(|e| e.transaction_id).collect();
        assert_eq!(ids, (25..45).collect::<Vec<_>>());
    }

    #[test]
    fn test_custom_window_size() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut engine = AggregationEngine::with_window_size(store, 3).unwrap();

        for i in 0..5 {
            engine.process_transaction(&tx(i, 1, A, B, at(i))).unwrap();
        }

        assert_eq!(recent_activity(engine.store(), A.id).unwrap().len(), 3);
    }

    #[test]
    fn test_zero_window_size_is_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        let result = AggregationEngine::with_window_size(store, 0);
        assert!(matches!(result, Err(AggregationError::InvalidConfig { .. })));
    }

    #[rstest]
    #[case::negative(Decimal::new(-1, 0))]
    #[case::too_precise(Decimal::new(1, 6))]
    fn test_invalid_amount_writes_nothing(#[case] amount: Decimal) {
        let mut engine = engine();
        let bad = Transaction::new(1, amount, A, B, at(0));

        let err = engine.process_transaction(&bad).unwrap_err();

        assert!(matches!(err, AggregationError::InvalidAmount { tx: 1, .. }));
        assert!(!engine.store().in_transaction());
        assert!(daily_group_transfers(engine.store(), None).unwrap().is_empty());
    }

    #[rstest]
    fn test_accumulation_is_order_independent(
        #[values([0, 1, 2, 3], [3, 2, 1, 0], [2, 0, 3, 1])] order: [usize; 4],
    ) {
        let amounts = [10, 250, 3, 1000];
        let mut engine = engine();

        for (seq, &i) in order.iter().enumerate() {
            engine
                .process_transaction(&tx(i as i64, amounts[i], A, B, at(seq as i64)))
                .unwrap();
        }

        let row = daily_group_transfer(engine.store(), 1, 2, day()).unwrap().unwrap();
        assert_eq!(row.sum, Decimal::new(1263, 0));
        assert_eq!(row.count, 4);
        assert_eq!(balance(&engine, 1), Decimal::new(-1263, 0));
    }

    #[test]
    fn test_balance_is_conserved_across_groups() {
        let mut engine = engine();
        let parties = [A, B, C, A2];

        for i in 0..30_i64 {
            let sender = parties[(i % 4) as usize];
            let recipient = parties[((i * 3 + 1) % 4) as usize];
            let when = at(i * 3_600);
            engine
                .process_transaction(&tx(i, 17 * i + 3, sender, recipient, when))
                .unwrap();
        }

        let balances = group_balances(engine.store(), None).unwrap();
        let mut dates: Vec<_> = balances.iter().map(|b| b.date).collect();
        dates.dedup();
        assert!(dates.len() > 1);

        for date in dates {
            let total: Decimal = [1, 2, 3]
                .iter()
                .filter_map(|&g| {
                    group_balance_as_of(engine.store(), g, date)
                        .unwrap()
                        .map(|b| b.amount)
                })
                .sum();
            assert_eq!(total, Decimal::ZERO, "money created or lost on {date}");
        }
    }

    #[test]
    fn test_overflowing_running_sum_rolls_back() {
        let mut engine = engine();
        let huge = Decimal::new(500_000_000_000_000, 0);

        engine
            .process_transaction(&Transaction::new(1, huge, A, B, at(0)))
            .unwrap();
        let err = engine
            .process_transaction(&Transaction::new(2, huge, A, B, at(1)))
            .unwrap_err();

        assert!(matches!(err, AggregationError::ArithmeticOverflow { .. }));
        assert!(!engine.store().in_transaction());
        let row = daily_group_transfer(engine.store(), 1, 2, day()).unwrap().unwrap();
        assert_eq!((row.sum, row.count), (huge, 1));
        assert_eq!(balance(&engine, 1), -huge);
        assert_eq!(balance(&engine, 2), huge);
        assert_eq!(recent_activity(engine.store(), A.id).unwrap().len(), 1);

        // the groups stay usable on later days
        engine
            .process_transaction(&tx(3, 1, A, B, at(86_400)))
            .unwrap();
        let next_day = day().succ_opt().unwrap();
        assert_eq!(
            group_balance(engine.store(), 1, next_day).unwrap().unwrap().amount,
            -huge - Decimal::ONE
        );
    }

    /// Wraps a SqliteStore and fails every write to one table.
    struct FailingStore {
        inner: SqliteStore,
        failing_table: &'static str,
        fail_commit: bool,
    }

    impl FailingStore {
        fn new(failing_table: &'static str) -> Self {
            FailingStore {
                inner: SqliteStore::open_in_memory().unwrap(),
                failing_table,
                fail_commit: false,
            }
        }
    }

    impl DataStore for FailingStore {
        fn execute_update(
            &mut self,
            statement: &str,
            params: &[StoreValue],
        ) -> Result<usize, AggregationError> {
            if statement.contains(self.failing_table) {
                return Err(AggregationError::query_failure("injected failure"));
            }
            self.inner.execute_update(statement, params)
        }

        fn execute_query(
            &self,
            statement: &str,
            params: &[StoreValue],
        ) -> Result<Vec<Row>, AggregationError> {
            self.inner.execute_query(statement, params)
        }

        fn begin(&mut self) -> Result<(), AggregationError> {
            self.inner.begin()
        }

        fn commit(&mut self) -> Result<(), AggregationError> {
            if self.fail_commit {
                return Err(AggregationError::query_failure("injected commit failure"));
            }
            self.inner.commit()
        }

        fn rollback(&mut self) -> Result<(), AggregationError> {
            self.inner.rollback()
        }
    }

    #[test]
    fn test_recent_activity_failure_rolls_back_everything() {
        let mut engine = AggregationEngine::new(FailingStore::new("recent_transactions"));

        let err = engine.process_transaction(&tx(1, 500, A, B, at(0))).unwrap_err();

        assert!(matches!(err, AggregationError::QueryFailure { .. }));
        let inner = &engine.store().inner;
        assert!(!inner.in_transaction());
        assert!(daily_group_transfer(inner, 1, 2, day()).unwrap().is_none());
        assert!(group_balance(inner, 1, day()).unwrap().is_none());
        assert!(group_balance(inner, 2, day()).unwrap().is_none());
    }

    #[test]
    fn test_failed_transaction_can_be_retried() {
        let mut engine = AggregationEngine::new(FailingStore::new("total_by_group"));
        let t = tx(1, 500, A, B, at(0));

        assert!(engine.process_transaction(&t).is_err());

        engine.store_mut().failing_table = "no_such_table";
        engine.process_transaction(&t).unwrap();

        let row = daily_group_transfer(&engine.store().inner, 1, 2, day()).unwrap().unwrap();
        assert_eq!(row.count, 1);
    }

    #[test]
    fn test_commit_failure_rolls_back() {
        let mut store = FailingStore::new("no_such_table");
        store.fail_commit = true;
        let mut engine = AggregationEngine::new(store);

        assert!(engine.process_transaction(&tx(1, 500, A, B, at(0))).is_err());

        let inner = engine.into_store().inner;
        assert!(!inner.in_transaction());
        assert!(recent_activity(&inner, A.id).unwrap().is_empty());
    }
}
