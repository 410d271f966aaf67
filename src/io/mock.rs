//! Mock transaction generator
//!
//! Fabricates a reproducible stream of transfers between a small pool of
//! accounts, for demos and load runs without an upstream feed.

use crate::types::{Account, AggregationError, Transaction};
use chrono::{Duration, NaiveDateTime};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

/// Default account pool: five accounts spread over four groups
pub const DEFAULT_ACCOUNTS: [Account; 5] = [
    Account { id: 1000000000000001, group: 1 },
    Account { id: 2000000000000001, group: 2 },
    Account { id: 3000000000000001, group: 3 },
    Account { id: 4000000000000001, group: 4 },
    Account { id: 1000000000000002, group: 1 },
];

const MIN_ID: i64 = 1_000_000_000_000_000;
const MAX_ID: i64 = 9_999_999_999_999_999;
const MIN_AMOUNT: i64 = 1_000;
const MAX_AMOUNT: i64 = 100_000;

/// Seeded generator of random transfers
///
/// Yields `count` transactions. Sender and recipient are always different
/// accounts. Timestamps advance by one millisecond per transaction from
/// `start` so window ordering is deterministic.
pub struct MockTransactionGenerator {
    rng: StdRng,
    accounts: Vec<Account>,
    next_timestamp: NaiveDateTime,
    remaining: usize,
}

impl MockTransactionGenerator {
    /// Generator over `DEFAULT_ACCOUNTS`
    pub fn new(seed: u64, start: NaiveDateTime, count: usize) -> Self {
        Self::build(seed, start, count, DEFAULT_ACCOUNTS.to_vec())
    }

    /// Generator over a custom account pool
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the pool has fewer than two distinct accounts.
    pub fn with_accounts(
        seed: u64,
        start: NaiveDateTime,
        count: usize,
        accounts: Vec<Account>,
    ) -> Result<Self, AggregationError> {
        let distinct = accounts
            .first()
            .is_some_and(|first| accounts.iter().any(|a| a.id != first.id));
        if !distinct {
            return Err(AggregationError::invalid_config(
                "mock generator needs at least two distinct accounts",
            ));
        }

        Ok(Self::build(seed, start, count, accounts))
    }

    fn build(seed: u64, start: NaiveDateTime, count: usize, accounts: Vec<Account>) -> Self {
        MockTransactionGenerator {
            rng: StdRng::seed_from_u64(seed),
            accounts,
            next_timestamp: start,
            remaining: count,
        }
    }

    fn pick(&mut self) -> Account {
        *self
            .accounts
            .choose(&mut self.rng)
            .unwrap_or(&DEFAULT_ACCOUNTS[0])
    }
}

impl Iterator for MockTransactionGenerator {
    type Item = Result<Transaction, String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let sender = self.pick();
        let mut recipient = self.pick();
        while recipient.id == sender.id {
            recipient = self.pick();
        }

        let id = self.rng.gen_range(MIN_ID..MAX_ID);
        let amount = Decimal::from(self.rng.gen_range(MIN_AMOUNT..MAX_AMOUNT));
        let timestamp = self.next_timestamp;
        self.next_timestamp += Duration::milliseconds(1);

        Some(Ok(Transaction::new(id, amount, sender, recipient, timestamp)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
