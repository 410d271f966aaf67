//! Account-related types for the aggregation engine
//!
//! This module defines the Account structure as it appears on a transaction.

use super::transaction::{AccountId, GroupId};

/// An account taking part in a transfer
///
/// Group membership is captured by value at the time of the transaction and
/// is never re-resolved later, so moving an account to another group does not
/// rewrite history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Account {
    /// Unique, stable account identifier
    pub id: AccountId,

    /// Group the account belonged to when the transaction happened
    pub group: GroupId,
}

impl Account {
    /// Create an account reference with its current group
    pub fn new(id: AccountId, group: GroupId) -> Self {
        Account { id, group }
    }
}
