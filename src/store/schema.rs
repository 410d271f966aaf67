//! Schema for the derived aggregate tables
//!
//! Amount columns hold fixed-point units of 10^-4 (see `types::amount`).
//! Tables are `STRICT`: an integer sum that overflows into a REAL is rejected
//! by the column instead of being stored.
//! All statements are idempotent so the schema can be applied on every open.

use rusqlite::Connection;

/// DDL for the three aggregate tables and their indexes
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS daily_group_transfer (
    origin_group_id      INTEGER NOT NULL,
    destination_group_id INTEGER NOT NULL,
    date                 TEXT    NOT NULL,
    sum_transfers        INTEGER NOT NULL,
    num_transfers        INTEGER NOT NULL,
    PRIMARY KEY (origin_group_id, destination_group_id, date)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_daily_group_transfer_destination
    ON daily_group_transfer (destination_group_id, date);

CREATE INDEX IF NOT EXISTS idx_daily_group_transfer_date
    ON daily_group_transfer (date);

CREATE TABLE IF NOT EXISTS total_by_group (
    account_group_id INTEGER NOT NULL,
    date             TEXT    NOT NULL,
    amount           INTEGER NOT NULL,
    PRIMARY KEY (account_group_id, date)
) STRICT;

CREATE TABLE IF NOT EXISTS recent_transactions (
    seq            INTEGER PRIMARY KEY AUTOINCREMENT,
    account        INTEGER NOT NULL,
    transaction_id INTEGER NOT NULL,
    other_account  INTEGER NOT NULL,
    amount         INTEGER NOT NULL,
    is_sender      INTEGER NOT NULL,
    timestamp      TEXT    NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_recent_transactions_account_time
    ON recent_transactions (account, timestamp DESC, seq DESC);
";

/// Create the aggregate tables if they do not exist yet
pub fn apply_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}
