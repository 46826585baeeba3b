use rusqlite::Connection;

use crate::prelude::*;

/// Schema versions, the index plus one is stored in `user_version`.
const MIGRATIONS: &[&str] = &[
    // language=sqlite
    r"
    CREATE TABLE accounts (
        number   TEXT NOT NULL PRIMARY KEY,
        document TEXT NOT NULL
    ) STRICT;

    CREATE TABLE consumption (
        account    TEXT NOT NULL,
        mpan       TEXT NOT NULL,
        serial     TEXT NOT NULL,
        start_secs INTEGER NOT NULL,
        end_secs   INTEGER NOT NULL,
        kwh        REAL NOT NULL,
        PRIMARY KEY (account, mpan, serial, start_secs)
    ) STRICT;

    CREATE TABLE tariff_rates (
        code            TEXT NOT NULL,
        valid_from_secs INTEGER NOT NULL,
        valid_to_secs   INTEGER NOT NULL,
        unit_price      REAL NOT NULL,
        PRIMARY KEY (code, valid_from_secs)
    ) STRICT;
    ",
];

#[instrument(skip_all)]
pub fn apply(connection: &Connection) -> Result {
    let version: usize = connection.pragma_query_value(None, "user_version", |row| row.get(0))?;
    for (index, sql) in MIGRATIONS.iter().enumerate().skip(version) {
        info!(version = index + 1, "migrating…");
        let transaction = connection.unchecked_transaction()?;
        transaction.execute_batch(sql)?;
        transaction.pragma_update(None, "user_version", index + 1)?;
        transaction.commit()?;
    }
    Ok(())
}
