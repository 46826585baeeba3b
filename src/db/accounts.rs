use rusqlite::{Connection, OptionalExtension};

use crate::{core::account::Account, prelude::*};

/// Account documents as last fetched, so that the modelling works offline.
#[must_use]
pub struct Accounts<'c>(pub &'c Connection);

impl Accounts<'_> {
    #[instrument(skip_all, fields(number = %account.number))]
    pub fn upsert(&self, account: &Account) -> Result {
        // language=sqlite
        const SQL: &str = r"
            INSERT INTO accounts (number, document) VALUES (?1, ?2)
            ON CONFLICT DO UPDATE SET document = ?2
        ";

        self.0.prepare_cached(SQL)?.execute((&account.number, serde_json::to_string(account)?))?;
        Ok(())
    }

    #[instrument(skip_all, fields(number = number))]
    pub fn get(&self, number: &str) -> Result<Option<Account>> {
        // language=sqlite
        const SQL: &str = r"SELECT document FROM accounts WHERE number = ?1";

        self.0
            .prepare_cached(SQL)?
            .query_row((number,), |row| row.get::<_, String>(0))
            .optional()?
            .map(|document| serde_json::from_str(&document).context("corrupted account document"))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Db;

    #[test]
    fn upsert_and_get_ok() -> Result {
        let db = Db::open_in_memory()?;
        assert!(Accounts(&db).get("A-1")?.is_none());
        let account = Account { number: "A-1".to_string(), properties: Vec::new() };
        Accounts(&db).upsert(&account)?;
        Accounts(&db).upsert(&account)?;
        let stored = Accounts(&db).get("A-1")?.context("the account must be stored")?;
        assert_eq!(stored.number, "A-1");
        Ok(())
    }
}
