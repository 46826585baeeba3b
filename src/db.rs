use std::path::Path;

use derive_more::Deref;
use rusqlite::Connection;

use crate::prelude::*;

pub mod accounts;
mod migrations;
pub mod rates;
pub mod readings;
mod timestamp;

/// Local interval store.
#[must_use]
#[derive(Deref)]
pub struct Db(Connection);

impl Db {
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self> {
        info!("opening the database…");
        let connection = Connection::open(path)
            .with_context(|| format!("failed to open the database at `{}`", path.display()))?;
        Self::initialize(connection)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::initialize(Connection::open_in_memory()?)
    }

    fn initialize(connection: Connection) -> Result<Self> {
        migrations::apply(&connection).context("failed to migrate the database")?;
        Ok(Self(connection))
    }
}
