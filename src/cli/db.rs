use std::path::PathBuf;

use clap::Parser;

use crate::{db::Db, prelude::*};

#[derive(Parser)]
pub struct DbArgs {
    #[clap(long = "db", env = "OCTOFOX_DB", default_value = "octofox.sqlite3", global = true)]
    path: PathBuf,
}

impl DbArgs {
    pub fn open(&self) -> Result<Db> {
        Db::open(&self.path)
    }
}
