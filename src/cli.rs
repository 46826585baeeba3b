mod api;
mod battery;
mod db;
mod meter;
mod model;
mod products;
mod sync;

use chrono::{DateTime, Local, NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};

use self::{api::ApiArgs, db::DbArgs, model::ModelArgs, products::ProductsArgs, sync::SyncArgs};
use crate::{cancellation::Cancellation, prelude::*};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[clap(flatten)]
    pub api: ApiArgs,

    #[clap(flatten)]
    pub db: DbArgs,

    /// Give up after this long, for example: `5min`.
    #[clap(long, env = "OCTOFOX_DEADLINE", global = true)]
    pub deadline: Option<humantime::Duration>,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn cancellation(&self) -> Cancellation {
        let cancellation = Cancellation::default();
        match self.deadline {
            Some(deadline) => cancellation.with_timeout(*deadline),
            None => cancellation,
        }
    }

    pub fn run(self, cancellation: &Cancellation) -> Result {
        match self.command {
            Command::Sync(args) => args.run(&self.api, &self.db, cancellation),
            Command::Model(args) => args.run(&self.api, &self.db, cancellation),
            Command::Products(args) => args.run(&self.api),
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Pull the account and its consumption, or the product's unit rates, into the local database.
    #[clap(name = "sync")]
    Sync(SyncArgs),

    /// Price the stored consumption with a product's unit rates, optionally with a home battery.
    #[clap(name = "model")]
    Model(Box<ModelArgs>),

    /// List the available products.
    #[clap(name = "products")]
    Products(ProductsArgs),
}

/// Local midnight at the date.
fn start_of(date: NaiveDate) -> Result<DateTime<Local>> {
    date.and_time(NaiveTime::MIN)
        .and_local_timezone(Local)
        .earliest()
        .with_context(|| format!("`{date}` has no local midnight"))
}
