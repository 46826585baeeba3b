#![allow(clippy::doc_markdown)]
#![doc = include_str!("../README.md")]

mod api;
mod cancellation;
mod cli;
mod core;
mod db;
mod error;
mod export;
mod prelude;
mod quantity;
mod sync;
mod tables;

use clap::{Parser, crate_version};

use crate::{cli::Args, prelude::*};

fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().with_writer(std::io::stderr).init();
    info!(version = crate_version!(), "starting…");

    let args = Args::parse();
    let cancellation = args.cancellation();
    cancellation.register_signals()?;
    args.run(&cancellation)?;

    info!("done!");
    Ok(())
}
