use chrono::{Local, NaiveDate};
use clap::Parser;

use crate::{
    cancellation::Cancellation,
    cli::{api::ApiArgs, db::DbArgs, meter::MeterArgs, start_of},
    core::{interval::Interval, tariff::TariffCode},
    db::accounts::Accounts,
    prelude::*,
    sync::Syncer,
};

#[derive(Parser)]
pub struct SyncArgs {
    /// Sync the unit rates of the product, for example: `AGILE-24-10-01`, instead of the consumption.
    ///
    /// The tariff code is derived from the meter's current agreement.
    #[clap(long)]
    product: Option<String>,

    /// Sync the unit rates since the date, the move-in date by default.
    #[clap(long, requires = "product")]
    from: Option<NaiveDate>,

    #[clap(flatten)]
    meter: MeterArgs,
}

impl SyncArgs {
    pub fn run(self, api: &ApiArgs, db: &DbArgs, cancellation: &Cancellation) -> Result {
        let db = db.open()?;
        let remote = api.new_client();
        let syncer = Syncer::builder().remote(&remote).db(&db).cancellation(cancellation).build();

        let Some(product) = self.product else {
            let report = syncer.sync_account()?;
            let n_failed = report.failures().count();
            info!(
                n_meters = report.meters.len(),
                n_upserted = report.n_upserted(),
                n_failed,
                "synced",
            );
            for (meter, error) in report.failures() {
                error!(%meter, kind = ?error.kind(), "{error:#}");
            }
            ensure!(n_failed == 0, "{n_failed} meter(s) failed to sync");
            return Ok(());
        };

        let number = api.account()?;
        let account = match Accounts(&db).get(number)? {
            Some(account) => account,
            None => {
                syncer.sync_account()?;
                Accounts(&db).get(number)?.context("the account is missing after the sync")?
            }
        };
        let (property, point, _) = self.meter.select(&account)?;
        let now = Local::now();
        let agreement = point
            .active_agreement(now)
            .or_else(|| point.agreements.last())
            .context("the meter point has no agreements")?;
        let code = agreement.tariff_code.parse::<TariffCode>()?.with_product(&product);
        let since = self.from.map(start_of).transpose()?.unwrap_or(property.moved_in_at);
        let n_rates = syncer.sync_tariff(&code, Interval::try_new(since, now)?)?;
        info!(%code, n_rates, "synced");
        Ok(())
    }
}
