use std::{fs::File, io::BufWriter, path::PathBuf};

use chrono::{Local, NaiveDate};
use clap::Parser;

use crate::{
    cancellation::Cancellation,
    cli::{api::ApiArgs, battery::BatteryArgs, db::DbArgs, meter::MeterArgs, start_of},
    core::{
        accounting::{Cost, FlatRate, TariffCursor},
        battery::{BatteryTelemetry, LoadShifter},
        consumption::HALF_HOUR,
        interval::Interval,
        reconstruct,
        summary::{DEFAULT_STANDING_CHARGE, Summary},
        tariff::TariffCode,
    },
    db::{accounts::Accounts, rates::Rates, readings::Readings},
    export::write_ledger,
    prelude::*,
    quantity::{cost::Pence, rate::KilowattHourRate},
    sync::Syncer,
    tables::{build_battery_table, build_ledger_table, build_summary_table},
};

#[derive(Parser)]
pub struct ModelArgs {
    /// Product to price the consumption with, for example: `AGILE-24-10-01`.
    #[clap(long)]
    product: String,

    /// First day to model.
    #[clap(long)]
    from: NaiveDate,

    /// Day to model until, exclusive. Today by default.
    #[clap(long)]
    to: Option<NaiveDate>,

    #[clap(flatten)]
    meter: MeterArgs,

    /// Also price the consumption at the flat unit rate (pence per kWh) for comparison.
    #[clap(long = "flat-rate")]
    flat_rate: Option<KilowattHourRate>,

    #[clap(flatten)]
    battery: BatteryArgs,

    /// Standing charge in pence per day.
    #[clap(long = "standing-charge", default_value_t = DEFAULT_STANDING_CHARGE.0)]
    standing_charge: f64,

    /// Export the ledger into the CSV file.
    #[clap(long)]
    csv: Option<PathBuf>,

    /// Print the ledger table.
    #[clap(long)]
    table: bool,

    /// Do not fetch the missing unit rates.
    #[clap(long)]
    offline: bool,
}

impl ModelArgs {
    #[instrument(skip_all, fields(product = %self.product))]
    pub fn run(self, api: &ApiArgs, db: &DbArgs, cancellation: &Cancellation) -> Result {
        let db = db.open()?;
        let number = api.account()?;
        let account = Accounts(&db)
            .get(number)?
            .with_context(|| format!("account `{number}` is not synced yet, run `sync` first"))?;
        let (_, point, meter) = self.meter.select(&account)?;

        let to = match self.to {
            Some(to) => start_of(to)?,
            None => start_of(Local::now().date_naive())?,
        };
        let interval = Interval::try_new(start_of(self.from)?, to)?;
        info!(%meter, %interval, "modelling…");

        let agreement = point
            .active_agreement(Local::now())
            .or_else(|| point.agreements.last())
            .context("the meter point has no agreements")?;
        let code = agreement.tariff_code.parse::<TariffCode>()?.with_product(&self.product);
        info!(%code, "using the tariff");

        if !self.offline {
            let remote = api.new_client();
            Syncer::builder()
                .remote(&remote)
                .db(&db)
                .cancellation(cancellation)
                .build()
                .sync_tariff(&code, interval)?;
        }

        cancellation.check()?;
        let consumption = reconstruct::consumption(
            interval,
            Readings(&db).query(&meter, interval)?,
            HALF_HOUR,
        )?;
        let rates = reconstruct::tariff(interval, Rates(&db).query(&code, interval)?)?;
        let standing_charge = Pence(self.standing_charge);

        let mut cursor = TariffCursor::new(&rates);
        let baseline = Cost::try_compute(&consumption, &mut cursor)?;
        debug!(position = cursor.position(), n_rates = rates.len(), "priced the baseline");
        let shift = self
            .battery
            .battery()
            .map(|(battery, window)| LoadShifter::new(battery, window).run(&consumption));
        let shifted = shift
            .as_ref()
            .map(|shift| Cost::try_compute(&shift.consumption, &mut TariffCursor::new(&rates)))
            .transpose()?;
        let flat = self
            .flat_rate
            .map(|rate| Cost::try_compute(&consumption, &mut FlatRate(rate)))
            .transpose()?;

        let (ledger, telemetry): (&Cost, Option<&[BatteryTelemetry]>) = match (&shifted, &shift) {
            (Some(shifted), Some(shift)) => (shifted, Some(shift.telemetry.as_slice())),
            _ => (&baseline, None),
        };
        if self.table {
            println!("{}", build_ledger_table(ledger, telemetry));
        }
        if let Some(shift) = &shift {
            println!("{}", build_battery_table(&shift.summary));
        }

        let mut scenarios = vec![(
            self.product.as_str(),
            &baseline,
            Summary::new(&baseline, standing_charge),
        )];
        if let Some(shifted) = &shifted {
            scenarios.push(("with battery", shifted, Summary::new(shifted, standing_charge)));
        }
        if let Some(flat) = &flat {
            scenarios.push(("flat rate", flat, Summary::new(flat, standing_charge)));
        }
        println!("{}", build_summary_table(&scenarios));

        if let Some(path) = &self.csv {
            let file = File::create(path)
                .with_context(|| format!("failed to create `{}`", path.display()))?;
            write_ledger(BufWriter::new(file), ledger, telemetry)?;
            info!(path = %path.display(), "exported the ledger");
        }
        Ok(())
    }
}
