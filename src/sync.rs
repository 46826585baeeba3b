use bon::Builder;
use chrono::{DateTime, Local};

use crate::{
    api::Remote,
    cancellation::Cancellation,
    core::{interval::Interval, meter::MeterId, tariff::TariffCode},
    db::{Db, accounts::Accounts, rates::Rates, readings::Readings},
    error::ReconcileError,
    prelude::*,
};

/// Incrementally pulls the remote data into the local store.
#[derive(Builder)]
pub struct Syncer<'a, R> {
    remote: &'a R,
    db: &'a Db,
    cancellation: &'a Cancellation,

    /// Upper bound of every fetch.
    #[builder(default = Local::now())]
    now: DateTime<Local>,
}

/// Per-meter outcomes: number of upserted readings, or the isolated failure.
#[must_use]
#[derive(Debug, Default)]
pub struct SyncReport {
    pub meters: Vec<(MeterId, Result<usize, ReconcileError>)>,
}

impl SyncReport {
    pub fn failures(&self) -> impl Iterator<Item = (&MeterId, &ReconcileError)> {
        self.meters
            .iter()
            .filter_map(|(meter, outcome)| outcome.as_ref().err().map(|error| (meter, error)))
    }

    #[must_use]
    pub fn n_upserted(&self) -> usize {
        self.meters.iter().filter_map(|(_, outcome)| outcome.as_ref().ok()).sum()
    }
}

impl<R: Remote> Syncer<'_, R> {
    /// Sync the account document and then every meter on it.
    ///
    /// Failing to fetch the account fails the call, while the meter failures are only reported.
    #[instrument(skip_all)]
    pub fn sync_account(&self) -> Result<SyncReport, ReconcileError> {
        self.cancellation.check()?;
        let account = self
            .remote
            .fetch_account()
            .map_err(|error| ReconcileError::sync_failed("account", error))?;
        Accounts(self.db)
            .upsert(&account)
            .map_err(|error| ReconcileError::sync_failed(&account.number, error))?;
        info!(
            number = %account.number,
            n_properties = account.properties.len(),
            "fetched the account",
        );

        let mut report = SyncReport::default();
        for (property, _, meter) in account.meters() {
            let outcome = self.sync_meter(&meter, property.moved_in_at);
            match &outcome {
                Ok(n_readings) => info!(%meter, n_readings, "synced"),
                Err(ReconcileError::Cancelled) => return Err(ReconcileError::Cancelled),
                Err(error) => warn!(%meter, kind = ?error.kind(), ?error, "failed to sync"),
            }
            report.meters.push((meter, outcome));
        }
        Ok(report)
    }

    /// Fetch everything after the watermark, or after the epoch for a new meter.
    #[instrument(skip_all, fields(meter = %meter))]
    pub fn sync_meter(
        &self,
        meter: &MeterId,
        epoch: DateTime<Local>,
    ) -> Result<usize, ReconcileError> {
        self.cancellation.check()?;
        let since = Readings(self.db)
            .latest_end(meter)
            .map_err(|error| error.into_sync_failed(meter))?
            .unwrap_or(epoch);
        if since >= self.now {
            debug!(%since, "up to date");
            return Ok(0);
        }
        let readings = self
            .remote
            .fetch_consumption(meter, Interval::new(since, self.now))
            .map_err(|error| ReconcileError::sync_failed(meter, error))?;
        self.cancellation.check()?;
        Readings(self.db)
            .upsert(meter, &readings, self.cancellation)
            .map_err(|error| error.into_sync_failed(meter))
    }

    /// Make sure the tariff is stored over the interval.
    ///
    /// Fetching starts from the first hole in the stored rates.
    #[instrument(skip_all, fields(code = %code, interval = %interval))]
    pub fn sync_tariff(
        &self,
        code: &TariffCode,
        interval: Interval,
    ) -> Result<usize, ReconcileError> {
        self.cancellation.check()?;
        let interval = interval.with_end(interval.end.min(self.now));
        if interval.start >= interval.end {
            return Ok(0);
        }
        let covered_until = Rates(self.db)
            .covered_until(code, interval)
            .map_err(|error| error.into_sync_failed(code))?;
        let fetch = match covered_until {
            Some(covered_until) if covered_until >= interval.end => {
                info!(%covered_until, "already covered");
                return Ok(0);
            }
            Some(covered_until) => interval.with_start(covered_until),
            None => interval,
        };
        let rates = self
            .remote
            .fetch_tariff_rates(code, fetch)
            .map_err(|error| ReconcileError::sync_failed(code, error))?;
        self.cancellation.check()?;
        let n_rates = Rates(self.db)
            .upsert(code, &rates, self.cancellation)
            .map_err(|error| error.into_sync_failed(code))?;
        info!(n_rates, "synced");
        Ok(n_rates)
    }
}
