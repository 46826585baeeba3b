use chrono::{DateTime, Local};
use rusqlite::Connection;

use crate::{
    cancellation::Cancellation,
    core::{
        interval::Interval,
        tariff::{TariffCode, TariffRate},
    },
    db::timestamp,
    error::ReconcileError,
    prelude::*,
    quantity::rate::KilowattHourRate,
};

/// Unit rates per tariff code.
#[must_use]
pub struct Rates<'c>(pub &'c Connection);

impl Rates<'_> {
    #[instrument(skip_all, fields(code = %code, n_rates = rates.len()))]
    pub fn upsert(
        &self,
        code: &TariffCode,
        rates: &[TariffRate],
        cancellation: &Cancellation,
    ) -> Result<usize, ReconcileError> {
        // language=sqlite
        const SQL: &str = r"
            INSERT INTO tariff_rates (code, valid_from_secs, valid_to_secs, unit_price)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT DO UPDATE SET valid_to_secs = ?3, unit_price = ?4
        ";

        cancellation.check()?;
        let code = code.to_string();
        let transaction = self.0.unchecked_transaction()?;
        {
            let mut statement = transaction.prepare_cached(SQL)?;
            for rate in rates {
                cancellation.check()?;
                statement.execute((
                    &code,
                    rate.interval.start.timestamp(),
                    rate.interval.end.timestamp(),
                    rate.unit_price.0,
                ))?;
            }
        }
        transaction.commit()?;
        debug!("upserted");
        Ok(rates.len())
    }

    /// Get the rates overlapping the interval, ordered by start.
    #[instrument(skip_all, fields(code = %code, interval = %interval))]
    pub fn query(
        &self,
        code: &TariffCode,
        interval: Interval,
    ) -> Result<Vec<TariffRate>, ReconcileError> {
        // language=sqlite
        const SQL: &str = r"
            SELECT valid_from_secs, valid_to_secs, unit_price FROM tariff_rates
            WHERE code = ?1 AND valid_from_secs < ?3 AND valid_to_secs > ?2
            ORDER BY valid_from_secs
        ";

        let rates = self
            .0
            .prepare_cached(SQL)?
            .query_map(
                (code.to_string(), interval.start.timestamp(), interval.end.timestamp()),
                |row| {
                    Ok(TariffRate::new(
                        Interval::new(
                            timestamp::from_secs(row.get(0)?)?,
                            timestamp::from_secs(row.get(1)?)?,
                        ),
                        KilowattHourRate(row.get(2)?),
                    ))
                },
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        debug!(n_rates = rates.len(), "queried");
        Ok(rates)
    }

    /// End of the contiguous stored run of rates starting at the beginning of the interval.
    ///
    /// Returns `None` when the interval start itself is not stored.
    #[instrument(skip_all, fields(code = %code, interval = %interval))]
    pub fn covered_until(
        &self,
        code: &TariffCode,
        interval: Interval,
    ) -> Result<Option<DateTime<Local>>, ReconcileError> {
        let mut covered_until: Option<DateTime<Local>> = None;
        for rate in self.query(code, interval)? {
            match covered_until {
                None if rate.interval.contains(interval.start) => {}
                Some(end) if rate.interval.start <= end => {}
                _ => break,
            }
            let end = covered_until.map_or(rate.interval.end, |end| end.max(rate.interval.end));
            covered_until = Some(end);
            if end >= interval.end {
                break;
            }
        }
        debug!(?covered_until);
        Ok(covered_until)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};

    use super::*;
    use crate::db::Db;

    fn at(minutes: i64) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap() + TimeDelta::minutes(minutes)
    }

    fn rate(start: i64, end: i64, unit_price: f64) -> TariffRate {
        TariffRate::new(Interval::new(at(start), at(end)), KilowattHourRate(unit_price))
    }

    fn agile() -> TariffCode {
        "E-1R-AGILE-24-04-03-J".parse().unwrap()
    }

    #[test]
    fn upsert_and_query_ok() -> Result {
        let db = Db::open_in_memory()?;
        let rates = [rate(0, 30, 10.0), rate(30, 60, 20.0), rate(60, 90, 30.0)];
        Rates(&db).upsert(&agile(), &rates, &Cancellation::default())?;
        Rates(&db).upsert(&agile(), &rates, &Cancellation::default())?;
        assert_eq!(Rates(&db).query(&agile(), Interval::new(at(0), at(90)))?, rates);
        assert_eq!(Rates(&db).query(&agile(), Interval::new(at(45), at(60)))?, [rates[1]]);
        Ok(())
    }

    #[test]
    fn upsert_extends_rate() -> Result {
        let db = Db::open_in_memory()?;
        Rates(&db).upsert(&agile(), &[rate(0, 60, 24.5)], &Cancellation::default())?;
        Rates(&db).upsert(&agile(), &[rate(0, 120, 24.5)], &Cancellation::default())?;
        assert_eq!(
            Rates(&db).query(&agile(), Interval::new(at(0), at(120)))?,
            [rate(0, 120, 24.5)]
        );
        Ok(())
    }

    #[test]
    fn covered_until_ok() -> Result {
        let db = Db::open_in_memory()?;
        let rates = Rates(&db);
        assert_eq!(rates.covered_until(&agile(), Interval::new(at(0), at(90)))?, None);
        rates.upsert(
            &agile(),
            &[rate(30, 60, 10.0), rate(60, 90, 20.0)],
            &Cancellation::default(),
        )?;
        assert_eq!(rates.covered_until(&agile(), Interval::new(at(30), at(120)))?, Some(at(90)));
        assert_eq!(rates.covered_until(&agile(), Interval::new(at(45), at(60)))?, Some(at(60)));
        assert_eq!(rates.covered_until(&agile(), Interval::new(at(0), at(90)))?, None);
        let other = agile().with_product("VAR-22-11-01");
        assert_eq!(rates.covered_until(&other, Interval::new(at(30), at(90)))?, None);
        Ok(())
    }

    #[test]
    fn covered_until_stops_at_hole() -> Result {
        let db = Db::open_in_memory()?;
        let rates = Rates(&db);
        rates.upsert(
            &agile(),
            &[rate(0, 30, 10.0), rate(30, 60, 20.0), rate(120, 150, 30.0)],
            &Cancellation::default(),
        )?;
        assert_eq!(rates.covered_until(&agile(), Interval::new(at(0), at(150)))?, Some(at(60)));
        assert_eq!(
            rates.covered_until(&agile(), Interval::new(at(120), at(150)))?,
            Some(at(150))
        );
        Ok(())
    }
}
