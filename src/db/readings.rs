use rusqlite::{Connection, OptionalExtension};

use crate::{
    cancellation::Cancellation,
    core::{consumption::ConsumptionInterval, interval::Interval, meter::MeterId},
    db::timestamp,
    error::ReconcileError,
    prelude::*,
    quantity::energy::KilowattHours,
};

/// Consumption readings per meter.
#[must_use]
pub struct Readings<'c>(pub &'c Connection);

impl Readings<'_> {
    /// Insert or overwrite the readings in a single transaction.
    ///
    /// Either all readings get stored, or none of them.
    #[instrument(skip_all, fields(meter = %meter, n_readings = readings.len()))]
    pub fn upsert(
        &self,
        meter: &MeterId,
        readings: &[ConsumptionInterval],
        cancellation: &Cancellation,
    ) -> Result<usize, ReconcileError> {
        // language=sqlite
        const SQL: &str = r"
            INSERT INTO consumption (account, mpan, serial, start_secs, end_secs, kwh)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT DO UPDATE SET end_secs = ?5, kwh = ?6
        ";

        cancellation.check()?;
        let transaction = self.0.unchecked_transaction()?;
        {
            let mut statement = transaction.prepare_cached(SQL)?;
            for reading in readings {
                cancellation.check()?;
                statement.execute((
                    &meter.account,
                    &meter.mpan,
                    &meter.serial,
                    reading.interval.start.timestamp(),
                    reading.interval.end.timestamp(),
                    reading.consumption.0,
                ))?;
            }
        }
        transaction.commit()?;
        debug!("upserted");
        Ok(readings.len())
    }

    /// Get the readings overlapping the interval, ordered by start.
    #[instrument(skip_all, fields(meter = %meter, interval = %interval))]
    pub fn query(
        &self,
        meter: &MeterId,
        interval: Interval,
    ) -> Result<Vec<ConsumptionInterval>, ReconcileError> {
        // language=sqlite
        const SQL: &str = r"
            SELECT start_secs, end_secs, kwh FROM consumption
            WHERE account = ?1 AND mpan = ?2 AND serial = ?3 AND start_secs < ?5 AND end_secs > ?4
            ORDER BY start_secs
        ";

        let readings = self
            .0
            .prepare_cached(SQL)?
            .query_map(
                (
                    &meter.account,
                    &meter.mpan,
                    &meter.serial,
                    interval.start.timestamp(),
                    interval.end.timestamp(),
                ),
                |row| {
                    Ok(ConsumptionInterval::new(
                        Interval::new(
                            timestamp::from_secs(row.get(0)?)?,
                            timestamp::from_secs(row.get(1)?)?,
                        ),
                        KilowattHours(row.get(2)?),
                    ))
                },
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        debug!(n_readings = readings.len(), "queried");
        Ok(readings)
    }

    /// Watermark: the end of the latest stored reading.
    #[instrument(skip_all, fields(meter = %meter))]
    pub fn latest_end(
        &self,
        meter: &MeterId,
    ) -> Result<Option<chrono::DateTime<chrono::Local>>, ReconcileError> {
        // language=sqlite
        const SQL: &str = r"
            SELECT MAX(end_secs) FROM consumption WHERE account = ?1 AND mpan = ?2 AND serial = ?3
        ";

        let secs: Option<i64> = self
            .0
            .prepare_cached(SQL)?
            .query_row((&meter.account, &meter.mpan, &meter.serial), |row| row.get(0))
            .optional()?
            .flatten();
        Ok(secs.map(timestamp::from_secs).transpose()?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Local, TimeDelta, TimeZone};

    use super::*;
    use crate::db::Db;

    fn at(minutes: i64) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap() + TimeDelta::minutes(minutes)
    }

    fn reading(start: i64, consumption: f64) -> ConsumptionInterval {
        ConsumptionInterval::new(Interval::new(at(start), at(start + 30)), KilowattHours(consumption))
    }

    fn meter() -> MeterId {
        MeterId::new("A-1", "1000000000000", "21L0000000")
    }

    #[test]
    fn upsert_is_idempotent() -> Result {
        let db = Db::open_in_memory()?;
        let readings = [reading(0, 1.0), reading(30, 2.0)];
        Readings(&db).upsert(&meter(), &readings, &Cancellation::default())?;
        Readings(&db).upsert(&meter(), &readings, &Cancellation::default())?;
        let stored = Readings(&db).query(&meter(), Interval::new(at(0), at(60)))?;
        assert_eq!(stored, readings);
        Ok(())
    }

    #[test]
    fn upsert_overwrites_value() -> Result {
        let db = Db::open_in_memory()?;
        Readings(&db).upsert(&meter(), &[reading(0, 1.0)], &Cancellation::default())?;
        Readings(&db).upsert(&meter(), &[reading(0, 1.5)], &Cancellation::default())?;
        let stored = Readings(&db).query(&meter(), Interval::new(at(0), at(30)))?;
        assert_eq!(stored, [reading(0, 1.5)]);
        Ok(())
    }

    #[test]
    fn failed_batch_is_rolled_back() -> Result {
        let db = Db::open_in_memory()?;
        // NaN is stored as `NULL` and violates the constraint:
        let result = Readings(&db).upsert(
            &meter(),
            &[reading(0, 1.0), reading(30, f64::NAN)],
            &Cancellation::default(),
        );
        assert!(matches!(result, Err(ReconcileError::Storage(_))));
        assert!(Readings(&db).query(&meter(), Interval::new(at(0), at(60)))?.is_empty());
        Ok(())
    }

    #[test]
    fn cancelled_batch_stores_nothing() -> Result {
        let db = Db::open_in_memory()?;
        let cancellation = Cancellation::default();
        cancellation.cancel();
        let result = Readings(&db).upsert(&meter(), &[reading(0, 1.0)], &cancellation);
        assert!(matches!(result, Err(ReconcileError::Cancelled)));
        assert_eq!(Readings(&db).latest_end(&meter())?, None);
        Ok(())
    }

    #[test]
    fn query_returns_overlapping_in_order() -> Result {
        let db = Db::open_in_memory()?;
        let readings = [reading(60, 3.0), reading(0, 1.0), reading(30, 2.0), reading(120, 4.0)];
        Readings(&db).upsert(&meter(), &readings, &Cancellation::default())?;
        let stored = Readings(&db).query(&meter(), Interval::new(at(15), at(90)))?;
        assert_eq!(stored, [reading(0, 1.0), reading(30, 2.0), reading(60, 3.0)]);
        Ok(())
    }

    #[test]
    fn series_are_isolated() -> Result {
        let db = Db::open_in_memory()?;
        Readings(&db).upsert(&meter(), &[reading(0, 1.0)], &Cancellation::default())?;
        let other = MeterId::new("A-1", "1000000000000", "OTHER");
        assert!(Readings(&db).query(&other, Interval::new(at(0), at(30)))?.is_empty());
        Ok(())
    }

    #[test]
    fn latest_end_ok() -> Result {
        let db = Db::open_in_memory()?;
        assert_eq!(Readings(&db).latest_end(&meter())?, None);
        Readings(&db).upsert(
            &meter(),
            &[reading(0, 1.0), reading(90, 2.0)],
            &Cancellation::default(),
        )?;
        assert_eq!(Readings(&db).latest_end(&meter())?, Some(at(120)));
        Ok(())
    }
}
