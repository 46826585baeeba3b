mod models;

use std::time::Duration;

use base64::{Engine, prelude::BASE64_STANDARD};
use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use ureq::Agent;

use self::models::{Page, Reading, UnitRate};
use crate::{
    api::Remote,
    core::{
        account::Account,
        consumption::ConsumptionInterval,
        interval::Interval,
        meter::MeterId,
        product::Product,
        tariff::{TariffCode, TariffRate},
    },
    prelude::*,
};

/// Connection settings, passed explicitly instead of living in globals.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL, for example: `https://api.octopus.energy/`.
    pub endpoint: String,

    pub account: Option<String>,
    pub api_key: Option<String>,
}

pub struct Api {
    client: Agent,
    config: Config,
    authorization: Option<String>,
}

impl Api {
    const PAGE_SIZE: usize = 1500;

    pub fn new(config: Config) -> Self {
        let client =
            Agent::config_builder().timeout_global(Some(Duration::from_secs(30))).build().into();
        let authorization = config
            .api_key
            .as_ref()
            .map(|api_key| format!("Basic {}", BASE64_STANDARD.encode(format!("{api_key}:"))));
        Self { client, config, authorization }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.endpoint.trim_end_matches('/'))
    }

    fn get<R: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<R> {
        debug!(url, "GET");
        let mut request = self
            .client
            .get(url)
            .query_pairs(query.iter().map(|(key, value)| (*key, value.as_str())));
        if let Some(authorization) = &self.authorization {
            request = request.header("Authorization", authorization);
        }
        request
            .call()
            .with_context(|| format!("request to `{url}` failed"))?
            .body_mut()
            .read_json::<R>()
            .with_context(|| format!("failed to deserialize the response from `{url}`"))
    }

    /// Follow the `next` links until the last page.
    fn get_all<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<Vec<T>> {
        let mut page: Page<T> = self.get(url, query)?;
        let mut results = Vec::with_capacity(page.count.unwrap_or_default());
        loop {
            results.extend(page.results);
            let Some(next) = page.next else {
                break;
            };
            page = self.get(&next, &[])?;
        }
        debug!(n_results = results.len(), "fetched all pages");
        Ok(results)
    }

    fn period_query(interval: Interval) -> [(&'static str, String); 3] {
        [
            ("page_size", Self::PAGE_SIZE.to_string()),
            ("period_from", format_timestamp(interval.start)),
            ("period_to", format_timestamp(interval.end)),
        ]
    }
}

impl Remote for Api {
    #[instrument(skip_all, fields(account = ?self.config.account))]
    fn fetch_account(&self) -> Result<Account> {
        let number = self.config.account.as_deref().context("account number is not configured")?;
        info!("fetching the account…");
        self.get(&self.url(&format!("v1/accounts/{number}/")), &[])
    }

    #[instrument(skip_all, fields(meter = %meter, interval = %interval))]
    fn fetch_consumption(
        &self,
        meter: &MeterId,
        interval: Interval,
    ) -> Result<Vec<ConsumptionInterval>> {
        info!("fetching consumption…");
        let url = self.url(&format!(
            "v1/electricity-meter-points/{}/meters/{}/consumption/",
            meter.mpan, meter.serial,
        ));
        let mut query = Self::period_query(interval).to_vec();
        query.push(("order_by", "period".to_string()));
        let mut readings: Vec<ConsumptionInterval> = self
            .get_all::<Reading>(&url, &query)?
            .into_iter()
            .map(ConsumptionInterval::from)
            .collect();
        readings.sort_by_key(|reading| reading.interval.start);
        info!(n_readings = readings.len(), "fetched");
        Ok(readings)
    }

    #[instrument(skip_all, fields(code = %code, interval = %interval))]
    fn fetch_tariff_rates(&self, code: &TariffCode, interval: Interval) -> Result<Vec<TariffRate>> {
        info!("fetching unit rates…");
        let url = self.url(&format!(
            "v1/products/{}/electricity-tariffs/{code}/standard-unit-rates/",
            code.product(),
        ));
        let mut rates: Vec<TariffRate> = self
            .get_all::<UnitRate>(&url, &Self::period_query(interval))?
            .into_iter()
            .map(|rate| rate.into_rate(interval.end))
            .filter(|rate| rate.interval.start < rate.interval.end)
            .collect();
        rates.sort_by_key(|rate| rate.interval.start);
        info!(n_rates = rates.len(), "fetched");
        Ok(rates)
    }

    #[instrument(skip_all, fields(available_at = ?available_at))]
    fn fetch_products(&self, available_at: Option<DateTime<Local>>) -> Result<Vec<Product>> {
        info!("fetching products…");
        let query: Vec<_> = available_at
            .map(|available_at| ("available_at", format_timestamp(available_at)))
            .into_iter()
            .collect();
        self.get_all(&self.url("v1/products/"), &query)
    }
}

fn format_timestamp(timestamp: DateTime<Local>) -> String {
    timestamp.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn api() -> Api {
        Api::new(Config {
            endpoint: "https://api.octopus.energy/".to_string(),
            account: None,
            api_key: Some("sk_live_key".to_string()),
        })
    }

    #[test]
    fn url_ok() {
        assert_eq!(api().url("v1/products/"), "https://api.octopus.energy/v1/products/");
    }

    #[test]
    fn authorization_ok() {
        assert_eq!(api().authorization.as_deref(), Some("Basic c2tfbGl2ZV9rZXk6"));
    }

    #[test]
    fn format_timestamp_ok() {
        let timestamp = Utc.with_ymd_and_hms(2025, 1, 15, 12, 30, 0).unwrap().with_timezone(&Local);
        assert_eq!(format_timestamp(timestamp), "2025-01-15T12:30:00Z");
    }

    #[test]
    fn fetch_account_requires_number() {
        assert!(api().fetch_account().is_err());
    }

    #[test]
    #[ignore = "makes the API request"]
    fn fetch_products_ok() -> Result {
        let products = api().fetch_products(Some(Local::now()))?;
        assert!(!products.is_empty());
        Ok(())
    }

    #[test]
    #[ignore = "makes the API request"]
    fn fetch_tariff_rates_ok() -> Result {
        let code: TariffCode = "E-1R-AGILE-24-10-01-C".parse()?;
        let end = Local::now();
        let interval = Interval::new(end - chrono::TimeDelta::days(1), end);
        let rates = api().fetch_tariff_rates(&code, interval)?;
        assert!(rates.is_sorted_by_key(|rate| rate.interval.start));
        Ok(())
    }
}
