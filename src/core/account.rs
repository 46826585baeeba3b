use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::core::meter::MeterId;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Account {
    pub number: String,

    #[serde(default)]
    pub properties: Vec<Property>,
}

impl Account {
    /// Every meter with a serial number along with the property it is installed at.
    pub fn meters(&self) -> impl Iterator<Item = (&Property, &ElectricityMeterPoint, MeterId)> {
        self.properties.iter().flat_map(move |property| {
            property.electricity_meter_points.iter().flat_map(move |point| {
                point.active_meters().map(move |meter| {
                    (property, point, MeterId::new(&self.number, &point.mpan, &meter.serial_number))
                })
            })
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Property {
    pub id: u64,

    /// The consumption history starts here.
    pub moved_in_at: DateTime<Local>,

    pub moved_out_at: Option<DateTime<Local>>,

    #[serde(default)]
    pub address_line_1: Option<String>,

    #[serde(default)]
    pub town: Option<String>,

    #[serde(default)]
    pub postcode: Option<String>,

    #[serde(default)]
    pub electricity_meter_points: Vec<ElectricityMeterPoint>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ElectricityMeterPoint {
    pub mpan: String,

    #[serde(default)]
    pub profile_class: Option<u32>,

    #[serde(default)]
    pub meters: Vec<Meter>,

    #[serde(default)]
    pub agreements: Vec<Agreement>,
}

impl ElectricityMeterPoint {
    /// Meters that have been installed: the ones which are not yet, have an empty serial number.
    pub fn active_meters(&self) -> impl Iterator<Item = &Meter> {
        self.meters.iter().filter(|meter| !meter.serial_number.is_empty())
    }

    /// Agreement in effect at the moment.
    #[must_use]
    pub fn active_agreement(&self, at: DateTime<Local>) -> Option<&Agreement> {
        self.agreements.iter().find(|agreement| {
            agreement.valid_from <= at && agreement.valid_to.is_none_or(|valid_to| at < valid_to)
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Meter {
    pub serial_number: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Agreement {
    pub tariff_code: String,
    pub valid_from: DateTime<Local>,
    pub valid_to: Option<DateTime<Local>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    const ACCOUNT: &str = r#"{
        "number": "A-1234ABCD",
        "properties": [
            {
                "id": 42,
                "moved_in_at": "2023-03-01T00:00:00Z",
                "moved_out_at": null,
                "address_line_1": "1 Test Street",
                "address_line_2": "",
                "town": "LONDON",
                "county": null,
                "postcode": "N1 1AA",
                "electricity_meter_points": [
                    {
                        "mpan": "1000000000000",
                        "profile_class": 1,
                        "consumption_standard": 2900,
                        "meters": [
                            {"serial_number": "", "registers": []},
                            {"serial_number": "21L0000000", "registers": []}
                        ],
                        "agreements": [
                            {
                                "tariff_code": "E-1R-VAR-22-11-01-C",
                                "valid_from": "2023-03-01T00:00:00Z",
                                "valid_to": "2024-03-01T00:00:00Z"
                            },
                            {
                                "tariff_code": "E-1R-AGILE-24-04-03-C",
                                "valid_from": "2024-03-01T00:00:00Z",
                                "valid_to": null
                            }
                        ]
                    }
                ],
                "gas_meter_points": []
            }
        ]
    }"#;

    fn at(rfc3339: &str) -> DateTime<Local> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Local)
    }

    #[test]
    fn deserialize_ok() -> Result {
        let account: Account = serde_json::from_str(ACCOUNT)?;
        assert_eq!(account.number, "A-1234ABCD");
        assert_eq!(account.properties[0].moved_in_at, at("2023-03-01T00:00:00Z"));
        assert_eq!(account.properties[0].electricity_meter_points[0].meters.len(), 2);
        Ok(())
    }

    #[test]
    fn meters_skip_empty_serials() -> Result {
        let account: Account = serde_json::from_str(ACCOUNT)?;
        let meters: Vec<_> = account.meters().map(|(_, _, meter_id)| meter_id).collect();
        assert_eq!(meters, [MeterId::new("A-1234ABCD", "1000000000000", "21L0000000")]);
        Ok(())
    }

    #[test]
    fn active_agreement_ok() -> Result {
        let account: Account = serde_json::from_str(ACCOUNT)?;
        let point = &account.properties[0].electricity_meter_points[0];
        assert_eq!(
            point.active_agreement(at("2023-06-01T00:00:00Z")).map(|it| it.tariff_code.as_str()),
            Some("E-1R-VAR-22-11-01-C"),
        );
        assert_eq!(
            point.active_agreement(at("2024-03-01T00:00:00Z")).map(|it| it.tariff_code.as_str()),
            Some("E-1R-AGILE-24-04-03-C"),
        );
        assert!(point.active_agreement(at("2020-01-01T00:00:00Z")).is_none());
        Ok(())
    }
}
