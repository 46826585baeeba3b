use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use crate::{core::interval::Interval, prelude::*, quantity::rate::KilowattHourRate};

/// Unit price valid within the interval.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TariffRate {
    pub interval: Interval,
    pub unit_price: KilowattHourRate,
}

impl TariffRate {
    pub const fn new(interval: Interval, unit_price: KilowattHourRate) -> Self {
        Self { interval, unit_price }
    }
}

/// Tariff series identity, for example: `E-1R-AGILE-24-04-03-J`.
///
/// The layout is `<fuel>-<registers>-<product>-<region>`, where the product code may contain dashes
/// itself.
#[must_use]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TariffCode {
    fuel: String,
    registers: String,
    product: String,
    region: String,
}

impl TariffCode {
    #[must_use]
    pub fn product(&self) -> &str {
        &self.product
    }

    /// Same fuel, registers, and region on another product.
    pub fn with_product(&self, product: impl Into<String>) -> Self {
        Self { product: product.into(), ..self.clone() }
    }
}

impl FromStr for TariffCode {
    type Err = Error;

    fn from_str(code: &str) -> Result<Self> {
        let parts: Vec<&str> = code.split('-').collect();
        let [fuel, registers, product @ .., region] = parts.as_slice() else {
            bail!("`{code}` is not a tariff code");
        };
        ensure!(!product.is_empty(), "`{code}` has no product code");
        ensure!(
            region.len() == 1 && region.chars().all(|c| c.is_ascii_uppercase()),
            "`{code}` does not end with a region letter",
        );
        Ok(Self {
            fuel: (*fuel).to_string(),
            registers: (*registers).to_string(),
            product: product.join("-"),
            region: (*region).to_string(),
        })
    }
}

impl Display for TariffCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}-{}", self.fuel, self.registers, self.product, self.region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ok() -> Result {
        let code: TariffCode = "E-1R-AGILE-24-04-03-J".parse()?;
        assert_eq!(code.product(), "AGILE-24-04-03");
        assert_eq!(code.to_string(), "E-1R-AGILE-24-04-03-J");
        Ok(())
    }

    #[test]
    fn with_product_ok() -> Result {
        let code: TariffCode = "E-1R-VAR-22-11-01-C".parse()?;
        assert_eq!(code.with_product("INTELLI-VAR-22-10-14").to_string(), "E-1R-INTELLI-VAR-22-10-14-C");
        Ok(())
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("AGILE".parse::<TariffCode>().is_err());
        assert!("E-1R-J".parse::<TariffCode>().is_err());
        assert!("E-1R-AGILE-24-04-03".parse::<TariffCode>().is_err());
    }
}
