use std::ops::Div;

use crate::quantity::{energy::KilowattHours, rate::KilowattHourRate};

quantity!(Pence, via: f64, suffix: "p", precision: 2);

impl Pence {
    #[must_use]
    pub fn pounds(self) -> f64 {
        self.0 / 100.0
    }
}

impl Div<KilowattHours> for Pence {
    type Output = KilowattHourRate;

    fn div(self, rhs: KilowattHours) -> Self::Output {
        KilowattHourRate(self.0 / rhs.0)
    }
}
