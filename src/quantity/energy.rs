use crate::quantity::{cost::Pence, power::Kilowatts, rate::KilowattHourRate, time::Hours};

quantity!(KilowattHours, via: f64, suffix: "kWh", precision: 3);

implement_mul!(Kilowatts, Hours, KilowattHours);
implement_mul!(KilowattHours, KilowattHourRate, Pence);
