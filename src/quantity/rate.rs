quantity!(
    /// Unit price in pence per kilowatt-hour, VAT included.
    KilowattHourRate, via: f64, suffix: "p/kWh", precision: 2
);
