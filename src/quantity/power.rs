quantity!(Kilowatts, via: f64, suffix: "kW", precision: 2);
