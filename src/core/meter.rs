use std::fmt::{Display, Formatter};

/// Consumption series identity.
#[must_use]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct MeterId {
    pub account: String,

    /// Meter point administration number.
    pub mpan: String,

    pub serial: String,
}

impl MeterId {
    pub fn new(account: impl Into<String>, mpan: impl Into<String>, serial: impl Into<String>) -> Self {
        Self { account: account.into(), mpan: mpan.into(), serial: serial.into() }
    }
}

impl Display for MeterId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.account, self.mpan, self.serial)
    }
}
