pub mod account;
pub mod accounting;
pub mod battery;
pub mod consumption;
pub mod interval;
pub mod meter;
pub mod product;
pub mod reconstruct;
pub mod summary;
pub mod tariff;
