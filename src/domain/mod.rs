// Domain layer: value types and the fetcher port. No HTTP client types leak in here.

pub mod model;
pub mod ports;
