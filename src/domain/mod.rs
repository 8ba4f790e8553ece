// Domain layer - Plain data types and pure rules
pub mod disease;
pub mod drawing;
pub mod live;
pub mod metric;
pub mod sensor;
pub mod threshold;
pub mod timeseries;
