pub mod dataset;
pub mod error;
pub mod location;
pub mod output;
pub mod report;
pub mod station;
pub mod stats;
pub mod trip;
