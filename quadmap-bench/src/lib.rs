pub mod catalog;
pub mod metrics;
pub mod quads;
pub mod report;
