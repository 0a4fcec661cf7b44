pub mod azure;
pub mod docker;
pub mod steps;
