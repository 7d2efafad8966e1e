//! Shared test infrastructure for the integration suites

pub mod database_helper;
pub mod test_data;
