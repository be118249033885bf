// Library for tests to access modules

pub mod aggregator;
pub mod config;
pub mod health;
pub mod models;
pub mod routes;
pub mod scheduler;
pub mod sensor;
pub mod store;
