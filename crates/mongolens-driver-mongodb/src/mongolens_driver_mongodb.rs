//! MongoDB driver for MongoLens
//!
//! Implements the `ConnectionDriver` and `DataService` traits from
//! `mongolens-core` on top of the official `mongodb` crate. One client is
//! kept per connected saved connection.
//!
//! # Example
//!
//! ```ignore
//! use mongolens_driver_mongodb::MongoDbDriver;
//! use std::sync::Arc;
//!
//! let driver = Arc::new(MongoDbDriver::new());
//! // driver.connect(&saved).await?;
//! // let databases = driver.list_databases(&saved.id).await?;
//! ```

mod driver;
#[cfg(test)]
mod driver_tests;
mod schema;
#[cfg(test)]
mod schema_tests;

pub use driver::*;
pub use schema::{bson_type_name, collect_field_types};
