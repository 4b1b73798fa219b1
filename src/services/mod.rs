// Service exports
pub mod materializer;
pub mod postgres;

pub use materializer::{plan_links, MaterializationPlan, TaCourseLink};
pub use postgres::{PostgresClient, PostgresError};
