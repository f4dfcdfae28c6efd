pub mod connection;
pub mod executor;
pub mod normalize;
pub mod query;
pub mod types;
