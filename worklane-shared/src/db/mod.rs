//! Database layer: connection pooling and migrations

pub mod migrations;
pub mod pool;
