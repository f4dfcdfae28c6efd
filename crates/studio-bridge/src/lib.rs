//! Relay between an embedded studio document and a host-held database
//! connection.
//!
//! The embedded side sends `query` / `transaction` messages; the
//! [`Dispatcher`](adapters::bridge::dispatcher::Dispatcher) runs them on an
//! [`Executor`](crate::core::executor::Executor) and answers with normalized,
//! type-annotated tables built by [`normalize`](crate::core::normalize::normalize).

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;

pub use crate::adapters::bridge::{
    dispatcher::{BridgeState, Dispatcher, InboundMessage, ReplyPort},
    protocol::{ClientRequest, ClientResponse, Outcome, RequestId, RequestKind, ResponseData},
};
pub use crate::config::Credentials;
pub use crate::core::{
    connection::SqliteExecutor,
    executor::{BatchMode, Executor},
    normalize::{classify_type, normalize},
    types::{ColumnHeader, ColumnType, DriverResult, NormalizedResult, QueryStat},
};
pub use crate::error::{AppError, AppResult};
