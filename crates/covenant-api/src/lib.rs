//! HTTP admin surface over the operator console: contract creation,
//! listing, explicit transitions, and the status-change log.

mod server;

pub use server::{serve, ServerError};
