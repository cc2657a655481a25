//! Request/response types shared by the service, the HTTP API and the chat client.

mod execution;
mod generation;

pub use execution::*;
pub use generation::*;
