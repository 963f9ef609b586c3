//! Client and server roles and the end-to-end encrypted evaluation.

mod client;
pub mod library;
mod server;
mod session;

pub use client::Client;
pub use server::Server;
pub use session::{Session, SessionError, SessionReport};
