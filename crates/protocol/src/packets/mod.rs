//! Message definitions for the slither protocol.
//!
//! This module contains both client->server and server->client message types.

mod client;
mod server;

pub use client::*;
pub use server::*;
