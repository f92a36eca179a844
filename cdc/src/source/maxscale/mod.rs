//! Stream source reading from a MariaDB MaxScale CDC listener.
//!
//! The listener speaks a line oriented protocol over TCP. After an authentication and a
//! registration round trip, the client requests the change stream of one table and the listener
//! answers with one record per line, starting with the schema of the table.

mod client;
mod hex;
mod source;

pub use client::{MaxScaleClient, MaxScaleStream, auth_message};
pub use source::MaxScaleSource;
