//! Inbound and outbound adapters for the command-line front end.

pub mod csv;
