//! DNS handling for a managed tunnel interface: capture the servers the rest of
//! the host uses, apply an override while the tunnel is up, and release it on
//! teardown.

pub mod config;
pub mod dns;
pub mod external;
pub mod platform;
