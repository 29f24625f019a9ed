pub mod client;
pub mod codec;
pub mod config;
pub mod model;
pub mod nmap;
pub mod ping;
pub mod pipeline;
pub mod protocol;
pub mod snapshot;
pub mod targets;
pub mod tracing;
pub mod verifier;
