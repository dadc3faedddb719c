//! Query service for the prime cache.
//!
//! Clients open a TCP connection and exchange newline-delimited JSON: one
//! request object per line in, one response object per line out.
//!
//! ```text
//! → {"method":"Sieve","hi":30}
//! ← {"p":[2,3,5,7,11,13,17,19,23,29]}
//! → {"method":"Stats"}
//! ← {"metrics":{"cached_primes":10.0,"degenerate":0.0,...}}
//! → {"method":"ListMethods"}
//! ← {"methods":["ListMethods","Sieve","Stats"]}
//! ```
//!
//! Requests are answered by a [`PrimeSource`](source::PrimeSource): either
//! the shared incremental cache or a stateless full sieve per request.

pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod source;

pub use config::{Backend, ConfigOverrides, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use server::PrimeServer;
pub use source::{build_source, IncrementalSource, OneShotSource, PrimeSource};
