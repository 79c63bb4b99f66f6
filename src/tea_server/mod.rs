//! All bits and pieces concerning the HTTP expectation server are in this module.
//!
//! `exposed_server::TeaServer` is the handle crate users interact with: it owns the
//! [`Store`](crate::Store) and keeps the `hyper` server defined in the `hyper` sub-module
//! running on a background thread.
//!
//! `routes` is the boundary between the wire and the expectation engine: it decodes
//! registration payloads, turns incoming requests into [`Request`](crate::Request)s and maps
//! every outcome to an HTTP response.
mod builder;
mod exposed_server;
mod hyper;
mod routes;

pub use builder::TeaServerBuilder;
pub use exposed_server::TeaServer;
pub use routes::REGISTER_PATH;
