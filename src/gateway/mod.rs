mod geo;
mod protocol;
pub mod routes;
mod server;

pub use geo::*;
pub use protocol::*;
pub use server::*;
