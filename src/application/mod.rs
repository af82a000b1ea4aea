// Application layer: the service every client goes through,
// its error type, policy switches and report shapes.

pub mod error;
pub mod policy;
pub mod reporting;
mod service;

pub use error::*;
pub use policy::*;
pub use reporting::*;
pub use service::*;
