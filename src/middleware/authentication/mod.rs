mod gatekeeper;
mod gatekeeper_middleware;
mod getheader;
pub mod method;

pub use gatekeeper::*;
pub use gatekeeper_middleware::*;
pub use getheader::*;
