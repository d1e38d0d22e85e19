pub mod authentication;

pub use authentication::{Gatekeeper, GatekeeperMiddleware};
