mod f_jwt;

pub use f_jwt::{has_valid_jwt_bearer_token, jwt_check};

use crate::helpers::ErrorMap;
use actix_web::dev::ServiceRequest;
use std::sync::Arc;

/// A single authentication or authorization step run by the gatekeeper.
///
/// `Ok` lets the request through; `Err` carries the reason reported back to
/// the caller if no other check succeeds.
pub type CheckFn = Arc<dyn Fn(&ServiceRequest) -> Result<(), ErrorMap> + Send + Sync>;
