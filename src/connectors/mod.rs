//! Outbound side of inter-service communication.
//!
//! [`InterServiceClient`] signs every request with a fresh bearer token.
//! The per-service modules (`sms`, `onboarding`) are thin wrappers over its
//! `make_request`, and `registry` resolves a dependency's root domain from
//! `deps.yaml`.
//!
//! ```ignore
//! let deps = DepsConfig::load()?;
//! let isc = setup_client(&deps, Environment::current()?, "onboarding", TokenConfig::from_env()?)?;
//! let profile = OnboardingClient::new(isc).register_user(&payload).await?;
//! ```

pub mod client;
pub mod config;
pub mod errors;
pub mod onboarding;
pub mod registry;
pub mod sms;

pub use client::{expect_status, InterServiceClient, ServiceIdentity, REQUEST_TIMEOUT};
pub use config::TokenConfig;
pub use errors::ConnectorError;
pub use onboarding::{OnboardingClient, OnboardingConnector, TestUserProvisioner};
pub use registry::{
    find_deps_file, load_deps_from_yaml, setup_client, Dep, DepsConfig, Environment,
    RegistryError,
};
pub use sms::{is_kenyan_number, is_msisdn_valid, normalize_msisdn, send_otp, send_sms, verify_otp, SmsIsc};
