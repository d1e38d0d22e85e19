//! Static registry of the services a service depends on.
//!
//! Every service that calls others over REST keeps a `deps.yaml` at its root
//! listing, per deployment environment, the name and root domain of each
//! dependency:
//!
//! ```yaml
//! staging:
//!   - depName: onboarding
//!     depRootDomain: https://onboarding-staging.example.com
//! production:
//!   - depName: onboarding
//!     depRootDomain: https://onboarding.example.com
//! ```

use crate::connectors::client::{InterServiceClient, ServiceIdentity};
use crate::connectors::config::TokenConfig;
use crate::connectors::errors::ConnectorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEPS_FILE_NAME: &str = "deps.yaml";

/// Environment variable naming the running deployment environment
pub const ENVIRONMENT_ENV: &str = "ENVIRONMENT";

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("no deps.yaml found in {} or any parent directory", .start.display())]
    NotFound { start: PathBuf },

    #[error("can't read deps file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("can't unmarshal deps YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("the {ENVIRONMENT_ENV} environment variable is not set")]
    MissingEnvironment,

    #[error("unknown running environment `{0}`")]
    UnknownEnvironment(String),

    #[error("dependency `{name}` is not configured for the {environment} environment")]
    UnknownDependency {
        name: String,
        environment: Environment,
    },

    #[error("failed to setup isc client: {0}")]
    Client(#[from] ConnectorError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
    Staging,
    Testing,
    Demo,
    Production,
    E2e,
}

impl Environment {
    /// Environment named by `ENVIRONMENT`
    pub fn current() -> Result<Self, RegistryError> {
        let value = std::env::var(ENVIRONMENT_ENV)
            .map_err(|_| RegistryError::MissingEnvironment)?;
        value.parse()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Staging => "staging",
            Self::Testing => "testing",
            Self::Demo => "demo",
            Self::Production => "prod",
            Self::E2e => "e2e",
        }
    }
}

impl FromStr for Environment {
    type Err = RegistryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "staging" => Ok(Self::Staging),
            "testing" => Ok(Self::Testing),
            "demo" => Ok(Self::Demo),
            "prod" | "production" => Ok(Self::Production),
            "e2e" => Ok(Self::E2e),
            _ => Err(RegistryError::UnknownEnvironment(value.to_string())),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single dependency definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dep {
    pub dep_name: String,
    pub dep_root_domain: String,
}

/// Dependencies of a service, per environment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepsConfig {
    #[serde(default)]
    pub staging: Vec<Dep>,
    #[serde(default)]
    pub testing: Vec<Dep>,
    #[serde(default)]
    pub demo: Vec<Dep>,
    #[serde(default)]
    pub production: Vec<Dep>,
    #[serde(default)]
    pub e2e: Vec<Dep>,
}

impl DepsConfig {
    /// Load the nearest `deps.yaml` above the current working directory
    pub fn load() -> Result<Self, RegistryError> {
        let cwd = std::env::current_dir().map_err(|source| RegistryError::Read {
            path: PathBuf::from("."),
            source,
        })?;
        load_deps_from_yaml(find_deps_file(&cwd)?)
    }

    pub fn deps(&self, environment: Environment) -> &[Dep] {
        match environment {
            Environment::Staging => &self.staging,
            Environment::Testing => &self.testing,
            Environment::Demo => &self.demo,
            Environment::Production => &self.production,
            Environment::E2e => &self.e2e,
        }
    }

    /// Later entries with the same name override earlier ones
    pub fn dep(&self, environment: Environment, name: &str) -> Option<&Dep> {
        self.deps(environment)
            .iter()
            .rev()
            .find(|dep| dep.dep_name == name)
    }

    pub fn service_identity(
        &self,
        environment: Environment,
        name: &str,
    ) -> Result<ServiceIdentity, RegistryError> {
        let dep = self
            .dep(environment, name)
            .ok_or_else(|| RegistryError::UnknownDependency {
                name: name.to_string(),
                environment,
            })?;

        Ok(ServiceIdentity::new(
            dep.dep_name.clone(),
            dep.dep_root_domain.clone(),
        )?)
    }
}

/// Walk up from `start` until a directory containing `deps.yaml` is found
pub fn find_deps_file(start: &Path) -> Result<PathBuf, RegistryError> {
    start
        .ancestors()
        .map(|dir| dir.join(DEPS_FILE_NAME))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| RegistryError::NotFound {
            start: start.to_path_buf(),
        })
}

pub fn load_deps_from_yaml(path: impl AsRef<Path>) -> Result<DepsConfig, RegistryError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| RegistryError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(serde_yaml::from_str(&contents)?)
}

/// Client for the dependency `name` as configured for `environment`
#[tracing::instrument(name = "setup inter-service client", skip(config, token_config))]
pub fn setup_client(
    config: &DepsConfig,
    environment: Environment,
    name: &str,
    token_config: TokenConfig,
) -> Result<InterServiceClient, RegistryError> {
    let identity = config.service_identity(environment, name)?;
    tracing::debug!(root_domain = %identity.root_domain(), "resolved dependency");
    Ok(InterServiceClient::new(identity, token_config)?)
}
