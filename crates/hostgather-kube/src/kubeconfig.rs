//! Kubeconfig file model
//!
//! Just enough of the kubeconfig schema to resolve a named context into a
//! server endpoint and its credentials. Exec plugins and proxy settings are
//! out of scope.

use std::path::Path;

use serde::Deserialize;

use crate::error::GatherError;

/// Parsed kubeconfig file.
#[derive(Debug, Deserialize)]
pub struct Kubeconfig {
    #[serde(default)]
    pub clusters: Vec<NamedCluster>,
    #[serde(default)]
    pub contexts: Vec<NamedContext>,
    #[serde(default)]
    pub users: Vec<NamedUser>,
}

#[derive(Debug, Deserialize)]
pub struct NamedCluster {
    pub name: String,
    pub cluster: Cluster,
}

#[derive(Debug, Deserialize)]
pub struct Cluster {
    /// API server endpoint
    pub server: String,
    /// CA bundle path
    #[serde(rename = "certificate-authority")]
    pub certificate_authority: Option<String>,
    /// Inline base64 CA bundle
    #[serde(rename = "certificate-authority-data")]
    pub certificate_authority_data: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NamedContext {
    pub name: String,
    pub context: Context,
}

#[derive(Debug, Deserialize)]
pub struct Context {
    pub cluster: String,
    pub user: String,
}

#[derive(Debug, Deserialize)]
pub struct NamedUser {
    pub name: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct User {
    /// Client certificate path
    #[serde(rename = "client-certificate")]
    pub client_certificate: Option<String>,
    /// Inline base64 client certificate
    #[serde(rename = "client-certificate-data")]
    pub client_certificate_data: Option<String>,
    /// Client key path
    #[serde(rename = "client-key")]
    pub client_key: Option<String>,
    /// Inline base64 client key
    #[serde(rename = "client-key-data")]
    pub client_key_data: Option<String>,
    /// Basic-auth username
    pub username: Option<String>,
    /// Basic-auth password
    pub password: Option<String>,
    /// Bearer token
    pub token: Option<String>,
}

impl Kubeconfig {
    /// Load and parse a kubeconfig file.
    ///
    /// # Errors
    /// Returns `GatherError` when the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GatherError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&raw)?)
    }

    /// Resolve a named context to its cluster and user entries.
    ///
    /// # Errors
    /// Returns `GatherError::Kubeconfig` when the context, its cluster or
    /// its user is not present in the file.
    pub fn resolve(&self, context: &str) -> Result<(&Cluster, &User), GatherError> {
        let ctx = self
            .contexts
            .iter()
            .find(|c| c.name == context)
            .map(|c| &c.context)
            .ok_or_else(|| GatherError::Kubeconfig(format!("context not found: {context}")))?;

        let cluster = self
            .clusters
            .iter()
            .find(|c| c.name == ctx.cluster)
            .map(|c| &c.cluster)
            .ok_or_else(|| GatherError::Kubeconfig(format!("cluster not found: {}", ctx.cluster)))?;

        let user = self
            .users
            .iter()
            .find(|u| u.name == ctx.user)
            .map(|u| &u.user)
            .ok_or_else(|| GatherError::Kubeconfig(format!("user not found: {}", ctx.user)))?;

        Ok((cluster, user))
    }
}
