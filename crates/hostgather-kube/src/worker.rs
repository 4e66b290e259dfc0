//! Kubernetes worker implementation

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{error, info, instrument, warn};

use hostgather_core::{ConfigError, HostMap, Worker};

use crate::error::GatherError;
use crate::nodes;
use crate::session::{Credential, Session};

/// Recognized parameters and defaults: connection target first, then
/// credentials, then advanced options.
const DEFAULT_PARAMETERS: &[(&str, &str)] = &[
    ("url", ""),
    ("username", ""),
    ("password", ""),
    ("client-cert", ""),
    ("client-key", ""),
    ("ca-cert", ""),
    ("kubeconfig", ""),
    ("context", ""),
];

/// Validated configuration for one run.
#[derive(Debug, Clone)]
struct Config {
    url: String,
    username: String,
    password: String,
    client_cert: String,
    client_key: String,
    ca_cert: String,
    kubeconfig: String,
    context: String,
}

/// Inventory worker for Kubernetes clusters.
///
/// Queries the node list of one cluster and emits a canonical record per
/// node. Not reentrant: the host serializes runs on an instance or creates
/// one instance per concurrent run.
pub struct KubernetesWorker {
    config: Option<Config>,
    usable: bool,
}

impl KubernetesWorker {
    /// Create a worker. The backend capability flag is resolved here, once:
    /// the HTTP client is statically linked, so the worker is usable
    /// wherever it compiles.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: None,
            usable: true,
        }
    }

    /// Choose the connection path and build the per-run session. The
    /// kubeconfig path wins when both are configured; otherwise each
    /// non-empty inline credential becomes an ephemeral file.
    fn build_session(config: &Config) -> Result<Session, GatherError> {
        if !config.kubeconfig.is_empty() && !config.context.is_empty() {
            return Session::from_kubeconfig(&config.kubeconfig, &config.context);
        }

        let mut session = Session::new(&config.url)?;
        if !config.username.is_empty() {
            session = session.with_basic_auth(&config.username, &config.password);
        }
        if !config.ca_cert.is_empty() {
            session = session.with_ca_cert(Credential::ephemeral(&config.ca_cert)?);
        }
        if !config.client_cert.is_empty() {
            session = session.with_client_cert(Credential::ephemeral(&config.client_cert)?);
        }
        if !config.client_key.is_empty() {
            session = session.with_client_key(Credential::ephemeral(&config.client_key)?);
        }
        Ok(session)
    }

    async fn gather(session: &Session) -> Result<HostMap, GatherError> {
        let client = session.build_client()?;
        let nodes = nodes::list_nodes(&client, session).await?;

        let mut hosts = HostMap::new();
        for node in &nodes.items {
            let record = nodes::normalize(node);
            if hosts.insert(record.name.clone(), record).is_some() {
                warn!(node = %node.metadata.name, "duplicate node name, keeping the later entry");
            }
        }

        info!(nodes = hosts.len(), "gathered cluster nodes");

        Ok(hosts)
    }
}

impl Default for KubernetesWorker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Worker for KubernetesWorker {
    fn parameters(&self) -> &'static [(&'static str, &'static str)] {
        DEFAULT_PARAMETERS
    }

    fn set_config(&mut self, config: &HashMap<String, String>) -> Result<(), ConfigError> {
        let get = |key: &str| config.get(key).cloned().unwrap_or_default();

        let url = get("url");
        let kubeconfig = get("kubeconfig");
        let context = get("context");

        if url.is_empty() && (kubeconfig.is_empty() || context.is_empty()) {
            return Err(ConfigError::MissingConnectionTarget);
        }

        self.config = Some(Config {
            url,
            username: get("username"),
            password: get("password"),
            client_cert: get("client-cert"),
            client_key: get("client-key"),
            ca_cert: get("ca-cert"),
            kubeconfig,
            context,
        });

        Ok(())
    }

    #[instrument(skip(self))]
    async fn run(&mut self) -> Option<HostMap> {
        let Some(config) = &self.config else {
            error!("run() called before set_config()");
            return None;
        };

        // Partially built sessions drop their credential files on the error
        // path; a built session is cleaned up explicitly below.
        let mut session = match Self::build_session(config) {
            Ok(session) => session,
            Err(e) => {
                error!(error = %e, "failed to set up cluster connection");
                return None;
            }
        };

        let result = Self::gather(&session).await;
        session.cleanup();

        match result {
            Ok(hosts) => Some(hosts),
            Err(GatherError::NotFound) => {
                error!("API endpoint not found (404)");
                None
            }
            Err(e) => {
                error!(error = %e, "failed to list cluster nodes");
                None
            }
        }
    }

    fn is_usable(&self) -> bool {
        self.usable
    }
}
