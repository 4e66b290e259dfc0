//! Per-run connection session
//!
//! One `Session` is built per gather cycle and passed into the query step,
//! so concurrent workers never share transport state. The session owns every
//! ephemeral credential file created for its run and removes them at
//! teardown.

use std::path::{Path, PathBuf};

use tracing::debug;
use url::Url;

use hostgather_core::{SecretError, SecretFile};

use crate::error::GatherError;
use crate::kubeconfig::Kubeconfig;

/// Name prefix for ephemeral credential files.
const SECRET_PREFIX: &str = "kube-";

/// Location of one credential artifact.
#[derive(Debug)]
pub enum Credential {
    /// File already on disk, owned by the caller (e.g. referenced from a
    /// kubeconfig); never removed by the session
    Path(PathBuf),
    /// Decoded inline material, removed at teardown
    Ephemeral(SecretFile),
}

impl Credential {
    /// Decode base64 material into an ephemeral credential file.
    ///
    /// # Errors
    /// Returns `SecretError` on invalid base64 or I/O failure.
    pub fn ephemeral(encoded: &str) -> Result<Self, SecretError> {
        Ok(Credential::Ephemeral(SecretFile::write(
            SECRET_PREFIX,
            encoded,
        )?))
    }

    /// Filesystem path of the artifact, `None` once removed.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Credential::Path(path) => Some(path),
            Credential::Ephemeral(secret) => secret.path(),
        }
    }

    fn cleanup(&mut self) {
        if let Credential::Ephemeral(secret) = self {
            secret.remove();
        }
    }
}

/// Transport configuration for one gather cycle.
#[derive(Debug)]
pub struct Session {
    base_url: Url,
    basic_auth: Option<(String, String)>,
    token: Option<String>,
    ca_cert: Option<Credential>,
    client_cert: Option<Credential>,
    client_key: Option<Credential>,
}

impl Session {
    /// Create a session for an explicit API endpoint.
    ///
    /// # Errors
    /// Returns `GatherError::Url` when the endpoint does not parse.
    pub fn new(url: &str) -> Result<Self, GatherError> {
        Ok(Self {
            base_url: Url::parse(url)?,
            basic_auth: None,
            token: None,
            ca_cert: None,
            client_cert: None,
            client_key: None,
        })
    }

    /// Create a session from a kubeconfig file and a named context.
    ///
    /// Inline `-data` credentials become ephemeral files exactly like
    /// explicit-endpoint credentials; path-valued entries are used in place.
    ///
    /// # Errors
    /// Returns `GatherError` when the file cannot be loaded or the context
    /// does not resolve.
    pub fn from_kubeconfig(path: impl AsRef<Path>, context: &str) -> Result<Self, GatherError> {
        let config = Kubeconfig::load(path)?;
        let (cluster, user) = config.resolve(context)?;

        let mut session = Session::new(&cluster.server)?;

        if let Some(path) = &cluster.certificate_authority {
            session.ca_cert = Some(Credential::Path(PathBuf::from(path)));
        } else if let Some(data) = &cluster.certificate_authority_data {
            session.ca_cert = Some(Credential::ephemeral(data)?);
        }

        if let Some(path) = &user.client_certificate {
            session.client_cert = Some(Credential::Path(PathBuf::from(path)));
        } else if let Some(data) = &user.client_certificate_data {
            session.client_cert = Some(Credential::ephemeral(data)?);
        }

        if let Some(path) = &user.client_key {
            session.client_key = Some(Credential::Path(PathBuf::from(path)));
        } else if let Some(data) = &user.client_key_data {
            session.client_key = Some(Credential::ephemeral(data)?);
        }

        if let (Some(username), Some(password)) = (&user.username, &user.password) {
            session.basic_auth = Some((username.clone(), password.clone()));
        }
        session.token = user.token.clone();

        debug!(context, "session configured from kubeconfig");

        Ok(session)
    }

    /// Attach basic-auth credentials.
    #[must_use]
    pub fn with_basic_auth(mut self, username: &str, password: &str) -> Self {
        self.basic_auth = Some((username.to_string(), password.to_string()));
        self
    }

    /// Attach a CA bundle.
    #[must_use]
    pub fn with_ca_cert(mut self, credential: Credential) -> Self {
        self.ca_cert = Some(credential);
        self
    }

    /// Attach a client certificate.
    #[must_use]
    pub fn with_client_cert(mut self, credential: Credential) -> Self {
        self.client_cert = Some(credential);
        self
    }

    /// Attach a client key.
    #[must_use]
    pub fn with_client_key(mut self, credential: Credential) -> Self {
        self.client_key = Some(credential);
        self
    }

    /// Build a full URL from an API path.
    ///
    /// # Errors
    /// Returns `GatherError::Url` when the path does not join cleanly.
    pub fn url(&self, path: &str) -> Result<Url, GatherError> {
        Ok(self.base_url.join(path)?)
    }

    /// Construct the HTTP client for this run.
    ///
    /// CA material becomes an added root certificate; client certificate and
    /// key are concatenated into a PEM identity for mutual TLS.
    ///
    /// # Errors
    /// Returns `GatherError` when credential files cannot be read or the
    /// client fails to build.
    pub fn build_client(&self) -> Result<reqwest::Client, GatherError> {
        let mut builder = reqwest::Client::builder();

        if let Some(path) = self.ca_cert.as_ref().and_then(Credential::path) {
            let pem = std::fs::read(path)?;
            builder = builder.add_root_certificate(reqwest::Certificate::from_pem(&pem)?);
        }

        let cert_path = self.client_cert.as_ref().and_then(Credential::path);
        let key_path = self.client_key.as_ref().and_then(Credential::path);
        if let (Some(cert), Some(key)) = (cert_path, key_path) {
            let mut pem = std::fs::read(cert)?;
            pem.extend(std::fs::read(key)?);
            builder = builder.identity(reqwest::Identity::from_pem(&pem)?);
        }

        Ok(builder.build()?)
    }

    /// Apply this session's auth material to a request.
    #[must_use]
    pub fn authorize(&self, mut request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some((username, password)) = &self.basic_auth {
            request = request.basic_auth(username, Some(password));
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request
    }

    /// Paths of the ephemeral credential files currently on disk.
    #[must_use]
    pub fn ephemeral_paths(&self) -> Vec<PathBuf> {
        [
            self.ca_cert.as_ref(),
            self.client_cert.as_ref(),
            self.client_key.as_ref(),
        ]
        .into_iter()
        .flatten()
        .filter(|c| matches!(c, Credential::Ephemeral(_)))
        .filter_map(|c| c.path().map(Path::to_path_buf))
        .collect()
    }

    /// Remove every ephemeral credential file this session created. Runs on
    /// every exit path of a gather cycle; never fails outward.
    pub fn cleanup(&mut self) {
        for credential in [
            self.ca_cert.as_mut(),
            self.client_cert.as_mut(),
            self.client_key.as_mut(),
        ]
        .into_iter()
        .flatten()
        {
            credential.cleanup();
        }
    }
}
