//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
//! Builder for creating a [`Data API Handle`](crate::Handle)
//!
use ini::Ini;
use reqwest::{Certificate, Client};
use std::default::Default;
use std::env;
use std::result::Result;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::{ia_err, ia_error, DataApiError};
use crate::file_utils::{expand_user_home, file_to_string};
use crate::handle::Handle;
use crate::session::DataApiSession;
use crate::transport::HttpTransport;

const DEFAULT_VERSION: &str = "vLatest";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Builder used to set all the parameters to create a [`Data API Handle`](crate::Handle).
///
/// A server, a database and a username are required; everything else has a default.
/// ```no_run
/// # use fms_data_api_rust_sdk::Handle;
/// # use std::time::Duration;
/// # fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let handle = Handle::builder()
///     .server("https://fms.example.com")?
///     .database("Heroes")?
///     .credentials("admin", "admin")?
///     .timeout(Duration::from_secs(10))?
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default, Debug, Clone)]
pub struct HandleBuilder {
    pub(crate) server: String,
    pub(crate) use_https: bool,
    pub(crate) database: String,
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) version: String,
    pub(crate) timeout: Option<Duration>,
    pub(crate) add_cert: Option<Certificate>,
    pub(crate) client: Option<Client>,
    pub(crate) accept_invalid_certs: bool,
    // For error messaging
    pub(crate) from_environment: bool,
}

impl HandleBuilder {
    /// Create a new HandleBuilder struct.
    ///
    /// Consider calling [`from_environment()`](HandleBuilder::from_environment()) to collect
    /// all parameters from the local environment.
    pub fn new() -> Self {
        HandleBuilder {
            use_https: true,
            version: DEFAULT_VERSION.to_string(),
            ..Default::default()
        }
    }

    /// Build a new [`Handle`].
    ///
    /// No connection is made here; the Data API session is opened by the first request.
    ///
    /// Note: Internally, if the [`HandleBuilder`] contains
    /// a reference to an existing [`reqwest::Client`], it will clone and
    /// use that. Otherwise, it will create a new [`reqwest::Client`] for its
    /// own internal use. See [`reqwest_client()`](HandleBuilder::reqwest_client()).
    pub fn build(self) -> Result<Handle<HttpTransport>, DataApiError> {
        let hint = |var: &str, method: &str| {
            if self.from_environment {
                format!("set {}", var)
            } else {
                format!("call HandleBuilder::{}()", method)
            }
        };
        if self.server.is_empty() {
            return ia_err!("cannot build handle: no server given: {}", hint("FMS_SERVER", "server"));
        }
        if self.database.is_empty() {
            return ia_err!(
                "cannot build handle: no database given: {}",
                hint("FMS_DATABASE", "database")
            );
        }
        if self.username.is_empty() {
            return ia_err!(
                "cannot build handle: no username given: {}",
                hint("FMS_USERNAME", "credentials")
            );
        }

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let c = {
            if let Some(c) = &self.client {
                c.clone()
            } else {
                let mut cb = reqwest::Client::builder()
                    .timeout(timeout)
                    .connect_timeout(timeout);
                if let Some(cert) = &self.add_cert {
                    cb = cb.add_root_certificate(cert.clone());
                }
                if self.accept_invalid_certs {
                    cb = cb.danger_accept_invalid_certs(true);
                }
                cb.build()?
            }
        };
        let endpoint = database_url(self.use_https, &self.server, &self.version, &self.database)?;
        debug!(
            "Creating new Handle: endpoint={}, user={}, timeout={:?}",
            endpoint, self.username, timeout
        );
        let session = DataApiSession::new(&endpoint, &self.username, &self.password);
        Ok(Handle::with_transport(HttpTransport::new(
            c, endpoint, session, timeout,
        )))
    }

    /// Gather configuration settings from the current environment.
    ///
    /// Values can be overridden in code if this method is called first and other
    /// methods are called afterwards, for example:
    ///```no_run
    /// # use fms_data_api_rust_sdk::Handle;
    /// # fn run() -> Result<(), Box<dyn std::error::Error>> {
    ///   let builder = Handle::builder()
    ///       .from_environment()?
    ///       .database("Heroes")?;
    /// # Ok(())
    /// # }
    ///```
    /// The following environment variables are used:
    ///
    /// | variable | description |
    /// | -------- | ----------- |
    /// | `FMS_AUTH_FILE` | A credentials file, read first (see [`HandleBuilder::auth_from_file()`]). |
    /// | `FMS_SERVER` | The server to use. See [`HandleBuilder::server()`]. |
    /// | `FMS_DATABASE` | The hosted database (file) name. |
    /// | `FMS_USERNAME` / `FMS_PASSWORD` | Account credentials. See [`HandleBuilder::credentials()`]. |
    /// | `FMS_VERSION` | The Data API version path segment, default `vLatest`. |
    /// | `FMS_CA_CERT` | The path to a certificate file in `pem` format (see [`HandleBuilder::add_cert_from_pemfile()`]). |
    /// | `FMS_ACCEPT_INVALID_CERTS` | If this is set to `1` or `true`, do not check certificates (see [`HandleBuilder::danger_accept_invalid_certs()`]). |
    ///
    pub fn from_environment(mut self) -> Result<Self, DataApiError> {
        self.from_environment = true;
        if let Ok(val) = env::var("FMS_AUTH_FILE") {
            self = self.auth_from_file(&val)?;
        }
        if let Ok(val) = env::var("FMS_SERVER") {
            self = self.server(&val)?;
        }
        if let Ok(val) = env::var("FMS_DATABASE") {
            self = self.database(&val)?;
        }
        if let Ok(val) = env::var("FMS_USERNAME") {
            let pass = env::var("FMS_PASSWORD").unwrap_or_else(|_| self.password.clone());
            self = self.credentials(&val, &pass)?;
        } else if let Ok(val) = env::var("FMS_PASSWORD") {
            self.password = val;
        }
        if let Ok(val) = env::var("FMS_VERSION") {
            self = self.version(&val)?;
        }
        if let Ok(val) = env::var("FMS_CA_CERT") {
            self = self.add_cert_from_pemfile(&val)?;
        }
        if let Ok(val) = env::var("FMS_ACCEPT_INVALID_CERTS") {
            let lv = val.to_lowercase();
            if lv == "true" || lv == "1" {
                self = self.danger_accept_invalid_certs(true)?;
            }
        }
        Ok(self)
    }

    /// Set the FileMaker Server to connect to.
    ///
    /// The value is a host name with an optional port. A leading `https://` or
    /// `http://` selects the scheme; https is the default.
    ///
    /// Examples:
    /// ```text
    ///     fms.example.com
    ///     https://fms.example.com
    ///     http://localhost:8080
    /// ```
    pub fn server(mut self, server: &str) -> Result<Self, DataApiError> {
        let s = server.trim();
        if let Some(rest) = s.strip_prefix("https://") {
            self.use_https = true;
            self.server = rest.to_string();
        } else if let Some(rest) = s.strip_prefix("http://") {
            self.use_https = false;
            self.server = rest.to_string();
        } else {
            self.server = s.to_string();
        }
        self.server = self.server.trim_end_matches('/').to_string();
        if self.server.is_empty() || self.server.contains('/') {
            return ia_err!("invalid server '{}': expected host[:port]", server);
        }
        Ok(self)
    }

    /// Set the hosted database (file) to use.
    pub fn database(mut self, database: &str) -> Result<Self, DataApiError> {
        if database.trim().is_empty() {
            return ia_err!("database name must be non-empty");
        }
        self.database = database.to_string();
        Ok(self)
    }

    /// Specify the account used to open Data API sessions.
    pub fn credentials(mut self, username: &str, password: &str) -> Result<Self, DataApiError> {
        if username.is_empty() {
            return ia_err!("username must be non-empty");
        }
        self.username = username.to_string();
        self.password = password.to_string();
        Ok(self)
    }

    /// Set the Data API version path segment, such as `v1`, `v2` or `vLatest` (the default).
    pub fn version(mut self, version: &str) -> Result<Self, DataApiError> {
        if version.is_empty() || version.contains('/') {
            return ia_err!("invalid Data API version '{}'", version);
        }
        self.version = version.to_string();
        Ok(self)
    }

    /// Read settings from an INI credentials file, using its `DEFAULT` section.
    pub fn auth_from_file(self, filename: &str) -> Result<Self, DataApiError> {
        self.auth_from_file_with_profile(filename, "DEFAULT")
    }

    /// Read settings from a section of an INI credentials file, such as:
    ///```text
    /// [DEFAULT]
    /// server=https://fms.example.com
    /// database=Heroes
    /// username=admin
    /// password=admin
    /// # optional
    /// version=v1
    ///```
    /// A `username` is required; the other keys are applied when present.
    pub fn auth_from_file_with_profile(
        mut self,
        filename: &str,
        profile: &str,
    ) -> Result<Self, DataApiError> {
        let file_path = expand_user_home(filename)?;
        debug!(
            "reading Data API settings from file {} and profile {}",
            file_path, profile
        );
        let config = match Ini::load_from_file(&file_path) {
            Ok(c) => c,
            Err(e) => return ia_err!("error reading credentials file '{}': {}", file_path, e),
        };
        let props = config
            .section(Some(profile))
            .ok_or_else(|| ia_error!("credentials file '{}': missing profile '{}'", file_path, profile))?;
        let user = match props.get("username") {
            Some(u) if !u.is_empty() => u,
            _ => return ia_err!("username field missing from credentials file {}", file_path),
        };
        self = self.credentials(user, props.get("password").unwrap_or(""))?;
        if let Some(s) = props.get("server") {
            self = self.server(s)?;
        }
        if let Some(d) = props.get("database") {
            self = self.database(d)?;
        }
        if let Some(v) = props.get("version") {
            self = self.version(v)?;
        }
        Ok(self)
    }

    /// Add a certificate to use for https connections from a file.
    ///
    /// The file must contain an x509 certificate in `PEM` file format.
    pub fn add_cert_from_pemfile(self, pemfile: &str) -> Result<Self, DataApiError> {
        let buf = file_to_string(pemfile)?.into_bytes();
        match reqwest::Certificate::from_pem(&buf) {
            Ok(cert) => self.add_cert(cert),
            Err(e) => ia_err!("error getting certificate from pemfile {}: {}", pemfile, e),
        }
    }

    /// Add a certificate to use for https connections.
    pub fn add_cert(mut self, cert: Certificate) -> Result<Self, DataApiError> {
        self.add_cert = Some(cert);
        Ok(self)
    }

    /// Allow https connection without validating certificates.
    ///
    /// **Warning:** This is only recommended for local testing purposes. Its use is insecure. See [`reqwest::ClientBuilder::danger_accept_invalid_certs()`] for details.
    ///
    pub fn danger_accept_invalid_certs(
        mut self,
        accept_invalid_certs: bool,
    ) -> Result<Self, DataApiError> {
        self.accept_invalid_certs = accept_invalid_certs;
        Ok(self)
    }

    /// Specify a [`reqwest::Client`] to use for all http/s connections.
    ///
    /// By default, the [`Handle`](crate::Handle) creates an internal [`reqwest::Client`] to use for
    /// all communications. If your application already has a reqwest Client, you can pass that
    /// into the HandleBuilder to avoid creating multiple connection pools.
    pub fn reqwest_client(mut self, client: &Client) -> Result<Self, DataApiError> {
        self.client = Some(client.clone());
        Ok(self)
    }

    /// Specify the timeout used for operations.
    ///
    /// Currently this is used for both connection and request timeouts.
    /// Note that the request timeout can be set on a per-request basis.
    ///
    /// The default timeout is 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Result<Self, DataApiError> {
        if timeout.is_zero() {
            return ia_err!("timeout must be greater than zero");
        }
        self.timeout = Some(timeout);
        Ok(self)
    }
}

// "{scheme}://{server}/fmi/data/{version}/databases/{database}", each segment encoded
pub(crate) fn database_url(
    use_https: bool,
    server: &str,
    version: &str,
    database: &str,
) -> Result<Url, DataApiError> {
    let scheme = if use_https { "https" } else { "http" };
    let mut u = Url::parse(&format!("{}://{}", scheme, server))?;
    u.path_segments_mut()
        .map_err(|_| ia_error!("invalid server '{}'", server))?
        .clear()
        .extend(["fmi", "data", version, "databases", database]);
    Ok(u)
}
