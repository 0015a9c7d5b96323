// ============================================================================
// Secure Channel Factory - mutual TLS material for Kafka and the registry
// ============================================================================
//
// Loads the cluster CA and the client certificate/key pair once at startup.
// The resulting context is immutable and shared read-only by the inbound
// channel, the outbound channel and the schema registry client.
//
// Any missing, unreadable or malformed file is a ConfigError: the relay must
// never fall back to an unauthenticated connection.
//
// ============================================================================

use rdkafka::config::ClientConfig;
use relay_config::TlsConfig;
use relay_error::RelayError;
use std::fmt;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Loaded mutual-TLS credential material
#[derive(Clone)]
pub struct SecureChannelContext {
    ca_pem: String,
    client_cert_pem: String,
    client_key_pem: String,
    ca_cert_count: usize,
}

impl SecureChannelContext {
    /// Configure an rdkafka client for mutual TLS
    ///
    /// PEM material is passed inline so the files are read exactly once.
    pub fn apply_to(&self, config: &mut ClientConfig) {
        config
            .set("security.protocol", "ssl")
            .set("ssl.ca.pem", &self.ca_pem)
            .set("ssl.certificate.pem", &self.client_cert_pem)
            .set("ssl.key.pem", &self.client_key_pem);
    }

    /// HTTP client builder trusting only the cluster CA and presenting the
    /// client identity
    pub fn http_client_builder(&self) -> Result<reqwest::ClientBuilder, RelayError> {
        let roots = reqwest::Certificate::from_pem_bundle(self.ca_pem.as_bytes())
            .map_err(|e| RelayError::config(format!("invalid CA bundle: {}", e)))?;

        let mut identity_pem = self.client_cert_pem.clone().into_bytes();
        identity_pem.push(b'\n');
        identity_pem.extend_from_slice(self.client_key_pem.as_bytes());
        let identity = reqwest::Identity::from_pem(&identity_pem)
            .map_err(|e| RelayError::config(format!("invalid client identity: {}", e)))?;

        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .tls_built_in_root_certs(false)
            .identity(identity);
        for root in roots {
            builder = builder.add_root_certificate(root);
        }

        Ok(builder)
    }

    pub fn ca_cert_count(&self) -> usize {
        self.ca_cert_count
    }
}

impl fmt::Debug for SecureChannelContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureChannelContext")
            .field("ca_cert_count", &self.ca_cert_count)
            .field("client_key", &"<redacted>")
            .finish()
    }
}

/// Builds a [`SecureChannelContext`] from externally provisioned files
pub struct SecureChannelFactory {
    config: TlsConfig,
}

impl SecureChannelFactory {
    pub fn new(config: TlsConfig) -> Self {
        Self { config }
    }

    /// Read and validate the CA certificate and the client certificate/key pair
    ///
    /// # Errors
    /// `RelayError::Config` if any file is missing, unreadable, or does not
    /// contain the expected PEM material. No retries: the files are expected
    /// to be mounted before the process starts.
    pub fn build(&self) -> Result<SecureChannelContext, RelayError> {
        let ca_pem = read_pem_file(&self.config.ca_cert_path, "CA certificate")?;
        let ca_cert_count = count_certificates(&ca_pem, &self.config.ca_cert_path)?;

        let client_cert_pem = read_pem_file(&self.config.client_cert_path, "client certificate")?;
        count_certificates(&client_cert_pem, &self.config.client_cert_path)?;

        let client_key_pem = read_pem_file(&self.config.client_key_path, "client private key")?;
        ensure_private_key(&client_key_pem, &self.config.client_key_path)?;

        info!(
            ca_path = %self.config.ca_cert_path.display(),
            client_cert_path = %self.config.client_cert_path.display(),
            ca_cert_count = ca_cert_count,
            "Loaded mutual TLS credentials"
        );

        Ok(SecureChannelContext {
            ca_pem,
            client_cert_pem,
            client_key_pem,
            ca_cert_count,
        })
    }
}

fn read_pem_file(path: &Path, what: &str) -> Result<String, RelayError> {
    std::fs::read_to_string(path).map_err(|e| {
        RelayError::config(format!(
            "could not open {} file {}: {}",
            what,
            path.display(),
            e
        ))
    })
}

fn count_certificates(pem: &str, path: &Path) -> Result<usize, RelayError> {
    let certs = rustls_pemfile::certs(&mut BufReader::new(pem.as_bytes()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            RelayError::config(format!("malformed certificate in {}: {}", path.display(), e))
        })?;

    if certs.is_empty() {
        return Err(RelayError::config(format!(
            "no PEM certificate found in {}",
            path.display()
        )));
    }

    Ok(certs.len())
}

fn ensure_private_key(pem: &str, path: &Path) -> Result<(), RelayError> {
    match rustls_pemfile::private_key(&mut BufReader::new(pem.as_bytes())) {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(RelayError::config(format!(
            "no PEM private key found in {}",
            path.display()
        ))),
        Err(e) => Err(RelayError::config(format!(
            "malformed private key in {}: {}",
            path.display(),
            e
        ))),
    }
}
