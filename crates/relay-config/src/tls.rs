// ============================================================================
// TLS Configuration
// ============================================================================

use crate::constants::*;
use std::path::PathBuf;

/// Locations of the mutual-TLS credential material
///
/// The files are provisioned externally (e.g., mounted from cluster secrets):
/// - `ca_cert_path` - cluster CA certificate (PEM)
/// - `client_cert_path` - client certificate signed by the clients CA (PEM)
/// - `client_key_path` - private key of the client certificate (PEM)
#[derive(Clone, Debug)]
pub struct TlsConfig {
    pub ca_cert_path: PathBuf,
    pub client_cert_path: PathBuf,
    pub client_key_path: PathBuf,
}

impl TlsConfig {
    pub(crate) fn from_env() -> Self {
        Self {
            ca_cert_path: std::env::var("TLS_CA_CERT_PATH")
                .unwrap_or_else(|_| DEFAULT_CA_CERT_PATH.to_string())
                .into(),
            client_cert_path: std::env::var("TLS_CLIENT_CERT_PATH")
                .unwrap_or_else(|_| DEFAULT_CLIENT_CERT_PATH.to_string())
                .into(),
            client_key_path: std::env::var("TLS_CLIENT_KEY_PATH")
                .unwrap_or_else(|_| DEFAULT_CLIENT_KEY_PATH.to_string())
                .into(),
        }
    }
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            ca_cert_path: DEFAULT_CA_CERT_PATH.into(),
            client_cert_path: DEFAULT_CLIENT_CERT_PATH.into(),
            client_key_path: DEFAULT_CLIENT_KEY_PATH.into(),
        }
    }
}
