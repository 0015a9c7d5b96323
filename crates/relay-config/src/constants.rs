// ============================================================================
// Configuration Constants
// ============================================================================

// Credential material is mounted by the orchestrator before process start
pub(crate) const DEFAULT_CA_CERT_PATH: &str = "/tmp/ca/ca.crt";
pub(crate) const DEFAULT_CLIENT_CERT_PATH: &str = "/tmp/client/user.crt";
pub(crate) const DEFAULT_CLIENT_KEY_PATH: &str = "/tmp/client/user.key";

// Kafka client timeouts (in milliseconds)
pub(crate) const DEFAULT_AUTO_COMMIT_INTERVAL_MS: u64 = 1000;
pub(crate) const DEFAULT_SESSION_TIMEOUT_MS: u64 = 30000;
pub(crate) const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10000;
pub(crate) const DEFAULT_PRODUCE_TIMEOUT_MS: u64 = 10000;
pub(crate) const DEFAULT_FLUSH_TIMEOUT_MS: u64 = 3000;
pub(crate) const DEFAULT_METADATA_TIMEOUT_MS: u64 = 5000;
pub(crate) const DEFAULT_MESSAGE_MAX_BYTES: u32 = 1_048_576; // 1MB

pub(crate) const DEFAULT_REGISTRY_TIMEOUT_SECS: u64 = 10;

// Pipeline lifecycle
pub(crate) const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 5000;
pub(crate) const DEFAULT_STATUS_INTERVAL_SECS: u64 = 30;
pub(crate) const DEFAULT_READ_ERROR_BACKOFF_MS: u64 = 1000;
