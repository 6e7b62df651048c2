// Constants module - centralized default values for configuration
//
// This module defines all default values used throughout the codebase.
// Using constants instead of magic numbers improves maintainability
// and makes it easier to understand and modify defaults.

// =============================================================================
// Server defaults
// =============================================================================

/// Default bind address
pub const DEFAULT_ADDRESS: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_PORT: u16 = 3000;

/// Default number of worker threads
pub const DEFAULT_THREADS: usize = 4;

/// Default maximum size of the uploaded `image` field (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Extra bytes allowed on top of the upload ceiling for multipart framing
/// (boundaries, part headers, other small fields)
pub const MULTIPART_OVERHEAD_ALLOWANCE: usize = 64 * 1024;

// =============================================================================
// External job API defaults
// =============================================================================

/// Default base URL of the watermark-removal API
pub const DEFAULT_API_BASE_URL: &str = "https://api.ezremove.ai";

/// Default `Origin` header sent to the watermark-removal API
pub const DEFAULT_API_ORIGIN: &str = "https://ezremove.ai";

/// Browser-like identity sent on every outbound request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// Job creation endpoint path
pub const CREATE_JOB_PATH: &str = "/api/ez-remove/watermark-remove/create-job";

/// Job status endpoint path (job id is appended)
pub const GET_JOB_PATH: &str = "/api/ez-remove/watermark-remove/get-job";

/// Multipart field name the API expects the image under
pub const API_IMAGE_FIELD: &str = "image_file";

/// Prefix of the per-request `product-serial` correlation token
pub const PRODUCT_SERIAL_PREFIX: &str = "sr-";

/// Status code the API reports while a job is still running
pub const API_CODE_IN_PROGRESS: i64 = 300001;

/// Status code the API reports once a job has finished successfully
pub const API_CODE_SUCCESS: i64 = 100000;

// =============================================================================
// Polling defaults
// =============================================================================

/// Default number of status checks before giving up on a job
pub const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 15;

/// Default delay before each status check in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Default number of consecutive poll transport failures tolerated (0 = fail fast)
pub const DEFAULT_POLL_TRANSPORT_RETRIES: u32 = 0;

// =============================================================================
// Relay defaults
// =============================================================================

/// Content type used when the relayed upstream omits one
pub const DEFAULT_RELAY_CONTENT_TYPE: &str = "image/png";

// =============================================================================
// Upload defaults
// =============================================================================

/// Multipart field name carrying the uploaded image
pub const UPLOAD_FIELD_NAME: &str = "image";

/// Prefix for staged upload files
pub const STAGED_FILE_PREFIX: &str = "clearmark-upload-";

// =============================================================================
// Logging defaults
// =============================================================================

/// Default log level filter
pub const DEFAULT_LOG_LEVEL: &str = "info";
