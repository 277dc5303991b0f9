//! Structured logging field name constants for studyshelf.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized names across every
//! subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration, high-volume data |

// --- Identity fields -------------------------------------------------------

/// Correlation ID propagated across a request. Format: UUIDv7 (time-ordered).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "db", "client"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "pool", "file_storage", "catalog", "sessions"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "delete_class", "ensure_doc_type", "upload_note"
pub const OPERATION: &str = "op";

// --- Entity fields ---------------------------------------------------------

/// Class UUID being operated on.
pub const CLASS_ID: &str = "class_id";

/// Subject UUID being operated on.
pub const SUBJECT_ID: &str = "subject_id";

/// Chapter UUID being operated on.
pub const CHAPTER_ID: &str = "chapter_id";

/// Note UUID being operated on.
pub const NOTE_ID: &str = "note_id";

/// Entrance exam UUID being operated on.
pub const EXAM_ID: &str = "exam_id";

/// Document type UUID being operated on.
pub const DOCUMENT_TYPE_ID: &str = "document_type_id";

// --- Measurement fields ----------------------------------------------------

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of rows returned or removed by an operation.
pub const RESULT_COUNT: &str = "result_count";

/// Uploaded file size in bytes.
pub const FILE_SIZE: &str = "file_size";

// --- Database fields -------------------------------------------------------

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

/// Database table or entity affected.
pub const DB_TABLE: &str = "db_table";

// --- Outcome fields --------------------------------------------------------

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
