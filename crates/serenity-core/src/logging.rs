//! Structured logging schema and field name constants for serenity.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized field names across
//! every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Fatal configuration failures, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied (offline degrade, store fallback, aborted drain) |
//! | INFO  | Lifecycle events (startup, shutdown), sync completions |
//! | DEBUG | Decision points, queue state, config choices |
//! | TRACE | Per-record iteration during drain and load |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated across request → service → store calls.
/// Format: UUIDv7 (time-ordered).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "sync", "store", "crypto"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "recovery_service", "queue", "pool", "fallback", "remote"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "load_all", "sync", "drain", "save", "encrypt"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// User UUID the operation is scoped to.
pub const USER_ID: &str = "user_id";

/// Record UUID being operated on.
pub const RECORD_ID: &str = "record_id";

/// Collection a record belongs to.
/// Values: "crisis_resolutions", "check_in_responses", "follow_up_tasks"
pub const COLLECTION: &str = "collection";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of operations pending in the sync queue.
pub const QUEUE_LEN: &str = "queue_len";

/// Number of records read or written by an operation.
pub const RECORD_COUNT: &str = "record_count";

// ─── Sync-specific fields ──────────────────────────────────────────────────

/// Connectivity flag at the time of the operation.
pub const ONLINE: &str = "online";

/// Number of queued operations replayed before a drain ended.
pub const DRAINED: &str = "drained";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
