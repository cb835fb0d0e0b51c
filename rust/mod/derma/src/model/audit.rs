use serde::{Deserialize, Serialize};

/// One audit trail record. Entries are never edited or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Time-based id (Unix milliseconds).
    pub id: u64,

    /// Local wall-clock time, `M/D/YYYY, h:mm:ss AM`.
    pub timestamp: String,

    /// Short action label, e.g. `Staff Created`.
    pub action: String,

    /// Actor display name, `Unknown` when no actor was supplied.
    pub actor_name: String,

    /// Actor role, `system` when no actor was supplied.
    pub actor_role: String,

    pub details: String,
}
