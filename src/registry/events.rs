// Rename notification events
//
// The registry stays decoupled from presentation: accepted renames are
// reported through an injected sink rather than printed directly. Delivery
// is synchronous on the merging thread, so sinks must not block.

use super::MemberKind;

/// One accepted, changed rename
#[derive(Debug, Clone)]
pub struct RenameEvent {
    /// The original short name, not the previous descriptive name
    pub old_name: String,

    pub new_name: String,

    pub kind: MemberKind,

    pub unique_id: String,
}

/// Receives one event per accepted, changed rename
pub trait RenameSink: Send {
    fn on_rename(&self, event: &RenameEvent);
}
