// Member registry
//
// The authoritative in-memory table of renamable symbols. Built once per run
// from the module's symbol tree, mutated only by merging oracle suggestions,
// and discarded after renames are applied.

mod events;

pub use events::{RenameEvent, RenameSink};

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::symbols::{ModuleSymbols, SymbolHandle};

/// Kind of renamable symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberKind {
    Namespace,
    Class,
    Method,
    Field,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MemberKind::Namespace => "Namespace",
            MemberKind::Class => "Class",
            MemberKind::Method => "Method",
            MemberKind::Field => "Field",
        };
        write!(f, "{}", name)
    }
}

/// One renamable symbol
#[derive(Debug, Clone)]
pub struct MemberRecord {
    /// Globally unique stable key: the fully-qualified original identifier.
    /// The empty string is reserved for the global/default namespace.
    pub unique_id: String,

    /// Short obfuscated name as it appeared in the module
    pub original_short_name: String,

    /// Current best name; starts as the original short name
    pub current_descriptive_name: String,

    pub kind: MemberKind,

    /// Free-text rationale supplied by the oracle; empty until set
    pub description: String,

    /// True once the oracle has supplied any accepted suggestion for this id
    pub is_named: bool,

    /// Index token into the symbol arena; `None` for namespaces, which are
    /// strings rather than symbol objects
    pub handle: Option<SymbolHandle>,
}

/// One entry the oracle sends back per unique id.
///
/// Unknown fields are ignored rather than rejected; the payload is untrusted.
#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionEntry {
    #[serde(rename = "DescriptiveName", default)]
    pub descriptive_name: String,

    /// Advisory member kind echoed by the oracle; not trusted, not used
    #[serde(rename = "Type", default)]
    pub kind: Option<String>,

    #[serde(rename = "Description", default)]
    pub description: String,
}

/// Snapshot entry presented to the oracle for one unnamed member
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotEntry {
    #[serde(rename = "Type")]
    pub kind: MemberKind,

    /// The original short name, not the (possibly prefixed) current name
    #[serde(rename = "DescriptiveName")]
    pub descriptive_name: String,

    #[serde(rename = "Description")]
    pub description: String,
}

/// Case-insensitive prefix test that never slices inside a code point
pub(crate) fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    let mut chars = text.chars();
    for expected in prefix.chars() {
        match chars.next() {
            Some(c) if c.eq_ignore_ascii_case(&expected) => {}
            _ => return false,
        }
    }
    true
}

/// True for `.ctor` and anything starting with it, case-insensitive.
/// Mirrors the defensive filter applied at snapshot and merge time.
fn is_constructor_name(name: &str) -> bool {
    starts_with_ignore_case(name, ".ctor")
}

/// The master table of renamable members
#[derive(Default)]
pub struct MemberRegistry {
    records: Vec<MemberRecord>,
    index: HashMap<String, usize>,
    sink: Option<Box<dyn RenameSink>>,
}

impl MemberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the sink that receives one event per accepted, changed rename.
    /// Events are delivered synchronously during merge.
    pub fn set_sink(&mut self, sink: Box<dyn RenameSink>) {
        self.sink = Some(sink);
    }

    /// Build the master list from the module's symbol tree.
    ///
    /// Registers each distinct namespace once (including the global empty
    /// namespace), every type, every non-constructor method, and every field.
    /// An empty tree yields an empty registry; that is not an error.
    pub fn populate(&mut self, module: &ModuleSymbols) {
        tracing::info!("Populating master list of identifiable members...");
        self.records.clear();
        self.index.clear();

        let mut seen_namespaces: HashSet<&str> = HashSet::new();

        for (type_index, ty) in module.types.iter().enumerate() {
            if seen_namespaces.insert(ty.namespace.as_str()) {
                self.insert(MemberRecord {
                    unique_id: ty.namespace.clone(),
                    original_short_name: ty.namespace.clone(),
                    current_descriptive_name: ty.namespace.clone(),
                    kind: MemberKind::Namespace,
                    description: String::new(),
                    is_named: false,
                    handle: None,
                });
            }

            self.insert(MemberRecord {
                unique_id: ty.full_name.clone(),
                original_short_name: ty.name.clone(),
                current_descriptive_name: ty.name.clone(),
                kind: MemberKind::Class,
                description: String::new(),
                is_named: false,
                handle: Some(SymbolHandle::Type(type_index)),
            });

            for (method_index, method) in ty.methods.iter().enumerate() {
                // Constructors cannot be freely renamed; never enumerate them
                if method.name.eq_ignore_ascii_case(".ctor") {
                    continue;
                }

                self.insert(MemberRecord {
                    unique_id: method.full_name.clone(),
                    original_short_name: method.name.clone(),
                    current_descriptive_name: method.name.clone(),
                    kind: MemberKind::Method,
                    description: String::new(),
                    is_named: false,
                    handle: Some(SymbolHandle::Method {
                        type_index,
                        method_index,
                    }),
                });
            }

            for (field_index, field) in ty.fields.iter().enumerate() {
                self.insert(MemberRecord {
                    unique_id: field.full_name.clone(),
                    original_short_name: field.name.clone(),
                    current_descriptive_name: field.name.clone(),
                    kind: MemberKind::Field,
                    description: String::new(),
                    is_named: false,
                    handle: Some(SymbolHandle::Field {
                        type_index,
                        field_index,
                    }),
                });
            }
        }
    }

    fn insert(&mut self, record: MemberRecord) {
        if self.index.contains_key(&record.unique_id) {
            tracing::debug!(unique_id = %record.unique_id, "Duplicate unique id skipped");
            return;
        }
        self.index.insert(record.unique_id.clone(), self.records.len());
        self.records.push(record);
    }

    /// Snapshot of every member still waiting for a name, keyed by unique id.
    ///
    /// An empty map is the canonical "no more work" sentinel. Constructors
    /// are already excluded at population time; the short-name filter here is
    /// defensive.
    pub fn unnamed_snapshot(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut snapshot = serde_json::Map::new();

        for record in &self.records {
            if record.is_named || is_constructor_name(&record.original_short_name) {
                continue;
            }

            let entry = SnapshotEntry {
                kind: record.kind,
                descriptive_name: record.original_short_name.clone(),
                description: record.description.clone(),
            };
            // SnapshotEntry serialization cannot fail: strings only
            if let Ok(value) = serde_json::to_value(&entry) {
                snapshot.insert(record.unique_id.clone(), value);
            }
        }

        if snapshot.is_empty() {
            tracing::debug!("No more unnamed members to include in oracle prompt data");
        } else {
            tracing::info!(
                count = snapshot.len(),
                "Preparing data for oracle: unnamed members remaining"
            );
        }

        snapshot
    }

    /// Merge a repaired oracle payload into the registry.
    ///
    /// Returns the number of records whose name actually changed. Unknown
    /// keys and blank suggestions are skipped. A suggestion that echoes the
    /// current name still marks the record as named, so the member is not
    /// re-queried on later passes.
    pub fn merge_oracle_updates(&mut self, payload: &str, prefix: &str) -> usize {
        let parsed: HashMap<String, SuggestionEntry> = match serde_json::from_str(payload) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Failed to deserialize oracle payload: {}", e);
                return 0;
            }
        };

        let mut updated_count = 0;

        for (unique_id, suggestion) in parsed {
            let Some(&position) = self.index.get(&unique_id) else {
                // Oracle hallucinated an id we never presented; ignore it
                continue;
            };

            if suggestion.descriptive_name.trim().is_empty() {
                continue;
            }

            let mut final_name = suggestion.descriptive_name.clone();
            if !starts_with_ignore_case(&final_name, prefix) {
                final_name = format!("{}{}", prefix, final_name);
            }

            let record = &mut self.records[position];
            let has_changed = record.current_descriptive_name != final_name;
            let is_constructor = is_constructor_name(&record.original_short_name);

            if has_changed && !is_constructor {
                let old_name = record.original_short_name.clone();

                record.current_descriptive_name = final_name;
                record.description = suggestion.description;
                record.is_named = true;
                updated_count += 1;

                if let Some(sink) = &self.sink {
                    sink.on_rename(&RenameEvent {
                        old_name,
                        new_name: record.current_descriptive_name.clone(),
                        kind: record.kind,
                        unique_id: record.unique_id.clone(),
                    });
                }
            } else if !record.is_named && !is_constructor {
                record.is_named = true;
                tracing::debug!(
                    unique_id = %record.unique_id,
                    original = %record.original_short_name,
                    current = %record.current_descriptive_name,
                    "Oracle suggested same name, marked as named"
                );
            }
        }

        updated_count
    }

    pub fn records(&self) -> &[MemberRecord] {
        &self.records
    }

    pub fn total_count(&self) -> usize {
        self.records.len()
    }

    pub fn named_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_named).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{FieldSymbol, MethodSymbol, TypeSymbol};
    use std::sync::{Arc, Mutex};

    fn method(name: &str, full_name: &str) -> MethodSymbol {
        MethodSymbol {
            name: name.to_string(),
            full_name: full_name.to_string(),
            is_constructor: name.eq_ignore_ascii_case(".ctor"),
            is_static_constructor: name.eq_ignore_ascii_case(".cctor"),
        }
    }

    fn sample_module() -> ModuleSymbols {
        ModuleSymbols {
            types: vec![
                TypeSymbol {
                    namespace: "x".to_string(),
                    name: "A".to_string(),
                    full_name: "x.A".to_string(),
                    methods: vec![
                        method(".ctor", "x.A::.ctor()"),
                        method(".cctor", "x.A::.cctor()"),
                        method("m1", "x.A::m1()"),
                    ],
                    fields: vec![FieldSymbol {
                        name: "f1".to_string(),
                        full_name: "x.A::f1".to_string(),
                    }],
                },
                TypeSymbol {
                    namespace: "x".to_string(),
                    name: "B".to_string(),
                    full_name: "x.B".to_string(),
                    methods: Vec::new(),
                    fields: Vec::new(),
                },
                TypeSymbol {
                    namespace: String::new(),
                    name: "C".to_string(),
                    full_name: "C".to_string(),
                    methods: Vec::new(),
                    fields: Vec::new(),
                },
            ],
        }
    }

    fn populated() -> MemberRegistry {
        let mut registry = MemberRegistry::new();
        registry.populate(&sample_module());
        registry
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Arc<Mutex<Vec<RenameEvent>>>,
    }

    impl RenameSink for RecordingSink {
        fn on_rename(&self, event: &RenameEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    #[test]
    fn test_namespace_dedup() {
        let registry = populated();
        let namespaces: Vec<_> = registry
            .records()
            .iter()
            .filter(|r| r.kind == MemberKind::Namespace)
            .collect();

        // "x" once, global "" once
        assert_eq!(namespaces.len(), 2);
        assert!(namespaces.iter().any(|r| r.unique_id == "x"));
        assert!(namespaces.iter().any(|r| r.unique_id.is_empty()));
    }

    #[test]
    fn test_constructors_excluded_from_population() {
        let registry = populated();
        assert!(registry
            .records()
            .iter()
            .all(|r| !r.original_short_name.eq_ignore_ascii_case(".ctor")));

        // Static constructors are populated; only apply protects them
        assert!(registry
            .records()
            .iter()
            .any(|r| r.original_short_name == ".cctor"));
    }

    #[test]
    fn test_empty_module_is_empty_registry() {
        let mut registry = MemberRegistry::new();
        registry.populate(&ModuleSymbols::default());
        assert_eq!(registry.total_count(), 0);
        assert!(registry.unnamed_snapshot().is_empty());
    }

    #[test]
    fn test_snapshot_sends_original_short_names() {
        let registry = populated();
        let snapshot = registry.unnamed_snapshot();

        let entry = snapshot.get("x.A").unwrap();
        assert_eq!(entry["Type"], "Class");
        assert_eq!(entry["DescriptiveName"], "A");
        assert_eq!(entry["Description"], "");
    }

    #[test]
    fn test_merge_updates_and_marks_named() {
        let mut registry = populated();
        let payload = r#"{
            "x.A": {"DescriptiveName": "NetworkClient", "Type": "Class", "Description": "talks to C2"},
            "x.A::m1()": {"DescriptiveName": "m1"},
            "nonsense": {"DescriptiveName": "Hallucinated"},
            "x.B": {"DescriptiveName": "   "}
        }"#;

        let updated = registry.merge_oracle_updates(payload, "llm_");
        // x.A changed; the m1 echo still changes once the prefix lands;
        // nonsense is unknown, x.B was blank
        assert_eq!(updated, 2);

        let class = registry
            .records()
            .iter()
            .find(|r| r.unique_id == "x.A")
            .unwrap();
        assert_eq!(class.current_descriptive_name, "llm_NetworkClient");
        assert_eq!(class.description, "talks to C2");
        assert!(class.is_named);

        let method = registry
            .records()
            .iter()
            .find(|r| r.unique_id == "x.A::m1()")
            .unwrap();
        assert!(method.is_named);
        assert_eq!(method.current_descriptive_name, "llm_m1");
        assert!(!registry.unnamed_snapshot().contains_key("x.A::m1()"));
    }

    #[test]
    fn test_echoed_current_name_marks_named_without_counting() {
        // A member whose obfuscated name happens to carry the prefix: the
        // oracle echoing it back is a no-op, but the member must still leave
        // future snapshots
        let mut registry = MemberRegistry::new();
        registry.populate(&ModuleSymbols {
            types: vec![TypeSymbol {
                namespace: "x".to_string(),
                name: "llm_done".to_string(),
                full_name: "x.llm_done".to_string(),
                methods: Vec::new(),
                fields: Vec::new(),
            }],
        });

        let payload = r#"{"x.llm_done": {"DescriptiveName": "llm_done"}}"#;
        let updated = registry.merge_oracle_updates(payload, "llm_");

        assert_eq!(updated, 0);
        let record = registry
            .records()
            .iter()
            .find(|r| r.unique_id == "x.llm_done")
            .unwrap();
        assert!(record.is_named);
        assert_eq!(record.current_descriptive_name, "llm_done");
        assert!(!registry.unnamed_snapshot().contains_key("x.llm_done"));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut registry = populated();
        let payload = r#"{"x.A": {"DescriptiveName": "NetworkClient"}}"#;

        assert_eq!(registry.merge_oracle_updates(payload, "llm_"), 1);
        // Second application changes nothing and counts nothing
        assert_eq!(registry.merge_oracle_updates(payload, "llm_"), 0);
    }

    #[test]
    fn test_prefix_applied_unless_already_present() {
        let mut registry = populated();
        let payload = r#"{
            "x.A": {"DescriptiveName": "LLM_Client"},
            "x.B": {"DescriptiveName": "Loader"}
        }"#;
        registry.merge_oracle_updates(payload, "llm_");

        let a = registry.records().iter().find(|r| r.unique_id == "x.A").unwrap();
        let b = registry.records().iter().find(|r| r.unique_id == "x.B").unwrap();
        // Case-insensitive prefix match is left alone
        assert_eq!(a.current_descriptive_name, "LLM_Client");
        assert_eq!(b.current_descriptive_name, "llm_Loader");
    }

    #[test]
    fn test_prefix_invariant_over_named_records() {
        let mut registry = populated();
        let payload = r#"{
            "x.A": {"DescriptiveName": "Client"},
            "x.A::m1()": {"DescriptiveName": "Run"},
            "x.A::f1": {"DescriptiveName": "key"},
            "x": {"DescriptiveName": "Core"}
        }"#;
        registry.merge_oracle_updates(payload, "llm_");

        for record in registry.records() {
            if record.is_named && record.current_descriptive_name != record.original_short_name {
                assert!(
                    record.current_descriptive_name.starts_with("llm_"),
                    "{} lost its prefix",
                    record.unique_id
                );
            }
        }
    }

    #[test]
    fn test_named_count_tracks_merges() {
        let mut registry = populated();
        assert_eq!(registry.named_count(), 0);

        registry.merge_oracle_updates(r#"{"x.B": {"DescriptiveName": "Loader"}}"#, "llm_");
        assert_eq!(registry.named_count(), 1);
        assert!(registry.named_count() < registry.total_count());
    }

    #[test]
    fn test_rename_events_fire_only_for_changes() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut registry = populated();
        registry.set_sink(Box::new(RecordingSink {
            events: Arc::clone(&events),
        }));

        let payload = r#"{
            "x.A": {"DescriptiveName": "Client", "Description": "d"},
            "hallucinated.Key": {"DescriptiveName": "Ignored"},
            "x.B": {"DescriptiveName": "   "}
        }"#;
        registry.merge_oracle_updates(payload, "llm_");

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].old_name, "A");
        assert_eq!(events[0].new_name, "llm_Client");
        assert_eq!(events[0].kind, MemberKind::Class);
        assert_eq!(events[0].unique_id, "x.A");
    }

    #[test]
    fn test_malformed_payload_yields_zero_updates() {
        let mut registry = populated();
        assert_eq!(registry.merge_oracle_updates("not json at all", "llm_"), 0);
        assert_eq!(registry.named_count(), 0);
    }

    #[test]
    fn test_starts_with_ignore_case_multibyte() {
        // Must not panic on multi-byte text shorter than the prefix boundary
        assert!(!starts_with_ignore_case("é", "llm_"));
        assert!(starts_with_ignore_case("LLM_é", "llm_"));
    }
}
