// Rename application
//
// Writes the registry's final state back onto the symbol tree in two ordered
// phases. Namespaces go first: several types share one namespace record, and
// member identities are logged against namespace state, so the namespace map
// must be settled before any member rename lands.

use std::collections::HashMap;

use crate::registry::{starts_with_ignore_case, MemberKind, MemberRegistry};
use crate::symbols::ModuleSymbols;

/// Apply all accepted renames to the symbol tree in place
pub fn apply_renames(module: &mut ModuleSymbols, registry: &MemberRegistry, prefix: &str) {
    tracing::info!("Applying renames to module symbols...");

    apply_namespace_renames(module, registry);
    apply_member_renames(module, registry, prefix);
}

/// Phase 1: propagate namespace renames to every type that references them
fn apply_namespace_renames(module: &mut ModuleSymbols, registry: &MemberRegistry) {
    let renamed_namespaces: HashMap<&str, &str> = registry
        .records()
        .iter()
        .filter(|r| {
            r.kind == MemberKind::Namespace
                && r.is_named
                && r.current_descriptive_name != r.original_short_name
        })
        .map(|r| (r.unique_id.as_str(), r.current_descriptive_name.as_str()))
        .collect();

    if renamed_namespaces.is_empty() {
        return;
    }

    for ty in &mut module.types {
        if !ty.namespace.is_empty() {
            if let Some(&new_namespace) = renamed_namespaces.get(ty.namespace.as_str()) {
                if ty.namespace != new_namespace {
                    tracing::debug!(
                        type_name = %ty.full_name,
                        old = %ty.namespace,
                        new = %new_namespace,
                        "Renaming namespace for type"
                    );
                    ty.namespace = new_namespace.to_string();
                }
            }
        } else if let Some(&new_namespace) = renamed_namespaces.get("") {
            // Types in the global namespace move only into a non-empty target
            if !new_namespace.is_empty() {
                tracing::debug!(
                    type_name = %ty.full_name,
                    new = %new_namespace,
                    "Renaming global namespace for type"
                );
                ty.namespace = new_namespace.to_string();
            }
        }
    }
}

/// Phase 2: rename classes, methods, and fields
fn apply_member_renames(module: &mut ModuleSymbols, registry: &MemberRegistry, prefix: &str) {
    for record in registry.records() {
        if !record.is_named
            || record.current_descriptive_name.is_empty()
            || record.kind == MemberKind::Namespace
        {
            continue;
        }

        // A suggestion equal to the original short name without the prefix is
        // a no-op the oracle produced without real intent
        if record.current_descriptive_name == record.original_short_name
            && !starts_with_ignore_case(&record.current_descriptive_name, prefix)
        {
            tracing::debug!(
                unique_id = %record.unique_id,
                name = %record.current_descriptive_name,
                "Skipped rename: oracle kept the original short name"
            );
            continue;
        }

        let Some(handle) = record.handle else {
            continue;
        };

        match record.kind {
            MemberKind::Class => {
                if let Some(ty) = module.type_mut(handle) {
                    if ty.name != record.current_descriptive_name {
                        tracing::debug!(
                            full_name = %ty.full_name,
                            new = %record.current_descriptive_name,
                            "Renaming type"
                        );
                        ty.name = record.current_descriptive_name.clone();
                    }
                }
            }
            MemberKind::Method => {
                if let Some(method) = module.method_mut(handle) {
                    // Constructors and static initializers keep their names
                    if !method.is_constructor
                        && !method.is_static_constructor
                        && method.name != record.current_descriptive_name
                    {
                        tracing::debug!(
                            full_name = %method.full_name,
                            new = %record.current_descriptive_name,
                            "Renaming method"
                        );
                        method.name = record.current_descriptive_name.clone();
                    }
                }
            }
            MemberKind::Field => {
                if let Some(field) = module.field_mut(handle) {
                    if field.name != record.current_descriptive_name {
                        tracing::debug!(
                            full_name = %field.full_name,
                            new = %record.current_descriptive_name,
                            "Renaming field"
                        );
                        field.name = record.current_descriptive_name.clone();
                    }
                }
            }
            MemberKind::Namespace => {}
        }
    }
}
