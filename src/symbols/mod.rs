// Symbol model for a loaded .NET module
//
// The disassembler/decompiler toolchain lives outside this crate; it hands us
// a module dump (symbol tree + decompiled source text) and takes back the
// renamed tree. Symbols are held in an arena and addressed through opaque
// index handles so the registry never aliases live symbol objects.

mod dump;
mod hash;

pub use dump::{ModuleDump, ProcessedModule};
pub use hash::sha256_hex;

use serde::{Deserialize, Serialize};

/// A method definition inside a type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodSymbol {
    /// Short name as it appears in the module (mutable)
    pub name: String,

    /// Stable fully-qualified identifier, e.g. `Ns.Type::Method(System.String)`
    pub full_name: String,

    /// Instance constructor (`.ctor`)
    #[serde(default)]
    pub is_constructor: bool,

    /// Static/type initializer (`.cctor`)
    #[serde(default)]
    pub is_static_constructor: bool,
}

/// A field definition inside a type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSymbol {
    pub name: String,

    /// Stable fully-qualified identifier, e.g. `Ns.Type::field`
    pub full_name: String,
}

/// A type definition: class, struct, enum, or interface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeSymbol {
    /// Namespace string; empty for the global/default namespace
    #[serde(default)]
    pub namespace: String,

    pub name: String,

    /// Stable fully-qualified identifier, e.g. `Ns.Type`
    pub full_name: String,

    #[serde(default)]
    pub methods: Vec<MethodSymbol>,

    #[serde(default)]
    pub fields: Vec<FieldSymbol>,
}

/// The full symbol tree of one module
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleSymbols {
    #[serde(default)]
    pub types: Vec<TypeSymbol>,
}

/// Opaque token addressing one symbol in the arena.
///
/// Handles are stored in the registry instead of references; they are only
/// resolved back to symbols when renames are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolHandle {
    Type(usize),
    Method { type_index: usize, method_index: usize },
    Field { type_index: usize, field_index: usize },
}

impl ModuleSymbols {
    pub fn type_at(&self, index: usize) -> Option<&TypeSymbol> {
        self.types.get(index)
    }

    pub fn type_mut(&mut self, handle: SymbolHandle) -> Option<&mut TypeSymbol> {
        match handle {
            SymbolHandle::Type(index) => self.types.get_mut(index),
            _ => None,
        }
    }

    pub fn method_mut(&mut self, handle: SymbolHandle) -> Option<&mut MethodSymbol> {
        match handle {
            SymbolHandle::Method {
                type_index,
                method_index,
            } => self
                .types
                .get_mut(type_index)
                .and_then(|ty| ty.methods.get_mut(method_index)),
            _ => None,
        }
    }

    pub fn field_mut(&mut self, handle: SymbolHandle) -> Option<&mut FieldSymbol> {
        match handle {
            SymbolHandle::Field {
                type_index,
                field_index,
            } => self
                .types
                .get_mut(type_index)
                .and_then(|ty| ty.fields.get_mut(field_index)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_module() -> ModuleSymbols {
        ModuleSymbols {
            types: vec![TypeSymbol {
                namespace: "a".to_string(),
                name: "b".to_string(),
                full_name: "a.b".to_string(),
                methods: vec![MethodSymbol {
                    name: "c".to_string(),
                    full_name: "a.b::c()".to_string(),
                    is_constructor: false,
                    is_static_constructor: false,
                }],
                fields: vec![FieldSymbol {
                    name: "d".to_string(),
                    full_name: "a.b::d".to_string(),
                }],
            }],
        }
    }

    #[test]
    fn test_handle_resolution() {
        let mut module = sample_module();

        let method = module
            .method_mut(SymbolHandle::Method {
                type_index: 0,
                method_index: 0,
            })
            .unwrap();
        assert_eq!(method.name, "c");

        let field = module
            .field_mut(SymbolHandle::Field {
                type_index: 0,
                field_index: 0,
            })
            .unwrap();
        assert_eq!(field.name, "d");

        assert!(module.type_mut(SymbolHandle::Type(0)).is_some());
        assert!(module.type_mut(SymbolHandle::Type(7)).is_none());
    }

    #[test]
    fn test_mismatched_handle_kind() {
        let mut module = sample_module();
        assert!(module.method_mut(SymbolHandle::Type(0)).is_none());
        assert!(module.field_mut(SymbolHandle::Type(0)).is_none());
    }
}
