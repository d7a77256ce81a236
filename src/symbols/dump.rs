// Module dump loading and writing
//
// A dump is the JSON artifact the external disassembler/decompiler produces
// for one module: the symbol tree plus the decompiled source text. After the
// pipeline finishes, the mutated tree is written back as a new dump stamped
// with the input's content hash and the pass count.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::hash::sha256_hex;
use super::ModuleSymbols;

/// Serialized form of one analyzed module
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDump {
    /// Module name as reported by the loader, e.g. `payload.exe`
    pub module_name: String,

    /// Decompiled source text of the whole module
    pub decompiled_code: String,

    pub symbols: ModuleSymbols,
}

/// A loaded dump together with its provenance
#[derive(Debug, Clone)]
pub struct ProcessedModule {
    pub dump: ModuleDump,

    /// Hex SHA-256 of the dump file as read from disk
    pub sha256: String,

    pub source_path: PathBuf,
}

impl ProcessedModule {
    /// Load a module dump from disk
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read module dump from {}", path.display()))?;

        let sha256 = sha256_hex(&bytes);

        let dump: ModuleDump = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse module dump {}", path.display()))?;

        tracing::info!(
            module = %dump.module_name,
            types = dump.symbols.types.len(),
            "Loaded module dump"
        );

        Ok(Self {
            dump,
            sha256,
            source_path: path.to_path_buf(),
        })
    }

    /// Write the (renamed) dump next to the input, stamped with the content
    /// hash and pass count so repeated runs of the same module never collide.
    pub fn save_renamed(&self, pass_count: usize) -> Result<PathBuf> {
        let output_path = self.renamed_path(pass_count);

        let json = serde_json::to_string_pretty(&self.dump)
            .context("Failed to serialize renamed module dump")?;

        fs::write(&output_path, json)
            .with_context(|| format!("Failed to write renamed dump to {}", output_path.display()))?;

        Ok(output_path)
    }

    fn renamed_path(&self, pass_count: usize) -> PathBuf {
        let stem = self
            .source_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("module");
        let extension = self
            .source_path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("json");
        let hash8 = &self.sha256[..8];

        let file_name = format!("{}_renamed_{}_pass{}.{}", stem, hash8, pass_count, extension);
        match self.source_path.parent() {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }
}
