//! Versioned EDL files.
//!
//! A file carries the EDL, the set of source clips it cuts from and a
//! schema version. Loading upgrades older layouts and re-checks the
//! timeline, so a hand-edited file with gaps or empty cuts is refused
//! before a renderer reads it.
//!
//! Schema history:
//! - 0: a bare `Edl` object
//! - 1: `{version, edl, app_version}`
//! - 2: adds `sources`

use std::collections::BTreeSet;
use std::path::Path;

use montage_core::{MontageError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::assemble::check_timeline;
use crate::decision::Edl;

/// Current schema version.
pub const CURRENT_VERSION: u32 = 2;

/// An EDL as handed to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdlFile {
    pub version: u32,
    pub edl: Edl,
    /// Distinct clip paths the decisions cut from.
    pub sources: BTreeSet<String>,
    /// Crate version that wrote this file.
    pub app_version: String,
}

impl EdlFile {
    pub fn new(edl: Edl) -> Self {
        Self {
            version: CURRENT_VERSION,
            sources: sources_of(&edl),
            edl,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| MontageError::Serialization(format!("Failed to serialize EDL: {e}")))
    }

    /// Parse, upgrade older layouts and check the timeline holds together.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let raw: Value = serde_json::from_slice(data)
            .map_err(|e| MontageError::Serialization(format!("Invalid JSON: {e}")))?;

        let version = schema_version(&raw)?;
        if version > CURRENT_VERSION {
            return Err(MontageError::Serialization(format!(
                "EDL file version {version} is newer than supported version {CURRENT_VERSION}"
            )));
        }

        let file: Self = serde_json::from_value(upgrade(raw, version)?)
            .map_err(|e| MontageError::Serialization(format!("Failed to parse EDL: {e}")))?;
        file.check()?;
        Ok(file)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => MontageError::NotFound(path.display().to_string()),
            _ => MontageError::Io(e),
        })?;
        Self::from_json(&data)
    }

    fn check(&self) -> Result<()> {
        check_timeline(&self.edl)
            .map_err(|e| MontageError::InvalidInput(format!("EDL rejected: {e}")))?;

        let referenced = sources_of(&self.edl);
        if referenced != self.sources {
            return Err(MontageError::InvalidInput(format!(
                "EDL lists sources {:?} but cuts from {:?}",
                self.sources, referenced
            )));
        }
        Ok(())
    }
}

fn sources_of(edl: &Edl) -> BTreeSet<String> {
    edl.decisions.iter().map(|d| d.clip_path.clone()).collect()
}

/// A missing `version` marks a bare EDL; anything else must fit a `u32`.
fn schema_version(raw: &Value) -> Result<u32> {
    match raw.get("version") {
        None => Ok(0),
        Some(value) => value
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| {
                MontageError::Serialization(format!("Unsupported EDL file version {value}"))
            }),
    }
}

/// Bring `data` from `from_version` up to CURRENT_VERSION one step at a time.
fn upgrade(mut data: Value, from_version: u32) -> Result<Value> {
    for version in from_version..CURRENT_VERSION {
        data = match version {
            0 => json!({
                "version": 1,
                "edl": data,
                "app_version": "0.0.0",
            }),
            1 => {
                let edl: Edl = serde_json::from_value(data["edl"].clone()).map_err(|e| {
                    MontageError::Serialization(format!("Failed to parse v1 EDL: {e}"))
                })?;
                let Some(object) = data.as_object_mut() else {
                    return Err(MontageError::Serialization(
                        "v1 EDL file is not an object".into(),
                    ));
                };
                object.insert("sources".into(), json!(sources_of(&edl)));
                object.insert("version".into(), json!(2));
                data
            }
            _ => {
                return Err(MontageError::Serialization(format!(
                    "No upgrade path from version {version}"
                )));
            }
        };
        debug!(from = version, to = version + 1, "Upgraded EDL file");
    }
    Ok(data)
}
