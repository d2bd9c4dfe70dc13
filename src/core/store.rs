//! File store - boxes, rejected parts and reports under the data directory
//!
//! Layout:
//!
//! ```text
//! <data_dir>/
//!   boxes/box_0001.json      one file per box (closed or open)
//!   reprovadas.json          rejected parts
//!   reports/relatorio_YYYYMMDD_HHMMSS.txt
//! ```
//!
//! Every JSON artifact is written to a temp file in the target directory,
//! fsynced, then renamed over the old file, so a failed write leaves the
//! previous version in place.

use chrono::{DateTime, Local};
use miette::Diagnostic;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use walkdir::WalkDir;

use crate::entities::part_box::BOX_SCHEMA_VERSION;
use crate::entities::{Item, PartBox};
use crate::schema::validator::{ArtifactKind, ValidationError, Validator};

const BOXES_DIR: &str = "boxes";
const REPORTS_DIR: &str = "reports";
const REJECTED_FILE: &str = "reprovadas.json";

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("I/O error on {path:?}: {source}")]
    #[diagnostic(code(qcpack::store::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path:?}: {source}")]
    #[diagnostic(code(qcpack::store::json))]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] ValidationError),

    #[error("{path:?} uses schema version {found}, newest supported is {supported}")]
    #[diagnostic(
        code(qcpack::store::version),
        help("this file was written by a newer version of qcp")
    )]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        supported: u32,
    },

    #[error("{path:?} is named for box #{expected} but contains box #{found}")]
    #[diagnostic(code(qcpack::store::box_number))]
    BoxNumberMismatch {
        path: PathBuf,
        expected: u32,
        found: u32,
    },
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// An artifact that could not be used during reconstruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedArtifact {
    pub path: PathBuf,
    pub reason: String,
}

/// Everything reconstructed from disk
#[derive(Debug, Default)]
pub struct LoadedState {
    /// Closed boxes in box-number order
    pub closed_boxes: Vec<PartBox>,

    /// The highest-numbered unclosed box, if any
    pub open_box: Option<PartBox>,

    /// Rejected parts in file order
    pub rejected: Vec<Item>,

    /// One greater than the largest part id on disk (1 when empty)
    pub next_id: u64,

    /// One greater than the largest box number seen, including skipped files
    pub next_box_number: u32,

    /// Artifacts that were ignored, with the reason
    pub skipped: Vec<SkippedArtifact>,
}

/// Handle to the on-disk store
pub struct Store {
    root: PathBuf,
    validator: Validator,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            validator: Validator::new(),
        }
    }

    pub fn boxes_dir(&self) -> PathBuf {
        self.root.join(BOXES_DIR)
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.root.join(REPORTS_DIR)
    }

    pub fn rejected_path(&self) -> PathBuf {
        self.root.join(REJECTED_FILE)
    }

    /// Path of a box artifact, e.g. boxes/box_0001.json
    pub fn box_path(&self, number: u32) -> PathBuf {
        self.boxes_dir().join(format!("box_{:04}.json", number))
    }

    /// Write a closed box to its own artifact
    pub fn save_box(&self, part_box: &PartBox) -> Result<PathBuf, StoreError> {
        debug_assert!(part_box.closed, "save_box expects a closed box");
        self.write_box(part_box)
    }

    /// Write or overwrite the in-progress box
    pub fn save_open_box(&self, part_box: &PartBox) -> Result<PathBuf, StoreError> {
        debug_assert!(!part_box.closed, "save_open_box expects an open box");
        self.write_box(part_box)
    }

    fn write_box(&self, part_box: &PartBox) -> Result<PathBuf, StoreError> {
        let path = self.box_path(part_box.number);
        write_json_atomic(&path, part_box)?;
        tracing::debug!(
            box_number = part_box.number,
            closed = part_box.closed,
            parts = part_box.len(),
            path = %path.display(),
            "saved box"
        );
        Ok(path)
    }

    /// Overwrite the rejected registry
    pub fn save_rejected(&self, rejected: &[Item]) -> Result<PathBuf, StoreError> {
        let path = self.rejected_path();
        write_json_atomic(&path, &rejected)?;
        tracing::debug!(parts = rejected.len(), path = %path.display(), "saved rejected registry");
        Ok(path)
    }

    /// Write a new report artifact. Never overwrites an older report: when
    /// the timestamped name is taken, `_1`, `_2`, ... is appended.
    pub fn save_report(&self, text: &str, at: DateTime<Local>) -> Result<PathBuf, StoreError> {
        let dir = self.reports_dir();
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

        let stem = format!("relatorio_{}", at.format("%Y%m%d_%H%M%S"));
        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| StoreError::io(&dir, e))?;
        tmp.write_all(text.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| StoreError::io(tmp.path(), e))?;

        let mut suffix = 0u32;
        loop {
            let name = if suffix == 0 {
                format!("{}.txt", stem)
            } else {
                format!("{}_{}.txt", stem, suffix)
            };
            let path = dir.join(name);
            match tmp.persist_noclobber(&path) {
                Ok(_) => {
                    tracing::debug!(path = %path.display(), "saved report");
                    return Ok(path);
                }
                Err(err) if err.error.kind() == std::io::ErrorKind::AlreadyExists => {
                    tmp = err.file;
                    suffix += 1;
                }
                Err(err) => return Err(StoreError::io(&path, err.error)),
            }
        }
    }

    /// Rebuild state from disk
    ///
    /// A missing store is a first run and yields empty state. Unreadable,
    /// malformed or schema-invalid artifacts are skipped, logged and listed
    /// in [`LoadedState::skipped`]; the rest is still loaded. Parts dropped
    /// from a loaded artifact (duplicate ids) are listed the same way.
    ///
    /// Every id found on disk stays reserved, including ids inside skipped
    /// artifacts that still parse as JSON.
    pub fn load_all(&self) -> Result<LoadedState, StoreError> {
        let mut state = LoadedState {
            next_id: 1,
            next_box_number: 1,
            ..Default::default()
        };
        let mut seen_ids: HashSet<u64> = HashSet::new();
        // Ids of dropped parts stay reserved too
        let mut max_id: u64 = 0;
        let mut unclosed: Vec<PartBox> = Vec::new();

        for (number, path) in self.box_files() {
            state.next_box_number = state.next_box_number.max(number.saturating_add(1));

            let mut part_box = match self.read_box(&path, number) {
                Ok(b) => b,
                Err(e) => {
                    max_id = max_id.max(max_recorded_id(&path));
                    skip(&mut state.skipped, &path, e.to_string());
                    continue;
                }
            };

            let items = std::mem::take(&mut part_box.items);
            for item in items {
                max_id = max_id.max(item.id);
                if !item.approved {
                    skip(&mut state.skipped, &path, format!("part #{} is not approved", item.id));
                } else if !seen_ids.insert(item.id) {
                    skip(&mut state.skipped, &path, format!("part #{} is a duplicate id", item.id));
                } else {
                    part_box.items.push(item);
                }
            }

            if part_box.closed {
                state.closed_boxes.push(part_box);
            } else {
                unclosed.push(part_box);
            }
        }

        // Box files are visited in number order, so the last unclosed one is the open box.
        state.open_box = unclosed.pop();
        for mut stray in unclosed {
            tracing::warn!(
                box_number = stray.number,
                "found more than one open box; treating the older one as closed"
            );
            stray.close();
            state.closed_boxes.push(stray);
        }
        state.closed_boxes.sort_by_key(|b| b.number);

        let rejected_path = self.rejected_path();
        if rejected_path.exists() {
            match self.read_rejected(&rejected_path) {
                Ok(items) => {
                    for item in items {
                        max_id = max_id.max(item.id);
                        if item.approved {
                            let reason = format!("part #{} is marked approved", item.id);
                            skip(&mut state.skipped, &rejected_path, reason);
                        } else if !seen_ids.insert(item.id) {
                            let reason = format!("part #{} is a duplicate id", item.id);
                            skip(&mut state.skipped, &rejected_path, reason);
                        } else {
                            state.rejected.push(item);
                        }
                    }
                }
                Err(e) => {
                    max_id = max_id.max(max_recorded_id(&rejected_path));
                    skip(&mut state.skipped, &rejected_path, e.to_string());
                    self.quarantine(&rejected_path);
                }
            }
        }

        state.next_id = max_id.saturating_add(1);

        tracing::debug!(
            closed_boxes = state.closed_boxes.len(),
            open_box = ?state.open_box.as_ref().map(|b| b.number),
            rejected = state.rejected.len(),
            next_id = state.next_id,
            skipped = state.skipped.len(),
            "loaded store"
        );
        Ok(state)
    }

    /// Box artifacts sorted by the number in their file name
    fn box_files(&self) -> Vec<(u32, PathBuf)> {
        let dir = self.boxes_dir();
        if !dir.exists() {
            return Vec::new();
        }

        let mut files: Vec<(u32, PathBuf)> = WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(err) => {
                    tracing::warn!(error = %err, "cannot read box directory entry");
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                let name = e.file_name().to_str()?;
                let number = parse_box_file_name(name)?;
                Some((number, e.into_path()))
            })
            .collect();

        files.sort_by_key(|(number, _)| *number);
        files
    }

    fn read_box(&self, path: &Path, number: u32) -> Result<PartBox, StoreError> {
        let value = self.read_validated(path, ArtifactKind::Box)?;

        let version = value
            .get("schema_version")
            .and_then(JsonValue::as_u64)
            .unwrap_or(u64::from(BOX_SCHEMA_VERSION));
        if version > u64::from(BOX_SCHEMA_VERSION) {
            return Err(StoreError::UnsupportedVersion {
                path: path.to_path_buf(),
                found: u32::try_from(version).unwrap_or(u32::MAX),
                supported: BOX_SCHEMA_VERSION,
            });
        }

        let part_box: PartBox = serde_json::from_value(value).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        if part_box.number != number {
            return Err(StoreError::BoxNumberMismatch {
                path: path.to_path_buf(),
                expected: number,
                found: part_box.number,
            });
        }
        Ok(part_box)
    }

    fn read_rejected(&self, path: &Path) -> Result<Vec<Item>, StoreError> {
        let value = self.read_validated(path, ArtifactKind::Rejected)?;
        serde_json::from_value(value).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    fn read_validated(&self, path: &Path, kind: ArtifactKind) -> Result<JsonValue, StoreError> {
        let content = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        let value: JsonValue = serde_json::from_str(&content).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        let filename = path.file_name().unwrap_or_default().to_string_lossy();
        self.validator.validate(&value, &filename, kind)?;
        Ok(value)
    }

    /// Move an unusable registry aside so the next save does not destroy it
    fn quarantine(&self, path: &Path) {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let target = path.with_extension(format!("json.corrupt-{}", stamp));
        match fs::rename(path, &target) {
            Ok(()) => tracing::warn!(from = %path.display(), to = %target.display(), "moved unreadable artifact aside"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "could not move unreadable artifact aside"),
        }
    }
}

fn skip(skipped: &mut Vec<SkippedArtifact>, path: &Path, reason: String) {
    tracing::warn!(path = %path.display(), %reason, "skipping artifact");
    skipped.push(SkippedArtifact {
        path: path.to_path_buf(),
        reason,
    });
}

/// Largest part id in an artifact that failed to load, or 0 when the
/// file is not JSON. Boxes keep parts under "items"; the registry is a list.
fn max_recorded_id(path: &Path) -> u64 {
    let Ok(content) = fs::read_to_string(path) else {
        return 0;
    };
    let Ok(value) = serde_json::from_str::<JsonValue>(&content) else {
        return 0;
    };
    let items = match &value {
        JsonValue::Array(items) => items,
        JsonValue::Object(_) => match value.get("items").and_then(JsonValue::as_array) {
            Some(items) => items,
            None => return 0,
        },
        _ => return 0,
    };
    items
        .iter()
        .filter_map(|item| item.get("id").and_then(JsonValue::as_u64))
        .max()
        .unwrap_or(0)
}

/// "box_0007.json" -> 7
fn parse_box_file_name(name: &str) -> Option<u32> {
    let digits = name.strip_prefix("box_")?.strip_suffix(".json")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;

    let mut json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    json.push('\n');

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
    tmp.write_all(json.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| StoreError::io(path, e))?;
    tmp.persist(path).map_err(|e| StoreError::io(path, e.error))?;
    Ok(())
}
