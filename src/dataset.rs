//! Data preparation: raw CSV rows → normalized `MatchRecord` snapshot.
//!
//! Unit and label conversion happen exactly once, at the
//! `MatchRecord::from_raw` boundary. The prepared type stores minutes and
//! labels only, so an already-prepared record can never be converted again.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::DashboardError;

/// Columns every dataset row must carry.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "seasonId",
    "gameDuration",
    "win",
    "firstBlood",
    "firstTower",
    "firstInhibitor",
    "firstBaron",
    "firstDragon",
];

/// Two-valued display label for the binary outcome flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FlagLabel {
    Yes,
    No,
}

impl FlagLabel {
    pub fn is_yes(self) -> bool {
        matches!(self, FlagLabel::Yes)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FlagLabel::Yes => "Yes",
            FlagLabel::No => "No",
        }
    }

    /// Accepts the raw 0/1 encoding and the canonical labels, so re-entering
    /// an already-exported dataset does not flip or reject anything.
    fn from_cell(cell: &str) -> Option<Self> {
        match cell.trim() {
            "1" | "Yes" => Some(FlagLabel::Yes),
            "0" | "No" => Some(FlagLabel::No),
            _ => None,
        }
    }
}

/// The five "first X" map objectives, in canonical column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Objective {
    Blood,
    Tower,
    Inhibitor,
    Baron,
    Dragon,
}

impl Objective {
    pub const ALL: [Objective; 5] = [
        Objective::Blood,
        Objective::Tower,
        Objective::Inhibitor,
        Objective::Baron,
        Objective::Dragon,
    ];

    /// Position in the canonical order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Source column name.
    pub fn column(self) -> &'static str {
        match self {
            Objective::Blood => "firstBlood",
            Objective::Tower => "firstTower",
            Objective::Inhibitor => "firstInhibitor",
            Objective::Baron => "firstBaron",
            Objective::Dragon => "firstDragon",
        }
    }

    /// Display name, without the "first" prefix.
    pub fn name(self) -> &'static str {
        match self {
            Objective::Blood => "Blood",
            Objective::Tower => "Tower",
            Objective::Inhibitor => "Inhibitor",
            Objective::Baron => "Baron",
            Objective::Dragon => "Dragon",
        }
    }
}

/// One dataset row as it sits on disk: duration in seconds, flags as the
/// raw cell text. Flags are decoded as strings so validation can tell a
/// re-entered label apart from garbage.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMatchRow {
    #[serde(rename = "seasonId")]
    pub season_id: i64,
    #[serde(rename = "gameDuration")]
    pub game_duration: f64,
    pub win: String,
    #[serde(rename = "firstBlood")]
    pub first_blood: String,
    #[serde(rename = "firstTower")]
    pub first_tower: String,
    #[serde(rename = "firstInhibitor")]
    pub first_inhibitor: String,
    #[serde(rename = "firstBaron")]
    pub first_baron: String,
    #[serde(rename = "firstDragon")]
    pub first_dragon: String,
}

/// One prepared game: duration in minutes, flags as labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchRecord {
    pub season_id: i64,
    pub duration_min: f64,
    pub win: FlagLabel,
    pub first_blood: FlagLabel,
    pub first_tower: FlagLabel,
    pub first_inhibitor: FlagLabel,
    pub first_baron: FlagLabel,
    pub first_dragon: FlagLabel,
}

impl MatchRecord {
    /// The single conversion boundary: seconds → minutes, 0/1 → labels.
    /// `row` is the zero-based data row index, used for error reporting.
    pub fn from_raw(row: usize, raw: &RawMatchRow) -> Result<Self, DashboardError> {
        if !raw.game_duration.is_finite() || raw.game_duration < 0.0 {
            return Err(DashboardError::DataFormat {
                row,
                column: "gameDuration".to_string(),
                reason: format!("invalid duration {}", raw.game_duration),
            });
        }

        Ok(Self {
            season_id: raw.season_id,
            duration_min: raw.game_duration / 60.0,
            win: parse_flag(row, "win", &raw.win)?,
            first_blood: parse_flag(row, "firstBlood", &raw.first_blood)?,
            first_tower: parse_flag(row, "firstTower", &raw.first_tower)?,
            first_inhibitor: parse_flag(row, "firstInhibitor", &raw.first_inhibitor)?,
            first_baron: parse_flag(row, "firstBaron", &raw.first_baron)?,
            first_dragon: parse_flag(row, "firstDragon", &raw.first_dragon)?,
        })
    }

    pub fn objective(&self, objective: Objective) -> FlagLabel {
        match objective {
            Objective::Blood => self.first_blood,
            Objective::Tower => self.first_tower,
            Objective::Inhibitor => self.first_inhibitor,
            Objective::Baron => self.first_baron,
            Objective::Dragon => self.first_dragon,
        }
    }
}

fn parse_flag(row: usize, column: &str, cell: &str) -> Result<FlagLabel, DashboardError> {
    FlagLabel::from_cell(cell).ok_or_else(|| DashboardError::DataFormat {
        row,
        column: column.to_string(),
        reason: format!("expected 0, 1, Yes or No, got '{}'", cell),
    })
}

/// Prepare raw rows into records. Pure; the input is left untouched and the
/// first bad cell aborts the whole load rather than producing a partially
/// converted dataset.
pub fn prepare(rows: &[RawMatchRow]) -> Result<Vec<MatchRecord>, DashboardError> {
    rows.iter()
        .enumerate()
        .map(|(row, raw)| MatchRecord::from_raw(row, raw))
        .collect()
}

/// SHA-256 hex digest of the dataset bytes.
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Immutable prepared dataset. Built once per distinct file content and
/// only ever handed out behind `Arc`; derivations receive views of it as
/// explicit parameters.
#[derive(Debug)]
pub struct DatasetSnapshot {
    records: Vec<MatchRecord>,
    fingerprint: String,
}

impl DatasetSnapshot {
    /// Parse and prepare an in-memory CSV document.
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self, DashboardError> {
        Self::parse(bytes, fingerprint(bytes))
    }

    fn parse(bytes: &[u8], fingerprint: String) -> Result<Self, DashboardError> {
        let mut reader = csv::Reader::from_reader(bytes);
        let headers = reader.headers()?.clone();

        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|header| header == column) {
                return Err(DashboardError::MissingColumn { column });
            }
        }

        let mut rows = Vec::new();
        for (row, result) in reader.deserialize::<RawMatchRow>().enumerate() {
            rows.push(result.map_err(|err| decode_error(row, &headers, err))?);
        }

        Ok(Self {
            records: prepare(&rows)?,
            fingerprint,
        })
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Distinct seasons, ascending. Populates the filter control.
    pub fn season_ids(&self) -> Vec<i64> {
        let mut seasons: Vec<i64> = self.records.iter().map(|r| r.season_id).collect();
        seasons.sort_unstable();
        seasons.dedup();
        seasons
    }

    /// The filtered view: records whose season is in the selected set,
    /// source order preserved.
    pub fn view(&self, seasons: &[i64]) -> Vec<MatchRecord> {
        self.records
            .iter()
            .filter(|record| seasons.contains(&record.season_id))
            .copied()
            .collect()
    }
}

fn decode_error(row: usize, headers: &csv::StringRecord, err: csv::Error) -> DashboardError {
    if let csv::ErrorKind::Deserialize { err: de, .. } = err.kind() {
        let column = de
            .field()
            .and_then(|field| headers.get(field as usize))
            .unwrap_or("<unknown>")
            .to_string();
        return DashboardError::DataFormat {
            row,
            column,
            reason: de.to_string(),
        };
    }
    DashboardError::Csv(err)
}

/// Read a dataset file and prepare it, bypassing the cache.
pub fn load_dataset(path: &Path) -> Result<DatasetSnapshot, DashboardError> {
    let bytes = fs::read(path)?;
    DatasetSnapshot::from_csv_bytes(&bytes)
}

static SNAPSHOT_CACHE: OnceLock<Mutex<Option<Arc<DatasetSnapshot>>>> = OnceLock::new();

/// Process-wide memoized load. Keyed by the content fingerprint rather than
/// process lifetime, so a dataset rewritten on disk is re-prepared instead
/// of served stale. Torn down with the process.
pub fn cached_snapshot(path: &Path) -> Result<Arc<DatasetSnapshot>, DashboardError> {
    let cache = SNAPSHOT_CACHE.get_or_init(|| Mutex::new(None));

    let bytes = fs::read(path)?;
    let fingerprint = fingerprint(&bytes);

    let mut guard = cache.lock().expect("Snapshot cache mutex poisoned");
    if let Some(snapshot) = guard.as_ref() {
        if snapshot.fingerprint == fingerprint {
            return Ok(Arc::clone(snapshot));
        }
    }

    let snapshot = Arc::new(DatasetSnapshot::parse(&bytes, fingerprint)?);
    *guard = Some(Arc::clone(&snapshot));
    Ok(snapshot)
}
