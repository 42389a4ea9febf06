// File-backed data service for offline use.
//
// Reference data comes from a TOML file:
//   sites = ["North Yard", "Harbor"]
//   equipments = ["Crane 4"]
// Every saved record is appended to a JSON-lines file as one row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::{DataService, ServiceError};
use crate::models::form::FormRecord;
use crate::models::reference::ReferenceData;

/// One appended row in the records file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub submission_id: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub fields: FormRecord,
}

pub struct LocalDataService {
    reference_file: PathBuf,
    records_file: PathBuf,
}

impl LocalDataService {
    pub fn new(reference_file: impl Into<PathBuf>, records_file: impl Into<PathBuf>) -> Self {
        Self {
            reference_file: reference_file.into(),
            records_file: records_file.into(),
        }
    }

    /// Read back every stored row (oldest first).
    pub async fn read_records(&self) -> Result<Vec<StoredRecord>, ServiceError> {
        let raw = match tokio::fs::read_to_string(&self.records_file).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error("read records", &self.records_file, e)),
        };

        raw.lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| {
                serde_json::from_str::<StoredRecord>(l)
                    .map_err(|e| ServiceError::decode(format!("records file row: {}", e)))
            })
            .collect()
    }
}

fn io_error(what: &str, path: &Path, e: std::io::Error) -> ServiceError {
    ServiceError::transport(
        "The local data store could not be accessed.",
        format!("Failed to {} at {:?}: {}", what, path, e),
    )
}

#[async_trait]
impl DataService for LocalDataService {
    async fn fetch_reference_data(&self) -> Result<ReferenceData, ServiceError> {
        let raw = tokio::fs::read_to_string(&self.reference_file)
            .await
            .map_err(|e| io_error("read reference data", &self.reference_file, e))?;
        let data: ReferenceData = toml::from_str(&raw)
            .map_err(|e| ServiceError::decode(format!("reference file: {}", e)))?;
        info!(
            "[PHASE: service] [STEP: fetch_reference] Loaded {} sites, {} equipments from {:?}",
            data.sites.len(),
            data.equipments.len(),
            self.reference_file
        );
        Ok(data)
    }

    async fn save_record(&self, record: &FormRecord) -> Result<(), ServiceError> {
        let row = StoredRecord {
            submission_id: Uuid::new_v4(),
            submitted_at: Utc::now(),
            fields: record.clone(),
        };
        let mut line = serde_json::to_string(&row)
            .map_err(|e| ServiceError::decode(format!("serialize record: {}", e)))?;
        line.push('\n');

        if let Some(parent) = self.records_file.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| io_error("create records folder", parent, e))?;
            }
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.records_file)
            .await
            .map_err(|e| io_error("open records file", &self.records_file, e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| io_error("append record", &self.records_file, e))?;
        file.flush()
            .await
            .map_err(|e| io_error("flush records file", &self.records_file, e))?;

        info!(
            "[PHASE: service] [STEP: save] Appended submission {} to {:?}",
            row.submission_id, self.records_file
        );
        Ok(())
    }
}
