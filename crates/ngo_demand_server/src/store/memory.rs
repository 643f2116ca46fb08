use anyhow::{bail, Context};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{sort_newest_first, DemandFilter, DemandStore, TransitionOutcome};
use crate::model::demand::base::{Demand, DemandResponse, DemandStatus};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Demands {
    demand_map: BTreeMap<Uuid, Demand>,
}

/// In-process demand store, optionally mirrored to a JSON snapshot file.
///
/// The mutex serializes all writers, which is what makes [`DemandStore::transition`] a
/// compare-and-swap. The snapshot is rewritten while the lock is still held, and a failed
/// write rolls the in-memory change back.
pub struct MemoryDemandStore {
    lock: Mutex<Demands>,
    file_name: Option<PathBuf>,
}

impl Default for MemoryDemandStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDemandStore {
    pub fn new() -> Self {
        MemoryDemandStore {
            lock: Mutex::new(Demands::default()),
            file_name: None,
        }
    }

    /// Opens a store backed by `path`, loading the snapshot if the file exists.
    pub async fn with_file(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let demands = match tokio::fs::read_to_string(&path).await {
            Ok(text) => {
                let demands: Demands = serde_json::from_str(&text)
                    .with_context(|| format!("Invalid demand snapshot {}", path.display()))?;
                log::info!(
                    "Loaded {} demands from {}",
                    demands.demand_map.len(),
                    path.display()
                );
                demands
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No demand snapshot at {}, starting empty", path.display());
                Demands::default()
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };
        Ok(MemoryDemandStore {
            lock: Mutex::new(demands),
            file_name: Some(path),
        })
    }

    async fn save(&self, demands: &Demands) -> anyhow::Result<()> {
        let Some(path) = &self.file_name else {
            return Ok(());
        };
        write_snapshot(path, demands).await
    }
}

async fn write_snapshot(path: &Path, demands: &Demands) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(demands)?;
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, text)
        .await
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

#[async_trait]
impl DemandStore for MemoryDemandStore {
    async fn insert(&self, demand: Demand) -> anyhow::Result<()> {
        let mut lock = self.lock.lock().await;
        if lock.demand_map.contains_key(&demand.id) {
            bail!("Demand with id {} already exists", demand.id);
        }
        let id = demand.id;
        lock.demand_map.insert(id, demand);
        if let Err(e) = self.save(&lock).await {
            lock.demand_map.remove(&id);
            return Err(e);
        }
        Ok(())
    }

    async fn list(&self, filter: &DemandFilter) -> anyhow::Result<Vec<Demand>> {
        let lock = self.lock.lock().await;
        let mut demands: Vec<Demand> = lock
            .demand_map
            .values()
            .filter(|demand| filter.matches(demand))
            .cloned()
            .collect();
        sort_newest_first(&mut demands);
        Ok(demands)
    }

    async fn transition(
        &self,
        id: Uuid,
        expected: DemandStatus,
        response: DemandResponse,
    ) -> anyhow::Result<TransitionOutcome> {
        let mut lock = self.lock.lock().await;
        let demand = match lock.demand_map.get_mut(&id) {
            Some(demand) => demand,
            None => return Ok(TransitionOutcome::NotFound),
        };
        if demand.status != expected {
            return Ok(TransitionOutcome::StatusMismatch(demand.clone()));
        }

        let previous = demand.clone();
        demand.apply_response(&response);
        let updated = demand.clone();

        if let Err(e) = self.save(&lock).await {
            lock.demand_map.insert(id, previous);
            return Err(e);
        }
        Ok(TransitionOutcome::Applied(updated))
    }
}
