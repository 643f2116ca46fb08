//! Storage boundary for demands.
//!
//! Every status change goes through [`DemandStore::transition`], a conditional update that
//! only applies while the stored status still equals the expected one. Implementations must
//! make that check-and-write atomic; the manager holds no locks of its own.

use async_trait::async_trait;
use uuid::Uuid;

use crate::model::demand::base::{Demand, DemandResponse, DemandStatus};

pub mod memory;

pub use memory::MemoryDemandStore;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DemandFilter {
    pub ngo_id: Option<String>,
    pub status: Option<DemandStatus>,
}

impl DemandFilter {
    pub fn open() -> Self {
        DemandFilter {
            ngo_id: None,
            status: Some(DemandStatus::Open),
        }
    }

    pub fn by_ngo(ngo_id: impl Into<String>) -> Self {
        DemandFilter {
            ngo_id: Some(ngo_id.into()),
            status: None,
        }
    }

    pub fn matches(&self, demand: &Demand) -> bool {
        if let Some(ngo_id) = &self.ngo_id {
            if &demand.ngo_id != ngo_id {
                return false;
            }
        }
        if let Some(status) = self.status {
            if demand.status != status {
                return false;
            }
        }
        true
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TransitionOutcome {
    /// The precondition held and the response was written.
    Applied(Demand),
    NotFound,
    /// The stored status differed from the expected one; the record is returned unchanged.
    StatusMismatch(Demand),
}

#[async_trait]
pub trait DemandStore: Send + Sync {
    async fn insert(&self, demand: Demand) -> anyhow::Result<()>;

    /// Demands matching `filter`, newest first.
    async fn list(&self, filter: &DemandFilter) -> anyhow::Result<Vec<Demand>>;

    /// Applies `response` only if the demand's current status equals `expected`.
    async fn transition(
        &self,
        id: Uuid,
        expected: DemandStatus,
        response: DemandResponse,
    ) -> anyhow::Result<TransitionOutcome>;
}

/// Newest `created_at` first, ties broken by id so listings are stable.
pub fn sort_newest_first(demands: &mut [Demand]) {
    demands.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
