//! Demand lifecycle: creation, listing and the restaurant responses.
//!
//! ```text
//!            accept
//!   OPEN ──────────────> ACCEPTED
//!     │
//!     └──── ignore ────> IGNORED
//! ```
//!
//! Both terminal states are final for every restaurant. Transitions are written through
//! [`DemandStore::transition`], so two restaurants racing on the same demand produce exactly
//! one winner and a `Conflict` for the other.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{DemandError, Result};
use crate::model::demand::base::{Demand, DemandResponse, DemandStatus, NewDemand};
use crate::model::principal::{Capability, Principal};
use crate::store::{DemandFilter, DemandStore, TransitionOutcome};

#[derive(Clone)]
pub struct DemandManager {
    store: Arc<dyn DemandStore>,
}

fn require(principal: &Principal, capability: Capability) -> Result<()> {
    if principal.can(capability) {
        Ok(())
    } else {
        log::debug!(
            "Principal {} ({}) may not {}",
            principal.id,
            principal.role,
            capability
        );
        Err(DemandError::Forbidden(format!(
            "role {} may not {}",
            principal.role, capability
        )))
    }
}

impl DemandManager {
    pub fn new(store: Arc<dyn DemandStore>) -> Self {
        DemandManager { store }
    }

    pub async fn create_demand(&self, principal: &Principal, payload: NewDemand) -> Result<Demand> {
        require(principal, Capability::CreateDemand)?;

        let fields = payload.validate().map_err(|fields| {
            DemandError::InvalidInput(format!(
                "missing or empty field(s): {}",
                fields.join(", ")
            ))
        })?;

        let demand = Demand::open(principal.organization_id.clone(), fields, Utc::now());
        self.store.insert(demand.clone()).await?;
        log::info!(
            "NGO {} created demand {} ({} x {})",
            demand.ngo_id,
            demand.id,
            demand.quantity,
            demand.description
        );
        Ok(demand)
    }

    /// Open demands for restaurants to browse, newest first.
    pub async fn get_all_demands(&self, principal: &Principal) -> Result<Vec<Demand>> {
        require(principal, Capability::BrowseOpenDemands)?;
        Ok(self.store.list(&DemandFilter::open()).await?)
    }

    pub async fn get_demands_by_ngo(
        &self,
        principal: &Principal,
        ngo_id: &str,
    ) -> Result<Vec<Demand>> {
        require(principal, Capability::ViewOwnDemands)?;
        if principal.organization_id != ngo_id {
            log::debug!(
                "Principal {} of NGO {} asked for demands of NGO {}",
                principal.id,
                principal.organization_id,
                ngo_id
            );
            return Err(DemandError::Forbidden(
                "an NGO admin may only view its own demands".to_string(),
            ));
        }
        Ok(self.store.list(&DemandFilter::by_ngo(ngo_id)).await?)
    }

    pub async fn accept_demand(&self, principal: &Principal, demand_id: Uuid) -> Result<Demand> {
        self.respond(principal, demand_id, DemandStatus::Accepted)
            .await
    }

    /// Closes the demand for every restaurant, not only the caller.
    pub async fn ignore_demand(&self, principal: &Principal, demand_id: Uuid) -> Result<Demand> {
        self.respond(principal, demand_id, DemandStatus::Ignored)
            .await
    }

    async fn respond(
        &self,
        principal: &Principal,
        demand_id: Uuid,
        status: DemandStatus,
    ) -> Result<Demand> {
        require(principal, Capability::RespondToDemand)?;

        let response = DemandResponse {
            status,
            restaurant_id: principal.organization_id.clone(),
            responded_at: Utc::now(),
        };
        match self
            .store
            .transition(demand_id, DemandStatus::Open, response)
            .await?
        {
            TransitionOutcome::Applied(demand) => {
                log::info!(
                    "Restaurant {} moved demand {} to {}",
                    principal.organization_id,
                    demand.id,
                    demand.status
                );
                Ok(demand)
            }
            TransitionOutcome::NotFound => Err(DemandError::NotFound(demand_id)),
            TransitionOutcome::StatusMismatch(current) => {
                log::warn!(
                    "Restaurant {} tried to mark demand {} {}, but it is already {}",
                    principal.organization_id,
                    demand_id,
                    status,
                    current.status
                );
                Err(DemandError::Conflict {
                    id: demand_id,
                    status: current.status,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::principal::Role;
    use crate::store::MemoryDemandStore;

    fn manager() -> DemandManager {
        DemandManager::new(Arc::new(MemoryDemandStore::new()))
    }

    fn ngo(org: &str) -> Principal {
        Principal::new(format!("admin-{org}"), Role::NgoAdmin, org)
    }

    fn restaurant(org: &str) -> Principal {
        Principal::new(format!("staff-{org}"), Role::Restaurant, org)
    }

    fn meals() -> NewDemand {
        NewDemand {
            description: Some("10 meals".to_string()),
            quantity: Some(10),
            location: Some("Downtown".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_demand_is_open_and_owned() {
        let m = manager();
        let demand = m.create_demand(&ngo("N1"), meals()).await.unwrap();
        assert_eq!(demand.status, DemandStatus::Open);
        assert_eq!(demand.ngo_id, "N1");
        assert_eq!(demand.restaurant_id, None);
        assert_eq!(demand.responded_at, None);
        assert_eq!(demand.description, "10 meals");
        assert_eq!(demand.quantity, 10);
        assert_eq!(demand.location, "Downtown");
    }

    #[tokio::test]
    async fn test_create_demand_rejects_restaurant() {
        let m = manager();
        let err = m.create_demand(&restaurant("R1"), meals()).await.unwrap_err();
        assert!(matches!(err, DemandError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_create_demand_rejects_missing_fields() {
        let m = manager();
        let payload = NewDemand {
            location: Some("".to_string()),
            ..meals()
        };
        let err = m.create_demand(&ngo("N1"), payload).await.unwrap_err();
        match err {
            DemandError::InvalidInput(msg) => assert!(msg.contains("location")),
            other => panic!("unexpected error {:?}", other),
        }
        assert!(m
            .get_demands_by_ngo(&ngo("N1"), "N1")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_get_all_demands_is_empty_without_demands() {
        let m = manager();
        assert!(m.get_all_demands(&restaurant("R1")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_all_demands_requires_restaurant() {
        let m = manager();
        let err = m.get_all_demands(&ngo("N1")).await.unwrap_err();
        assert!(matches!(err, DemandError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_get_all_demands_hides_resolved() {
        let m = manager();
        let a = m.create_demand(&ngo("N1"), meals()).await.unwrap();
        let b = m.create_demand(&ngo("N2"), meals()).await.unwrap();
        m.ignore_demand(&restaurant("R1"), a.id).await.unwrap();

        let open = m.get_all_demands(&restaurant("R2")).await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, b.id);
    }

    #[tokio::test]
    async fn test_ngo_listing_round_trip() {
        let m = manager();
        let created = m.create_demand(&ngo("N1"), meals()).await.unwrap();
        m.create_demand(&ngo("N2"), meals()).await.unwrap();

        let listed = m.get_demands_by_ngo(&ngo("N1"), "N1").await.unwrap();
        assert_eq!(listed, vec![created]);
    }

    #[tokio::test]
    async fn test_ngo_listing_includes_resolved_newest_first() {
        let m = manager();
        let first = m.create_demand(&ngo("N1"), meals()).await.unwrap();
        let second = m.create_demand(&ngo("N1"), meals()).await.unwrap();
        m.accept_demand(&restaurant("R1"), first.id).await.unwrap();

        let listed = m.get_demands_by_ngo(&ngo("N1"), "N1").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].created_at >= listed[1].created_at);
        let ids: Vec<Uuid> = listed.iter().map(|d| d.id).collect();
        assert!(ids.contains(&first.id) && ids.contains(&second.id));
    }

    #[tokio::test]
    async fn test_scenarios_accept_then_conflict() {
        let m = manager();
        // A
        let demand = m.create_demand(&ngo("N1"), meals()).await.unwrap();
        assert_eq!(demand.status, DemandStatus::Open);

        // B
        let visible = m.get_all_demands(&restaurant("R1")).await.unwrap();
        assert!(visible.iter().any(|d| d.id == demand.id));
        let accepted = m.accept_demand(&restaurant("R1"), demand.id).await.unwrap();
        assert_eq!(accepted.status, DemandStatus::Accepted);
        assert_eq!(accepted.restaurant_id.as_deref(), Some("R1"));
        assert_eq!(accepted.responding_restaurant_id.as_deref(), Some("R1"));
        assert!(accepted.responded_at.is_some());

        // C
        let err = m.accept_demand(&restaurant("R2"), demand.id).await.unwrap_err();
        assert!(matches!(
            err,
            DemandError::Conflict {
                status: DemandStatus::Accepted,
                ..
            }
        ));

        // D
        let err = m.get_demands_by_ngo(&ngo("N2"), "N1").await.unwrap_err();
        assert!(matches!(err, DemandError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_terminal_states_are_final() {
        let m = manager();
        let demand = m.create_demand(&ngo("N1"), meals()).await.unwrap();
        let ignored = m.ignore_demand(&restaurant("R1"), demand.id).await.unwrap();
        assert_eq!(ignored.status, DemandStatus::Ignored);
        assert_eq!(ignored.restaurant_id, None);

        for attempt in 0..3 {
            let r = restaurant(&format!("R{attempt}"));
            assert!(matches!(
                m.accept_demand(&r, demand.id).await,
                Err(DemandError::Conflict { .. })
            ));
            assert!(matches!(
                m.ignore_demand(&r, demand.id).await,
                Err(DemandError::Conflict { .. })
            ));
        }

        let stored = m.get_demands_by_ngo(&ngo("N1"), "N1").await.unwrap();
        assert_eq!(stored, vec![ignored]);
    }

    #[tokio::test]
    async fn test_accept_unknown_demand_is_not_found() {
        let m = manager();
        let id = Uuid::new_v4();
        let err = m.accept_demand(&restaurant("R1"), id).await.unwrap_err();
        assert!(matches!(err, DemandError::NotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn test_ignore_unknown_demand_is_not_found() {
        let m = manager();
        m.create_demand(&ngo("N1"), meals()).await.unwrap();
        let id = Uuid::new_v4();
        let err = m.ignore_demand(&restaurant("R1"), id).await.unwrap_err();
        assert!(matches!(err, DemandError::NotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn test_ngo_admin_cannot_respond() {
        let m = manager();
        let demand = m.create_demand(&ngo("N1"), meals()).await.unwrap();
        let err = m.accept_demand(&ngo("N1"), demand.id).await.unwrap_err();
        assert!(matches!(err, DemandError::Forbidden(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_accepts_have_one_winner() {
        let m = manager();
        let id = m.create_demand(&ngo("N1"), meals()).await.unwrap().id;

        let attempts = 16;
        let handles: Vec<_> = (0..attempts)
            .map(|i| {
                let m = m.clone();
                let r = restaurant(&format!("R{i}"));
                tokio::spawn(async move { m.accept_demand(&r, id).await })
            })
            .collect();

        let mut winners = Vec::new();
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(d) => winners.push(d),
                Err(DemandError::Conflict { .. }) => conflicts += 1,
                Err(e) => panic!("unexpected error {:?}", e),
            }
        }
        assert_eq!(winners.len(), 1);
        assert_eq!(conflicts, attempts - 1);

        let stored = m.get_demands_by_ngo(&ngo("N1"), "N1").await.unwrap();
        assert_eq!(stored[0].restaurant_id, winners[0].restaurant_id);
    }
}
