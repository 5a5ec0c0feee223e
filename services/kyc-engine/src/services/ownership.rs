use super::crud::CrudService;
use crate::errors::{KycEngineError, Result};
use crate::models::Ownership;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Ultimate beneficial owners of a party, with the threshold applied.
#[derive(Debug, Clone, Serialize)]
pub struct BeneficialOwners {
    pub party_id: Uuid,
    pub threshold_percent: Decimal,
    pub owners: Vec<Ownership>,
    /// Combined share held by the listed owners
    pub total_percentage: Decimal,
}

pub struct OwnershipService {
    ownerships: Arc<CrudService<Ownership>>,
    threshold: Decimal,
}

impl OwnershipService {
    pub fn new(ownerships: Arc<CrudService<Ownership>>, threshold_percent: f64) -> Result<Self> {
        let threshold = Decimal::try_from(threshold_percent).map_err(|e| {
            KycEngineError::Internal(format!("invalid UBO threshold {}: {}", threshold_percent, e))
        })?;

        Ok(OwnershipService {
            ownerships,
            threshold,
        })
    }

    pub fn threshold(&self) -> Decimal {
        self.threshold
    }

    pub async fn beneficial_owners(&self, party_id: Uuid) -> Result<BeneficialOwners> {
        let owners: Vec<Ownership> = self
            .ownerships
            .list_all_for(party_id)
            .await?
            .into_iter()
            .filter(|o| o.is_beneficial_owner(self.threshold))
            .collect();

        let total_percentage = owners.iter().map(|o| o.ownership_percentage).sum();
        debug!(
            "Party {} has {} beneficial owners (threshold {}%)",
            party_id,
            owners.len(),
            self.threshold
        );

        Ok(BeneficialOwners {
            party_id,
            threshold_percent: self.threshold,
            owners,
            total_percentage,
        })
    }
}
