//! Persistence entities and the request DTOs they are built from.
//!
//! Every entity is stored whole; the repository only needs the handful of
//! accessors in [`Entity`] to index it. [`Resource`] adds the request
//! mapping used by the CRUD services.

use crate::errors::Result;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Implements [`Entity`] for a struct with `id`, `created_at`, `updated_at`
/// and a non-optional owner key field. Append `primary` for structs that
/// carry an `is_primary` flag.
macro_rules! impl_entity {
    ($ty:ty, table = $table:literal, kind = $kind:literal, owner = $owner:ident) => {
        impl $crate::models::Entity for $ty {
            const TABLE: &'static str = $table;
            const KIND: &'static str = $kind;

            fn id(&self) -> ::uuid::Uuid {
                self.id
            }

            fn owner_id(&self) -> ::uuid::Uuid {
                self.$owner
            }

            fn created_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.created_at
            }

            fn touch(&mut self, now: ::chrono::DateTime<::chrono::Utc>) {
                self.updated_at = now;
            }
        }
    };
    ($ty:ty, table = $table:literal, kind = $kind:literal, owner = $owner:ident, primary) => {
        impl $crate::models::Entity for $ty {
            const TABLE: &'static str = $table;
            const KIND: &'static str = $kind;

            fn id(&self) -> ::uuid::Uuid {
                self.id
            }

            fn owner_id(&self) -> ::uuid::Uuid {
                self.$owner
            }

            fn created_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.created_at
            }

            fn touch(&mut self, now: ::chrono::DateTime<::chrono::Utc>) {
                self.updated_at = now;
            }

            fn is_primary(&self) -> bool {
                self.is_primary
            }

            fn set_primary(&mut self, primary: bool) {
                self.is_primary = primary;
            }
        }
    };
}

pub mod aml;
pub mod business;
pub mod cases;
pub mod documents;
pub mod reporting;
pub mod risk;
pub mod structure;

pub use aml::{
    AmlMatch, AmlMatchRequest, AmlScreening, AmlScreeningRequest, ListType, MatchDisposition,
    ResolveMatchRequest, ScreeningStatus, ScreeningType,
};
pub use business::{
    Address, BusinessLocation, BusinessLocationRequest, BusinessProfile, BusinessProfileRequest,
    EconomicActivity, EconomicActivityRequest, LocationType,
};
pub use cases::{
    ActionType, CasePriority, CaseStatus, CaseStatusRequest, CaseType, ComplianceAction,
    ComplianceActionRequest, ComplianceCase, ComplianceCaseRequest,
};
pub use documents::{DocumentType, KycDocument, KycDocumentRequest};
pub use reporting::{
    RegulatoryReport, RegulatoryReportRequest, ReportOutcomeRequest, ReportStatus, ReportType,
    SubmitReportRequest,
};
pub use risk::{
    DueDiligenceStatus, EnhancedDueDiligence, EnhancedDueDiligenceRequest, RiskAssessment,
    RiskAssessmentRequest, RiskFactor, RiskLevel,
};
pub use structure::{
    ControlType, CorporateStructure, CorporateStructureRequest, OwnerType, Ownership,
    OwnershipRequest, RelationshipType,
};

/// A record the repository can store and index.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Backing table
    const TABLE: &'static str;
    /// Human readable name used in logs and errors
    const KIND: &'static str;

    fn id(&self) -> Uuid;

    /// The party, screening or case this record is listed under.
    fn owner_id(&self) -> Uuid;

    fn created_at(&self) -> DateTime<Utc>;

    fn touch(&mut self, now: DateTime<Utc>);

    /// At most one record per owner may return `true` here.
    fn is_primary(&self) -> bool {
        false
    }

    fn set_primary(&mut self, _primary: bool) {}
}

/// An entity exposed through the generic CRUD service.
pub trait Resource: Entity {
    type Request: DeserializeOwned + Validate + Send + 'static;

    /// Map an incoming request to a fresh entity.
    fn from_request(id: Uuid, request: Self::Request, now: DateTime<Utc>) -> Self;

    /// Copy server-owned fields from the stored record onto a record rebuilt
    /// from an update request.
    fn carry_over(&mut self, existing: &Self);

    /// Rebuild a stored record from an update request.
    fn from_update(existing: &Self, request: Self::Request, now: DateTime<Utc>) -> Self {
        let mut entity = Self::from_request(existing.id(), request, now);
        entity.carry_over(existing);
        entity
    }

    /// Called on the stored record before it is replaced or deleted.
    fn ensure_mutable(&self) -> Result<()> {
        Ok(())
    }
}

/// Resources whose verification flags are set through a dedicated operation
/// rather than the update payload.
pub trait Verifiable: Resource {
    fn is_verified(&self) -> bool;

    fn mark_verified(&mut self, verifier: &str, now: DateTime<Utc>);

    /// Reason the record cannot be verified as of `today`, if any.
    fn verification_blocker(&self, _today: NaiveDate) -> Option<String> {
        None
    }
}

pub(crate) fn not_nil(id: &Uuid) -> std::result::Result<(), ValidationError> {
    if id.is_nil() {
        return Err(ValidationError::new("nil_uuid"));
    }
    Ok(())
}

pub(crate) fn percentage(value: &Decimal) -> std::result::Result<(), ValidationError> {
    if *value < Decimal::ZERO || *value > Decimal::ONE_HUNDRED {
        return Err(ValidationError::new("percentage_out_of_range"));
    }
    Ok(())
}

pub(crate) fn upper_alpha(code: &str) -> std::result::Result<(), ValidationError> {
    if code.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(ValidationError::new("not_uppercase_code"))
    }
}
