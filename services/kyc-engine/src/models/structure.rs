use super::{not_nil, percentage, upper_alpha, Resource, Verifiable};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipType {
    Parent,
    Subsidiary,
    Affiliate,
    Branch,
    JointVenture,
}

/// Link between a party and another legal entity in its group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorporateStructure {
    pub id: Uuid,
    pub party_id: Uuid,
    pub related_party_id: Uuid,
    pub related_party_name: Option<String>,
    pub relationship_type: RelationshipType,
    pub jurisdiction: Option<String>,
    pub effective_from: Option<NaiveDate>,
    pub effective_to: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_structure"))]
pub struct CorporateStructureRequest {
    #[validate(custom = "not_nil")]
    pub party_id: Uuid,
    #[validate(custom = "not_nil")]
    pub related_party_id: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub related_party_name: Option<String>,
    pub relationship_type: RelationshipType,
    #[validate(length(equal = 2), custom = "upper_alpha")]
    pub jurisdiction: Option<String>,
    pub effective_from: Option<NaiveDate>,
    pub effective_to: Option<NaiveDate>,
}

fn validate_structure(request: &CorporateStructureRequest) -> Result<(), ValidationError> {
    if request.party_id == request.related_party_id {
        return Err(ValidationError::new("self_relationship"));
    }
    if let (Some(from), Some(to)) = (request.effective_from, request.effective_to) {
        if to < from {
            return Err(ValidationError::new("effective_to_before_effective_from"));
        }
    }
    Ok(())
}

impl_entity!(
    CorporateStructure,
    table = "corporate_structures",
    kind = "corporate structure",
    owner = party_id
);

impl Resource for CorporateStructure {
    type Request = CorporateStructureRequest;

    fn from_request(id: Uuid, request: CorporateStructureRequest, now: DateTime<Utc>) -> Self {
        CorporateStructure {
            id,
            party_id: request.party_id,
            related_party_id: request.related_party_id,
            related_party_name: request.related_party_name,
            relationship_type: request.relationship_type,
            jurisdiction: request.jurisdiction,
            effective_from: request.effective_from,
            effective_to: request.effective_to,
            created_at: now,
            updated_at: now,
        }
    }

    fn carry_over(&mut self, existing: &Self) {
        self.created_at = existing.created_at;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OwnerType {
    NaturalPerson,
    LegalEntity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlType {
    #[default]
    Shares,
    VotingRights,
    BoardAppointment,
    Other,
}

/// Ownership interest held in a party (the owned company)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ownership {
    pub id: Uuid,
    pub party_id: Uuid,
    pub owner_party_id: Option<Uuid>,
    pub owner_name: String,
    pub owner_type: OwnerType,
    pub ownership_percentage: Decimal,
    pub control_type: ControlType,
    pub is_ubo: bool,
    pub verified: bool,
    pub verified_by: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_ownership"))]
pub struct OwnershipRequest {
    #[validate(custom = "not_nil")]
    pub party_id: Uuid,
    pub owner_party_id: Option<Uuid>,
    #[validate(length(min = 1, max = 255))]
    pub owner_name: String,
    pub owner_type: OwnerType,
    #[validate(custom = "percentage")]
    pub ownership_percentage: Decimal,
    #[serde(default)]
    pub control_type: ControlType,
    /// Manual UBO designation, e.g. control through other means
    #[serde(default)]
    pub is_ubo: bool,
}

fn validate_ownership(request: &OwnershipRequest) -> Result<(), ValidationError> {
    if request.is_ubo && request.owner_type != OwnerType::NaturalPerson {
        return Err(ValidationError::new("ubo_must_be_natural_person"));
    }
    if request.owner_party_id == Some(request.party_id) {
        return Err(ValidationError::new("self_ownership"));
    }
    Ok(())
}

impl_entity!(Ownership, table = "ownerships", kind = "ownership", owner = party_id);

impl Ownership {
    /// Natural person holding at least `threshold` percent, or designated
    /// as UBO explicitly.
    pub fn is_beneficial_owner(&self, threshold: Decimal) -> bool {
        self.owner_type == OwnerType::NaturalPerson
            && (self.is_ubo || self.ownership_percentage >= threshold)
    }
}

impl Resource for Ownership {
    type Request = OwnershipRequest;

    fn from_request(id: Uuid, request: OwnershipRequest, now: DateTime<Utc>) -> Self {
        Ownership {
            id,
            party_id: request.party_id,
            owner_party_id: request.owner_party_id,
            owner_name: request.owner_name,
            owner_type: request.owner_type,
            ownership_percentage: request.ownership_percentage,
            control_type: request.control_type,
            is_ubo: request.is_ubo,
            verified: false,
            verified_by: None,
            verified_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn carry_over(&mut self, existing: &Self) {
        self.created_at = existing.created_at;
        self.verified = existing.verified;
        self.verified_by = existing.verified_by.clone();
        self.verified_at = existing.verified_at;
    }
}

impl Verifiable for Ownership {
    fn is_verified(&self) -> bool {
        self.verified
    }

    fn mark_verified(&mut self, verifier: &str, now: DateTime<Utc>) {
        self.verified = true;
        self.verified_by = Some(verifier.to_string());
        self.verified_at = Some(now);
    }
}
