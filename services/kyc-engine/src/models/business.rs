use super::{not_nil, upper_alpha, Resource, Verifiable};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Registered details of a legal entity under KYB review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub id: Uuid,
    pub party_id: Uuid,
    pub legal_name: String,
    pub trading_name: Option<String>,
    pub registration_number: String,
    pub legal_form: Option<String>,
    pub incorporation_country: String,
    pub incorporation_date: Option<NaiveDate>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub verified: bool,
    pub verified_by: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BusinessProfileRequest {
    #[validate(custom = "not_nil")]
    pub party_id: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub legal_name: String,
    #[validate(length(max = 255))]
    pub trading_name: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub registration_number: String,
    #[validate(length(max = 100))]
    pub legal_form: Option<String>,
    #[validate(length(equal = 2), custom = "upper_alpha")]
    pub incorporation_country: String,
    pub incorporation_date: Option<NaiveDate>,
    #[validate(url)]
    pub website: Option<String>,
    #[validate(length(max = 100))]
    pub industry: Option<String>,
}

impl_entity!(BusinessProfile, table = "business_profiles", kind = "business profile", owner = party_id);

impl Resource for BusinessProfile {
    type Request = BusinessProfileRequest;

    fn from_request(id: Uuid, request: BusinessProfileRequest, now: DateTime<Utc>) -> Self {
        BusinessProfile {
            id,
            party_id: request.party_id,
            legal_name: request.legal_name,
            trading_name: request.trading_name,
            registration_number: request.registration_number,
            legal_form: request.legal_form,
            incorporation_country: request.incorporation_country,
            incorporation_date: request.incorporation_date,
            website: request.website,
            industry: request.industry,
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

impl Verifiable for BusinessProfile {
    fn is_verified(&self) -> bool {
        self.verified
    }

    fn mark_verified(&mut self, verifier: &str, now: DateTime<Utc>) {
        self.verified = true;
        self.verified_by = Some(verifier.to_string());
        self.verified_at = Some(now);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationType {
    RegisteredOffice,
    HeadOffice,
    Branch,
    Operational,
    Mailing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Address {
    #[validate(length(min = 1, max = 255))]
    pub line1: String,
    #[validate(length(max = 255))]
    pub line2: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(max = 100))]
    pub region: Option<String>,
    #[validate(length(max = 20))]
    pub postal_code: Option<String>,
    #[validate(length(equal = 2), custom = "upper_alpha")]
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessLocation {
    pub id: Uuid,
    pub party_id: Uuid,
    pub location_type: LocationType,
    pub address: Address,
    pub is_primary: bool,
    pub verified: bool,
    pub verified_by: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BusinessLocationRequest {
    #[validate(custom = "not_nil")]
    pub party_id: Uuid,
    pub location_type: LocationType,
    #[validate]
    pub address: Address,
    #[serde(default)]
    pub is_primary: bool,
}

impl_entity!(
    BusinessLocation,
    table = "business_locations",
    kind = "business location",
    owner = party_id,
    primary
);

impl Resource for BusinessLocation {
    type Request = BusinessLocationRequest;

    fn from_request(id: Uuid, request: BusinessLocationRequest, now: DateTime<Utc>) -> Self {
        BusinessLocation {
            id,
            party_id: request.party_id,
            location_type: request.location_type,
            address: request.address,
            is_primary: request.is_primary,
            verified: false,
            verified_by: None,
            verified_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn carry_over(&mut self, existing: &Self) {
        self.created_at = existing.created_at;
        // A changed address has to be verified again
        if self.address == existing.address {
            self.verified = existing.verified;
            self.verified_by = existing.verified_by.clone();
            self.verified_at = existing.verified_at;
        }
    }
}

impl Verifiable for BusinessLocation {
    fn is_verified(&self) -> bool {
        self.verified
    }

    fn mark_verified(&mut self, verifier: &str, now: DateTime<Utc>) {
        self.verified = true;
        self.verified_by = Some(verifier.to_string());
        self.verified_at = Some(now);
    }
}

/// Business activity classified under NACE, NAICS, ISIC or similar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomicActivity {
    pub id: Uuid,
    pub party_id: Uuid,
    pub activity_code: String,
    pub classification_system: String,
    pub description: Option<String>,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EconomicActivityRequest {
    #[validate(custom = "not_nil")]
    pub party_id: Uuid,
    #[validate(length(min = 1, max = 20))]
    pub activity_code: String,
    #[validate(length(min = 1, max = 20))]
    pub classification_system: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

impl_entity!(
    EconomicActivity,
    table = "economic_activities",
    kind = "economic activity",
    owner = party_id,
    primary
);

impl Resource for EconomicActivity {
    type Request = EconomicActivityRequest;

    fn from_request(id: Uuid, request: EconomicActivityRequest, now: DateTime<Utc>) -> Self {
        EconomicActivity {
            id,
            party_id: request.party_id,
            activity_code: request.activity_code,
            classification_system: request.classification_system,
            description: request.description,
            is_primary: request.is_primary,
            created_at: now,
            updated_at: now,
        }
    }

    fn carry_over(&mut self, existing: &Self) {
        self.created_at = existing.created_at;
    }
}
