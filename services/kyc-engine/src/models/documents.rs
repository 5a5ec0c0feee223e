use super::{not_nil, upper_alpha, Resource, Verifiable};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    Passport,
    NationalId,
    DrivingLicence,
    ProofOfAddress,
    CertificateOfIncorporation,
    ArticlesOfAssociation,
    ShareholderRegister,
    FinancialStatement,
    Other,
}

/// Supporting document attached to a party. Only metadata is stored here;
/// the file itself lives at `storage_uri`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KycDocument {
    pub id: Uuid,
    pub party_id: Uuid,
    pub document_type: DocumentType,
    pub file_name: String,
    pub storage_uri: String,
    pub content_type: Option<String>,
    pub issuing_country: Option<String>,
    pub issued_on: Option<NaiveDate>,
    pub expires_on: Option<NaiveDate>,
    pub verified: bool,
    pub verified_by: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_validity_period"))]
pub struct KycDocumentRequest {
    #[validate(custom = "not_nil")]
    pub party_id: Uuid,
    pub document_type: DocumentType,
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,
    #[validate(length(min = 1, max = 1024))]
    pub storage_uri: String,
    #[validate(length(max = 100))]
    pub content_type: Option<String>,
    #[validate(length(equal = 2), custom = "upper_alpha")]
    pub issuing_country: Option<String>,
    pub issued_on: Option<NaiveDate>,
    pub expires_on: Option<NaiveDate>,
}

fn validate_validity_period(request: &KycDocumentRequest) -> Result<(), ValidationError> {
    if let (Some(issued), Some(expires)) = (request.issued_on, request.expires_on) {
        if expires <= issued {
            return Err(ValidationError::new("expires_before_issue"));
        }
    }
    Ok(())
}

impl_entity!(KycDocument, table = "kyc_documents", kind = "document", owner = party_id);

impl Resource for KycDocument {
    type Request = KycDocumentRequest;

    fn from_request(id: Uuid, request: KycDocumentRequest, now: DateTime<Utc>) -> Self {
        KycDocument {
            id,
            party_id: request.party_id,
            document_type: request.document_type,
            file_name: request.file_name,
            storage_uri: request.storage_uri,
            content_type: request.content_type,
            issuing_country: request.issuing_country,
            issued_on: request.issued_on,
            expires_on: request.expires_on,
            verified: false,
            verified_by: None,
            verified_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn carry_over(&mut self, existing: &Self) {
        self.created_at = existing.created_at;
        // Replacing the file invalidates the previous verification
        if self.storage_uri == existing.storage_uri {
            self.verified = existing.verified;
            self.verified_by = existing.verified_by.clone();
            self.verified_at = existing.verified_at;
        }
    }
}

impl Verifiable for KycDocument {
    fn is_verified(&self) -> bool {
        self.verified
    }

    fn mark_verified(&mut self, verifier: &str, now: DateTime<Utc>) {
        self.verified = true;
        self.verified_by = Some(verifier.to_string());
        self.verified_at = Some(now);
    }

    fn verification_blocker(&self, today: NaiveDate) -> Option<String> {
        match self.expires_on {
            Some(expires) if expires < today => {
                Some(format!("document {} expired on {}", self.id, expires))
            }
            _ => None,
        }
    }
}
