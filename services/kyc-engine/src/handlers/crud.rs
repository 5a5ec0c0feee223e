//! Handlers shared by every resource collection, generic over the entity.

use crate::errors::KycEngineError;
use crate::models::{Resource, Verifiable};
use crate::services::CrudService;
use actix_web::{web, HttpResponse, Scope};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub owner_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub count: usize,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub verified_by: String,
}

pub async fn create<E: Resource>(
    service: web::Data<Arc<CrudService<E>>>,
    request: web::Json<E::Request>,
) -> Result<HttpResponse, KycEngineError> {
    let entity = service.create(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(entity))
}

pub async fn list<E: Resource>(
    service: web::Data<Arc<CrudService<E>>>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, KycEngineError> {
    let page = service.limits().page(query.limit, query.offset);
    let items = service.list(query.owner_id, page).await?;

    Ok(HttpResponse::Ok().json(PageResponse {
        count: items.len(),
        items,
        limit: page.limit,
        offset: page.offset,
    }))
}

pub async fn get<E: Resource>(
    service: web::Data<Arc<CrudService<E>>>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, KycEngineError> {
    let entity = service.get(*id).await?;
    Ok(HttpResponse::Ok().json(entity))
}

pub async fn update<E: Resource>(
    service: web::Data<Arc<CrudService<E>>>,
    id: web::Path<Uuid>,
    request: web::Json<E::Request>,
) -> Result<HttpResponse, KycEngineError> {
    let entity = service.update(*id, request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(entity))
}

pub async fn delete<E: Resource>(
    service: web::Data<Arc<CrudService<E>>>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, KycEngineError> {
    service.delete(*id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Current primary record of a party
pub async fn primary<E: Resource>(
    service: web::Data<Arc<CrudService<E>>>,
    party_id: web::Path<Uuid>,
) -> Result<HttpResponse, KycEngineError> {
    let entity = service.primary(*party_id).await?;
    Ok(HttpResponse::Ok().json(entity))
}

pub async fn verify<E: Verifiable>(
    service: web::Data<Arc<CrudService<E>>>,
    id: web::Path<Uuid>,
    request: web::Json<VerifyRequest>,
) -> Result<HttpResponse, KycEngineError> {
    let entity = service.verify(*id, &request.verified_by).await?;
    Ok(HttpResponse::Ok().json(entity))
}

/// List, read and update routes. Records that hang off a parent are
/// created and deleted through their parent's workflow.
pub fn child_collection<E: Resource>(path: &str) -> Scope {
    web::scope(path)
        .route("", web::get().to(list::<E>))
        .route("/{id}", web::get().to(get::<E>))
        .route("/{id}", web::put().to(update::<E>))
}

/// Create, list, read and update routes. Delete is left to the caller so
/// collections with children can cascade.
pub fn collection<E: Resource>(path: &str) -> Scope {
    child_collection::<E>(path).route("", web::post().to(create::<E>))
}

/// Full CRUD scope for a collection without dependants.
pub fn resource_scope<E: Resource>(path: &str) -> Scope {
    collection::<E>(path).route("/{id}", web::delete().to(delete::<E>))
}
