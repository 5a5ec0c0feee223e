use super::is_probe_path;
use crate::errors::KycEngineError;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use std::rc::Rc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub role: String,
    pub exp: usize,
}

/// Bearer-token check for every API route. Decoded [`Claims`] are placed in
/// the request extensions.
pub struct JwtAuth {
    secret: Rc<String>,
}

impl JwtAuth {
    pub fn new(secret: String) -> Self {
        Self {
            secret: Rc::new(secret),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            secret: Rc::clone(&self.secret),
        }))
    }
}

pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    secret: Rc<String>,
}

impl<S> JwtAuthMiddleware<S> {
    fn claims(&self, req: &ServiceRequest) -> Result<Claims, KycEngineError> {
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(KycEngineError::Unauthorized)?;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|err| {
            tracing::warn!("JWT validation failed: {:?}", err);
            KycEngineError::Unauthorized
        })
    }
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if is_probe_path(req.path()) {
            let fut = self.service.call(req);
            return Box::pin(async move { fut.await });
        }

        match self.claims(&req) {
            Ok(claims) => {
                tracing::debug!("Authenticated {} ({})", claims.sub, claims.role);
                req.extensions_mut().insert(claims);

                let fut = self.service.call(req);
                Box::pin(async move { fut.await })
            }
            Err(err) => Box::pin(async move { Err(Error::from(err)) }),
        }
    }
}
