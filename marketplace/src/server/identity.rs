//! Caller identity extraction.
//!
//! Identity issuance is owned by an external provider that fronts this
//! service; by the time a request arrives, the `x-caller-id` and
//! `x-caller-role` headers carry an opaque caller id and a role. The core
//! trusts these values as given.

use super::error::AppError;
use crate::types::{CookId, GuestId, HostId, Role};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

/// Header carrying the opaque caller id
const CALLER_ID_HEADER: &str = "x-caller-id";
/// Header carrying the caller role
const CALLER_ROLE_HEADER: &str = "x-caller-role";

/// The authenticated caller of the current request
#[derive(Clone, Copy, Debug)]
pub struct Caller {
    /// Opaque identity supplied by the identity provider
    pub id: Uuid,
    /// Caller role
    pub role: Role,
}

impl Caller {
    /// The caller as a guest
    ///
    /// # Errors
    ///
    /// Rejects callers whose role is not `guest`.
    pub fn as_guest(&self) -> Result<GuestId, AppError> {
        match self.role {
            Role::Guest => Ok(GuestId::from_uuid(self.id)),
            _ => Err(AppError::forbidden("this action requires the guest role")),
        }
    }

    /// The caller as a host
    ///
    /// # Errors
    ///
    /// Rejects callers whose role is not `host`.
    pub fn as_host(&self) -> Result<HostId, AppError> {
        match self.role {
            Role::Host => Ok(HostId::from_uuid(self.id)),
            _ => Err(AppError::forbidden("this action requires the host role")),
        }
    }

    /// The caller as a cook
    ///
    /// # Errors
    ///
    /// Rejects callers whose role is not `cook`.
    pub fn as_cook(&self) -> Result<CookId, AppError> {
        match self.role {
            Role::Cook => Ok(CookId::from_uuid(self.id)),
            _ => Err(AppError::forbidden("this action requires the cook role")),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header_value(parts, CALLER_ID_HEADER)?
            .parse::<Uuid>()
            .map_err(|_| AppError::unauthorized("x-caller-id is not a valid id"))?;

        let role = match header_value(parts, CALLER_ROLE_HEADER)? {
            "guest" => Role::Guest,
            "host" => Role::Host,
            "cook" => Role::Cook,
            other => {
                return Err(AppError::unauthorized(format!(
                    "unknown caller role '{other}'"
                )));
            },
        };

        Ok(Self { id, role })
    }
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, AppError> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::unauthorized(format!("missing {name} header")))
}
