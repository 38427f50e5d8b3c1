use thiserror::Error;

use stocktally_auth::AuthzError;
use stocktally_core::DomainError;

use crate::store::StoreError;

/// Error returned by the application services.
///
/// Keeps the layer an error came from so callers can map each kind on its own
/// (validation vs. permission vs. storage).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Authz(#[from] AuthzError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
