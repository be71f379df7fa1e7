//! Shared error types for the engine crate.
//!
//! Hard errors exist only at the session boundary (a malformed bootstrap).
//! Rejected mutations and invalid transitions are not errors; they are
//! reported as data in the per-operation result types so the UI can always
//! recover by re-rendering the current view.

use thiserror::Error;

use assess_core::model::CatalogError;

/// Errors raised while constructing a session from its bootstrap input.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BootstrapError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
