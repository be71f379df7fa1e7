use thiserror::Error;

use crate::model::CatalogError;
use crate::model::RecordError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Record(#[from] RecordError),
}
