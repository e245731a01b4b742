use thiserror::Error;

use super::catalog::ActionKind;
use crate::id::PolityId;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse covert action catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog contains no actions")]
    EmptyCatalog,
    #[error("duplicate covert action '{0}'")]
    DuplicateAction(ActionKind),
    #[error("{action}: {field} = {value} is outside [0, 100]")]
    OutOfRange {
        action: ActionKind,
        field: &'static str,
        value: f64,
    },
}

#[derive(Debug, Error)]
pub enum CovertError {
    #[error("{0} does not resolve to a polity")]
    NotFound(PolityId),
    #[error("unknown covert action '{0}'")]
    UnknownActionKind(String),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("failed to parse covert ops config: {0}")]
    Config(serde_json::Error),
    #[error("failed to write journal: {0}")]
    Io(#[from] std::io::Error),
}
