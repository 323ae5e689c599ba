use thiserror::Error;

pub type Result<T> = std::result::Result<T, LoanError>;

/// Errors produced by the loan core.
///
/// Domain failures carry the exact rejection reason; orchestration wrappers
/// prefix it with the failing operation while keeping the cause reachable
/// through `source()`.
#[derive(Error, Debug)]
pub enum LoanError {
    #[error("loan not found")]
    NotFound,
    #[error("loan already exists")]
    AlreadyExists,
    #[error("{0}")]
    InvalidStateTransition(&'static str),
    #[error("total investments exceed principal")]
    InvestmentExceedsPrincipal,
    #[error("approval failed: {source}")]
    ApprovalFailed {
        #[source]
        source: Box<LoanError>,
    },
    #[error("investment failed: {source}")]
    InvestmentFailed {
        #[source]
        source: Box<LoanError>,
    },
    #[error("disburse failed: {source}")]
    DisburseFailed {
        #[source]
        source: Box<LoanError>,
    },
    #[error("marshal agreement failed: {source}")]
    MarshalAgreementFailed {
        #[source]
        source: serde_json::Error,
    },
    #[error("publish loan invested failed: {source}")]
    PublishFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("snowflake node id {node_id} out of range (0..=1023)")]
    GeneratorConstruction { node_id: i64 },
}
