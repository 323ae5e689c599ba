use super::loan::Loan;
use crate::error::Result;
use async_trait::async_trait;

pub type LoanStoreBox = Box<dyn LoanStore>;
pub type EventPublisherBox = Box<dyn EventPublisher>;

/// Keyed storage for loans, safe for concurrent use.
///
/// The lock discipline is per single read or write; callers that do
/// `find_by_id` -> mutate -> `update` get last-write-wins semantics under
/// contention, not atomicity.
#[async_trait]
pub trait LoanStore: Send + Sync {
    /// Inserts a new loan, assigning a fresh id when `loan.id` is 0.
    /// Fails with `AlreadyExists` if the id is already taken.
    async fn save(&self, loan: Loan) -> Result<Loan>;
    /// Fails with `NotFound` for unknown ids.
    async fn find_by_id(&self, id: i64) -> Result<Loan>;
    /// Unordered snapshot of all stored loans.
    async fn find_all(&self) -> Result<Vec<Loan>>;
    /// Replaces the stored value entirely. Fails with `NotFound` if the id
    /// has never been saved.
    async fn update(&self, loan: Loan) -> Result<Loan>;
}

/// Fire-and-forget notification sink.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
