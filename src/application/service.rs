use crate::domain::loan::{Approval, Disbursement, Investment, Loan, LoanAgreement, LoanState};
use crate::domain::ports::{EventPublisherBox, LoanStoreBox};
use crate::error::{LoanError, Result};

/// Topic the agreement notification is published on when a loan becomes
/// fully funded.
pub const TOPIC_LOAN_INVESTED: &str = "loan_invested";

/// Orchestrates the loan use cases: each method is a short
/// load -> mutate -> persist (-> notify) sequence against the injected ports.
///
/// The sequence is deliberately not atomic as a whole; the store's lock only
/// covers individual reads and writes, so two concurrent calls against the
/// same loan id resolve as last-write-wins.
pub struct LoanService {
    store: LoanStoreBox,
    publisher: EventPublisherBox,
}

impl LoanService {
    pub fn new(store: LoanStoreBox, publisher: EventPublisherBox) -> Self {
        Self { store, publisher }
    }

    /// Persists a new loan in state `Proposed`; the store assigns the id.
    /// Store errors (`AlreadyExists`) are returned unchanged.
    pub async fn create_loan(&self, mut loan: Loan) -> Result<Loan> {
        loan.state = LoanState::Proposed;
        self.store.save(loan).await
    }

    pub async fn approve_loan(&self, loan_id: i64, approval: Approval) -> Result<Loan> {
        let mut loan = self.store.find_by_id(loan_id).await?;

        loan.approve(approval).map_err(|e| LoanError::ApprovalFailed {
            source: Box::new(e),
        })?;

        self.store.update(loan).await
    }

    /// Adds an investment; when the investment completes the funding, the
    /// agreement notification is published before the loan is persisted, so
    /// the funded state is never stored without a notification attempt.
    pub async fn add_investment(&self, loan_id: i64, investment: Investment) -> Result<Loan> {
        let mut loan = self.store.find_by_id(loan_id).await?;

        loan.add_investment(investment)
            .map_err(|e| LoanError::InvestmentFailed {
                source: Box::new(e),
            })?;

        if loan.state == LoanState::Invested {
            let agreement = LoanAgreement { loan_id: loan.id };
            let payload = serde_json::to_vec(&agreement)
                .map_err(|e| LoanError::MarshalAgreementFailed { source: e })?;

            self.publisher
                .publish(TOPIC_LOAN_INVESTED, payload)
                .await
                .map_err(|e| LoanError::PublishFailed { source: e })?;
        }

        self.store.update(loan).await
    }

    pub async fn disburse_loan(&self, loan_id: i64, disbursement: Disbursement) -> Result<Loan> {
        let mut loan = self.store.find_by_id(loan_id).await?;

        loan.disburse(disbursement)
            .map_err(|e| LoanError::DisburseFailed {
                source: Box::new(e),
            })?;

        self.store.update(loan).await
    }

    pub async fn find_by_id(&self, loan_id: i64) -> Result<Loan> {
        self.store.find_by_id(loan_id).await
    }

    pub async fn find_all(&self) -> Result<Vec<Loan>> {
        self.store.find_all().await
    }
}
