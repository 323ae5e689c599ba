use crate::error::{LoanError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a loan.
///
/// Transitions are strictly linear and forward-only:
/// `Proposed -> Approved -> Invested -> Disbursed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanState {
    Proposed,
    Approved,
    Invested,
    Disbursed,
}

impl LoanState {
    fn order(self) -> i8 {
        match self {
            LoanState::Proposed => 1,
            LoanState::Approved => 2,
            LoanState::Invested => 3,
            LoanState::Disbursed => 4,
        }
    }
}

/// Record of the staff validation that moved a loan to `Approved`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Approval {
    pub validator_id: i64,
    pub proof_url: String,
    pub approved_at: DateTime<Utc>,
}

/// A single investor's contribution toward a loan's principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    pub investor_id: i64,
    pub amount: Decimal,
}

/// Record of the capital release that moved a loan to `Disbursed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disbursement {
    pub officer_id: i64,
    pub agreement_url: String,
    pub disbursed_at: DateTime<Utc>,
}

/// Payload published on the `loan_invested` topic once a loan is fully funded.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanAgreement {
    pub loan_id: i64,
}

/// The loan aggregate root.
///
/// `id` is 0 until the store assigns one at save time; the generator never
/// issues 0. All other creation fields are immutable after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    #[serde(default)]
    pub id: i64,
    pub borrower_id: i64,
    pub principal: Decimal,
    pub rate: Decimal,
    pub roi: Decimal,
    pub agreement_link: String,
    pub state: LoanState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval: Option<Approval>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub investments: Vec<Investment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disbursement: Option<Disbursement>,
}

impl Loan {
    pub fn new(
        borrower_id: i64,
        principal: Decimal,
        rate: Decimal,
        roi: Decimal,
        agreement_link: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            borrower_id,
            principal,
            rate,
            roi,
            agreement_link: agreement_link.into(),
            state: LoanState::Proposed,
            approval: None,
            investments: Vec::new(),
            disbursement: None,
        }
    }

    /// True iff `target` is exactly one step ahead of the current state.
    /// Rejects self-transitions, skips, and anything behind the current state.
    pub fn can_transition_to(&self, target: LoanState) -> bool {
        target.order() - self.state.order() == 1
    }

    /// Sum of all recorded investment amounts.
    pub fn invested_total(&self) -> Decimal {
        self.investments.iter().map(|inv| inv.amount).sum()
    }

    /// Moves the loan from `Proposed` to `Approved`, recording the approval.
    pub fn approve(&mut self, approval: Approval) -> Result<()> {
        if !self.can_transition_to(LoanState::Approved) {
            return Err(LoanError::InvalidStateTransition(
                "can only approve when loan is proposed",
            ));
        }
        self.state = LoanState::Approved;
        self.approval = Some(approval);
        Ok(())
    }

    /// Appends an investment to an `Approved` loan.
    ///
    /// The new total must not exceed `principal`; over-funding is rejected
    /// wholesale, not clipped. Reaching `principal` exactly transitions the
    /// loan to `Invested`. No field changes on any failure path.
    pub fn add_investment(&mut self, investment: Investment) -> Result<()> {
        let total = self.invested_total() + investment.amount;
        if total > self.principal {
            return Err(LoanError::InvestmentExceedsPrincipal);
        }
        if !self.can_transition_to(LoanState::Invested) {
            return Err(LoanError::InvalidStateTransition(
                "can only invest when loan is approved",
            ));
        }
        self.investments.push(investment);
        // Exact equality: Decimal comparison carries no epsilon, matching the
        // funding-completion rule.
        if total == self.principal {
            self.state = LoanState::Invested;
        }
        Ok(())
    }

    /// Moves the loan from `Invested` to `Disbursed`, recording the release.
    pub fn disburse(&mut self, disbursement: Disbursement) -> Result<()> {
        if !self.can_transition_to(LoanState::Disbursed) {
            return Err(LoanError::InvalidStateTransition(
                "can only disburse when loan is invested",
            ));
        }
        self.state = LoanState::Disbursed;
        self.disbursement = Some(disbursement);
        Ok(())
    }
}
