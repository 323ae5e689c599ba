use super::snowflake::SnowflakeGenerator;
use crate::domain::loan::Loan;
use crate::domain::ports::LoanStore;
use crate::error::{LoanError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory loan store.
///
/// Uses `Arc<RwLock<HashMap<i64, Loan>>>` so clones share the same map; the
/// lock is held for a single map read or write only. The store owns the
/// identifier generator and assigns ids at `save` time, so this is the
/// process's sole source of truth for loans.
#[derive(Clone)]
pub struct InMemoryLoanStore {
    generator: Arc<SnowflakeGenerator>,
    loans: Arc<RwLock<HashMap<i64, Loan>>>,
}

impl InMemoryLoanStore {
    /// Creates a store with generator node id 1.
    pub fn new() -> Result<Self> {
        Self::with_node(1)
    }

    /// Creates a store with an explicit generator node id. Fails fatally if
    /// the node id is out of range.
    pub fn with_node(node_id: i64) -> Result<Self> {
        Ok(Self {
            generator: Arc::new(SnowflakeGenerator::new(node_id)?),
            loans: Arc::new(RwLock::new(HashMap::new())),
        })
    }
}

#[async_trait]
impl LoanStore for InMemoryLoanStore {
    async fn save(&self, mut loan: Loan) -> Result<Loan> {
        let mut loans = self.loans.write().await;

        if loan.id == 0 {
            loan.id = self.generator.next_id();
        }
        if loans.contains_key(&loan.id) {
            return Err(LoanError::AlreadyExists);
        }

        loans.insert(loan.id, loan.clone());
        Ok(loan)
    }

    async fn find_by_id(&self, id: i64) -> Result<Loan> {
        let loans = self.loans.read().await;
        loans.get(&id).cloned().ok_or(LoanError::NotFound)
    }

    async fn find_all(&self) -> Result<Vec<Loan>> {
        let loans = self.loans.read().await;
        Ok(loans.values().cloned().collect())
    }

    async fn update(&self, loan: Loan) -> Result<Loan> {
        let mut loans = self.loans.write().await;

        if !loans.contains_key(&loan.id) {
            return Err(LoanError::NotFound);
        }

        loans.insert(loan.id, loan.clone());
        Ok(loan)
    }
}
