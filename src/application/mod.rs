//! Application layer: the `LoanService` use-case orchestration over the
//! domain ports.

pub mod service;
