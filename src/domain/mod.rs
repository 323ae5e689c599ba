//! Domain layer: the loan aggregate, its state machine, and the ports the
//! application layer depends on.

pub mod loan;
pub mod ports;
