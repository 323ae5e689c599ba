use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::{BufRead, BufReader, Read};
use thiserror::Error;

/// A single workflow command, one JSON object per input line.
///
/// Loan ids are assigned by the store at save time, so a batch file cannot
/// reference them up front; `loan` is instead the 1-based ordinal of a
/// `create` command earlier in the same file.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LoanCommand {
    Create {
        borrower_id: i64,
        principal: Decimal,
        rate: Decimal,
        roi: Decimal,
        agreement_link: String,
    },
    Approve {
        loan: usize,
        validator_id: i64,
        proof_url: String,
        approved_at: Option<DateTime<Utc>>,
    },
    Invest {
        loan: usize,
        investor_id: i64,
        amount: Decimal,
    },
    Disburse {
        loan: usize,
        officer_id: i64,
        agreement_url: String,
        disbursed_at: Option<DateTime<Utc>>,
    },
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("line {line}: {reason}")]
    Invalid { line: usize, reason: &'static str },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LoanCommand {
    /// Field validation the excluded HTTP transport would normally perform;
    /// a command that fails here never reaches the core.
    fn validate(&self) -> Option<&'static str> {
        match self {
            LoanCommand::Create {
                borrower_id,
                principal,
                rate,
                roi,
                agreement_link,
            } => {
                if *borrower_id == 0 {
                    Some("borrower_id is required")
                } else if *principal <= Decimal::ZERO {
                    Some("principal must be positive")
                } else if *rate <= Decimal::ZERO {
                    Some("rate must be positive")
                } else if *roi <= Decimal::ZERO {
                    Some("roi must be positive")
                } else if agreement_link.is_empty() {
                    Some("agreement_link is required")
                } else {
                    None
                }
            }
            LoanCommand::Approve {
                loan,
                validator_id,
                proof_url,
                ..
            } => {
                if *loan == 0 {
                    Some("loan ordinal must be >= 1")
                } else if *validator_id == 0 {
                    Some("validator_id is required")
                } else if proof_url.is_empty() {
                    Some("proof_url is required")
                } else {
                    None
                }
            }
            LoanCommand::Invest {
                loan,
                investor_id,
                amount,
            } => {
                if *loan == 0 {
                    Some("loan ordinal must be >= 1")
                } else if *investor_id == 0 {
                    Some("investor_id is required")
                } else if *amount <= Decimal::ZERO {
                    Some("amount must be positive")
                } else {
                    None
                }
            }
            LoanCommand::Disburse {
                loan,
                officer_id,
                agreement_url,
                ..
            } => {
                if *loan == 0 {
                    Some("loan ordinal must be >= 1")
                } else if *officer_id == 0 {
                    Some("officer_id is required")
                } else if agreement_url.is_empty() {
                    Some("agreement_url is required")
                } else {
                    None
                }
            }
        }
    }
}

/// Reads loan commands from a JSON-lines source.
///
/// Wraps any `Read` (file, stdin) and yields one validated command per
/// non-blank line, lazily, so large batch files stream.
pub struct CommandReader<R: Read> {
    reader: BufReader<R>,
}

impl<R: Read> CommandReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: BufReader::new(source),
        }
    }

    /// Returns an iterator that lazily reads, parses, and validates commands.
    pub fn commands(self) -> impl Iterator<Item = Result<LoanCommand, CommandError>> {
        self.reader
            .lines()
            .enumerate()
            .filter(|(_, line)| !matches!(line, Ok(l) if l.trim().is_empty()))
            .map(|(idx, line)| {
                let line_no = idx + 1;
                let text = line?;
                let command: LoanCommand = serde_json::from_str(&text)
                    .map_err(|source| CommandError::Parse {
                        line: line_no,
                        source,
                    })?;
                match command.validate() {
                    Some(reason) => Err(CommandError::Invalid {
                        line: line_no,
                        reason,
                    }),
                    None => Ok(command),
                }
            })
    }
}
