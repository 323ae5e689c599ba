use chrono::Utc;
use clap::Parser;
use loan_system::application::service::LoanService;
use loan_system::domain::loan::{Approval, Disbursement, Investment, Loan};
use loan_system::infrastructure::in_memory::InMemoryLoanStore;
use loan_system::infrastructure::publisher::StdoutPublisher;
use loan_system::interfaces::command_reader::{CommandReader, LoanCommand};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input command file, one JSON command per line
    input: PathBuf,

    /// Snowflake node id for the identifier generator (0..=1023)
    #[arg(long, default_value_t = 1)]
    node_id: i64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let store = InMemoryLoanStore::with_node(cli.node_id).into_diagnostic()?;
    let service = LoanService::new(Box::new(store.clone()), Box::new(StdoutPublisher::new()));

    let file = File::open(cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);

    // Ids are assigned at save time; commands address loans by the ordinal
    // of the create that produced them.
    let mut created: Vec<i64> = Vec::new();
    for command in reader.commands() {
        match command {
            Ok(command) => {
                if let Err(e) = run_command(&service, &mut created, command).await {
                    eprintln!("Error processing command: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading command: {}", e);
            }
        }
    }

    let loans = service.find_all().await.into_diagnostic()?;
    let stdout = io::stdout();
    serde_json::to_writer_pretty(stdout.lock(), &loans).into_diagnostic()?;
    println!();

    Ok(())
}

async fn run_command(
    service: &LoanService,
    created: &mut Vec<i64>,
    command: LoanCommand,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    match command {
        LoanCommand::Create {
            borrower_id,
            principal,
            rate,
            roi,
            agreement_link,
        } => {
            let loan = service
                .create_loan(Loan::new(borrower_id, principal, rate, roi, agreement_link))
                .await?;
            created.push(loan.id);
        }
        LoanCommand::Approve {
            loan,
            validator_id,
            proof_url,
            approved_at,
        } => {
            let id = resolve(created, loan)?;
            service
                .approve_loan(
                    id,
                    Approval {
                        validator_id,
                        proof_url,
                        approved_at: approved_at.unwrap_or_else(Utc::now),
                    },
                )
                .await?;
        }
        LoanCommand::Invest {
            loan,
            investor_id,
            amount,
        } => {
            let id = resolve(created, loan)?;
            service
                .add_investment(
                    id,
                    Investment {
                        investor_id,
                        amount,
                    },
                )
                .await?;
        }
        LoanCommand::Disburse {
            loan,
            officer_id,
            agreement_url,
            disbursed_at,
        } => {
            let id = resolve(created, loan)?;
            service
                .disburse_loan(
                    id,
                    Disbursement {
                        officer_id,
                        agreement_url,
                        disbursed_at: disbursed_at.unwrap_or_else(Utc::now),
                    },
                )
                .await?;
        }
    }
    Ok(())
}

fn resolve(
    created: &[i64],
    ordinal: usize,
) -> std::result::Result<i64, Box<dyn std::error::Error>> {
    created
        .get(ordinal - 1)
        .copied()
        .ok_or_else(|| format!("no loan created at ordinal {}", ordinal).into())
}
