use chrono::Utc;
use loan_system::application::service::{LoanService, TOPIC_LOAN_INVESTED};
use loan_system::domain::loan::{Approval, Disbursement, Investment, Loan, LoanState};
use loan_system::error::LoanError;
use loan_system::infrastructure::in_memory::InMemoryLoanStore;
use loan_system::infrastructure::publisher::RecordingPublisher;
use rust_decimal_macros::dec;

fn build_service() -> (LoanService, RecordingPublisher) {
    let store = InMemoryLoanStore::new().unwrap();
    let publisher = RecordingPublisher::new();
    let service = LoanService::new(Box::new(store), Box::new(publisher.clone()));
    (service, publisher)
}

fn approval() -> Approval {
    Approval {
        validator_id: 1,
        proof_url: "https://proof.com".to_string(),
        approved_at: Utc::now(),
    }
}

fn disbursement() -> Disbursement {
    Disbursement {
        officer_id: 1,
        agreement_url: "https://signed-agreement.com".to_string(),
        disbursed_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_happy_path_proposed_to_disbursed() {
    let (service, publisher) = build_service();

    let loan = service
        .create_loan(Loan::new(
            42,
            dec!(5000),
            dec!(5),
            dec!(6),
            "https://agreement.com",
        ))
        .await
        .unwrap();
    assert_eq!(loan.state, LoanState::Proposed);

    let loan = service.approve_loan(loan.id, approval()).await.unwrap();
    assert_eq!(loan.state, LoanState::Approved);

    let loan = service
        .add_investment(
            loan.id,
            Investment {
                investor_id: 7,
                amount: dec!(5000),
            },
        )
        .await
        .unwrap();
    assert_eq!(loan.state, LoanState::Invested);

    let events = publisher.events();
    assert_eq!(events.len(), 1, "publish exactly once");
    assert_eq!(events[0].0, TOPIC_LOAN_INVESTED);

    let loan = service.disburse_loan(loan.id, disbursement()).await.unwrap();
    assert_eq!(loan.state, LoanState::Disbursed);
    assert!(loan.disbursement.is_some());
}

#[tokio::test]
async fn test_over_funding_leaves_first_investment_only() {
    let (service, publisher) = build_service();

    let loan = service
        .create_loan(Loan::new(
            42,
            dec!(5000),
            dec!(5),
            dec!(6),
            "https://agreement.com",
        ))
        .await
        .unwrap();
    service.approve_loan(loan.id, approval()).await.unwrap();

    service
        .add_investment(
            loan.id,
            Investment {
                investor_id: 1,
                amount: dec!(2000),
            },
        )
        .await
        .unwrap();

    let err = service
        .add_investment(
            loan.id,
            Investment {
                investor_id: 2,
                amount: dec!(3500),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LoanError::InvestmentFailed { ref source }
            if matches!(**source, LoanError::InvestmentExceedsPrincipal)
    ));

    let stored = service.find_by_id(loan.id).await.unwrap();
    assert_eq!(stored.investments.len(), 1);
    assert_eq!(stored.investments[0].amount, dec!(2000));
    assert_eq!(stored.state, LoanState::Approved);
    assert!(publisher.events().is_empty());
}

#[tokio::test]
async fn test_disburse_fresh_loan_fails() {
    let (service, _) = build_service();

    let loan = service
        .create_loan(Loan::new(
            42,
            dec!(5000),
            dec!(5),
            dec!(6),
            "https://agreement.com",
        ))
        .await
        .unwrap();

    let err = service
        .disburse_loan(loan.id, disbursement())
        .await
        .unwrap_err();
    assert!(matches!(err, LoanError::DisburseFailed { .. }));

    let stored = service.find_by_id(loan.id).await.unwrap();
    assert_eq!(stored.state, LoanState::Proposed);
}

#[tokio::test]
async fn test_incremental_funding_publishes_on_completion_only() {
    let (service, publisher) = build_service();

    let loan = service
        .create_loan(Loan::new(
            42,
            dec!(5000),
            dec!(5),
            dec!(6),
            "https://agreement.com",
        ))
        .await
        .unwrap();
    service.approve_loan(loan.id, approval()).await.unwrap();

    for (investor_id, amount) in [(1, dec!(1000)), (2, dec!(1500)), (3, dec!(2000))] {
        let loan = service
            .add_investment(loan.id, Investment { investor_id, amount })
            .await
            .unwrap();
        assert_eq!(loan.state, LoanState::Approved);
    }
    assert!(publisher.events().is_empty());

    let loan = service
        .add_investment(
            loan.id,
            Investment {
                investor_id: 4,
                amount: dec!(500),
            },
        )
        .await
        .unwrap();
    assert_eq!(loan.state, LoanState::Invested);
    assert_eq!(loan.invested_total(), dec!(5000));
    assert_eq!(publisher.events().len(), 1);
}

#[tokio::test]
async fn test_unknown_id_propagates_not_found() {
    let (service, _) = build_service();

    assert!(matches!(
        service.find_by_id(123).await.unwrap_err(),
        LoanError::NotFound
    ));
    assert!(matches!(
        service
            .add_investment(
                123,
                Investment {
                    investor_id: 1,
                    amount: dec!(1),
                }
            )
            .await
            .unwrap_err(),
        LoanError::NotFound
    ));
}
