//! End-to-end distribution runs against the in-memory ledger.
use solana_sdk::pubkey::Pubkey;
use soldrop::{
    config::DistributionConfig,
    domain::{progress_channel, CancellationFlag, DistributionEngine, ProgressSender},
    models::{
        BatchState, DistributionError, DistributionPhase, FailureReason, RecipientInput,
        RecipientStatus, RejectionReason, SolanaNetwork, TokenProgram,
    },
};
use std::sync::Arc;

use crate::integration::common::{recipients_csv, InMemoryLedger, LedgerBroadcaster};

const FUNDER_BALANCE: u64 = 1_000_000_000_000;

struct Setup {
    ledger: Arc<InMemoryLedger>,
    funder: Pubkey,
    mint: Pubkey,
}

fn setup(decimals: u8, program: TokenProgram) -> Setup {
    let ledger = Arc::new(InMemoryLedger::new());
    let funder = Pubkey::new_unique();
    let mint = ledger.add_mint(decimals, program);
    ledger.open_holding_account(&funder, &mint, program, FUNDER_BALANCE);
    Setup {
        ledger,
        funder,
        mint,
    }
}

fn engine(
    setup: &Setup,
    broadcaster: LedgerBroadcaster,
    config: DistributionConfig,
) -> DistributionEngine<InMemoryLedger, LedgerBroadcaster> {
    DistributionEngine::new(
        setup.ledger.clone(),
        Arc::new(broadcaster),
        setup.funder,
        config,
    )
    .unwrap()
}

fn text(data: String) -> RecipientInput {
    RecipientInput::Text {
        data,
        has_header: true,
    }
}

#[tokio::test]
async fn test_every_recipient_receives_its_amount() {
    let setup = setup(6, TokenProgram::SplToken);
    let (owners, data) = recipients_csv(23, "2.5");
    let engine = engine(
        &setup,
        LedgerBroadcaster::new(setup.ledger.clone()),
        DistributionConfig::default(),
    );

    let report = engine
        .run_distribution(
            &setup.mint.to_string(),
            text(data),
            ProgressSender::disabled(),
            &CancellationFlag::new(),
        )
        .await
        .unwrap();

    assert!(report.is_complete_success());
    assert_eq!(report.batches.len(), 3);
    for owner in &owners {
        assert_eq!(
            setup
                .ledger
                .balance_of(owner, &setup.mint, TokenProgram::SplToken),
            2_500_000
        );
    }
    assert_eq!(
        setup
            .ledger
            .balance_of(&setup.funder, &setup.mint, TokenProgram::SplToken),
        FUNDER_BALANCE - 23 * 2_500_000
    );
}

#[tokio::test]
async fn test_token_2022_mint_distribution() {
    let setup = setup(9, TokenProgram::Token2022);
    let (owners, data) = recipients_csv(4, "1");
    let engine = engine(
        &setup,
        LedgerBroadcaster::new(setup.ledger.clone()),
        DistributionConfig::default(),
    );

    let report = engine
        .run_distribution(
            &setup.mint.to_string(),
            text(data),
            ProgressSender::disabled(),
            &CancellationFlag::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.asset.token_program, TokenProgram::Token2022);
    assert!(report.is_complete_success());
    assert_eq!(
        setup
            .ledger
            .balance_of(&owners[0], &setup.mint, TokenProgram::Token2022),
        1_000_000_000
    );
}

#[tokio::test]
async fn test_existing_holding_accounts_are_not_recreated() {
    let setup = setup(2, TokenProgram::SplToken);
    let (owners, data) = recipients_csv(3, "1");
    setup
        .ledger
        .open_holding_account(&owners[1], &setup.mint, TokenProgram::SplToken, 50);
    let engine = engine(
        &setup,
        LedgerBroadcaster::new(setup.ledger.clone()),
        DistributionConfig::default(),
    );

    let plan = engine
        .plan(&setup.mint.to_string(), text(data))
        .await
        .unwrap();
    assert_eq!(plan.creation_count(), 2);
    assert_eq!(setup.ledger.existence_query_count(), 3);
}

#[tokio::test]
async fn test_duplicate_recipients_share_one_existence_query() {
    let setup = setup(2, TokenProgram::SplToken);
    let owner = Pubkey::new_unique();
    let data = format!("address,amount\n{owner},1\n{owner},2\n");
    let engine = engine(
        &setup,
        LedgerBroadcaster::new(setup.ledger.clone()),
        DistributionConfig::default(),
    );

    let report = engine
        .run_distribution(
            &setup.mint.to_string(),
            text(data),
            ProgressSender::disabled(),
            &CancellationFlag::new(),
        )
        .await
        .unwrap();

    assert_eq!(setup.ledger.existence_query_count(), 1);
    assert_eq!(report.outcomes.len(), 2);
    assert!(report.is_complete_success());
    assert_eq!(
        setup
            .ledger
            .balance_of(&owner, &setup.mint, TokenProgram::SplToken),
        300
    );
}

#[tokio::test]
async fn test_failed_existence_query_still_creates_account() {
    let setup = setup(0, TokenProgram::SplToken);
    let (owners, data) = recipients_csv(2, "5");
    let holding = soldrop::domain::SolanaTokenProgram::get_associated_token_address(
        TokenProgram::SplToken,
        &owners[0],
        &setup.mint,
    );
    setup.ledger.fail_queries_for(holding);
    let engine = engine(
        &setup,
        LedgerBroadcaster::new(setup.ledger.clone()),
        DistributionConfig::default(),
    );

    let report = engine
        .run_distribution(
            &setup.mint.to_string(),
            text(data),
            ProgressSender::disabled(),
            &CancellationFlag::new(),
        )
        .await
        .unwrap();

    assert!(report.is_complete_success());
    assert!(setup.ledger.has_account(&holding));
    assert_eq!(
        setup
            .ledger
            .balance_of(&owners[0], &setup.mint, TokenProgram::SplToken),
        5
    );
}

#[tokio::test]
async fn test_rejected_rows_are_reported_with_line_numbers() {
    let setup = setup(2, TokenProgram::SplToken);
    let good = Pubkey::new_unique();
    let data = format!("address,amount\n{good},10\n,5\nnot-an-address,1\n{good},0.001\n");
    let engine = engine(
        &setup,
        LedgerBroadcaster::new(setup.ledger.clone()),
        DistributionConfig::default(),
    );

    let report = engine
        .run_distribution(
            &setup.mint.to_string(),
            text(data),
            ProgressSender::disabled(),
            &CancellationFlag::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.outcomes.len(), 1);
    let lines: Vec<_> = report.rejected_rows.iter().map(|r| r.line).collect();
    assert_eq!(lines, vec![3, 4, 5]);
    assert_eq!(report.rejected_rows[0].reason, RejectionReason::EmptyAddress);
    assert!(matches!(
        report.rejected_rows[1].reason,
        RejectionReason::InvalidAddress(_)
    ));
    assert!(matches!(
        report.rejected_rows[2].reason,
        RejectionReason::InvalidAmount(_)
    ));
}

#[tokio::test]
async fn test_signer_rejection_is_scoped_to_its_batch() {
    let setup = setup(6, TokenProgram::SplToken);
    let (owners, data) = recipients_csv(25, "1");
    let broadcaster = LedgerBroadcaster::new(setup.ledger.clone()).reject_batch(1);
    let engine = engine(&setup, broadcaster, DistributionConfig::default());

    let report = engine
        .run_distribution(
            &setup.mint.to_string(),
            text(data),
            ProgressSender::disabled(),
            &CancellationFlag::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.batches[0].state, BatchState::Confirmed);
    assert!(matches!(
        report.batches[1].state,
        BatchState::Failed(FailureReason::SignerRejected(_))
    ));
    assert_eq!(report.batches[2].state, BatchState::Confirmed);
    assert_eq!(report.failed(), 10);
    assert_eq!(
        setup
            .ledger
            .balance_of(&owners[10], &setup.mint, TokenProgram::SplToken),
        0
    );
    assert_eq!(report.failed_recipients()[0].address, owners[10]);
}

#[tokio::test(start_paused = true)]
async fn test_stalled_confirmation_times_out_without_blocking_others() {
    let setup = setup(6, TokenProgram::SplToken);
    let (_, data) = recipients_csv(30, "1");
    let broadcaster = LedgerBroadcaster::new(setup.ledger.clone()).stall_batch(0);
    let engine = engine(&setup, broadcaster, DistributionConfig::default());

    let report = engine
        .run_distribution(
            &setup.mint.to_string(),
            text(data),
            ProgressSender::disabled(),
            &CancellationFlag::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.batches[0].state, BatchState::TimedOut);
    assert_eq!(report.batches[1].state, BatchState::Confirmed);
    assert_eq!(report.batches[2].state, BatchState::Confirmed);
    assert!(report.outcomes[..10]
        .iter()
        .all(|o| o.status == RecipientStatus::Failed(FailureReason::Timeout)));
    assert_eq!(report.succeeded(), 20);
}

#[tokio::test]
async fn test_cancellation_stops_further_submissions() {
    let setup = setup(6, TokenProgram::SplToken);
    let (_, data) = recipients_csv(30, "1");
    let cancel = CancellationFlag::new();
    let broadcaster = Arc::new(
        LedgerBroadcaster::new(setup.ledger.clone()).cancel_after(0, cancel.clone()),
    );
    let engine = DistributionEngine::new(
        setup.ledger.clone(),
        broadcaster.clone(),
        setup.funder,
        DistributionConfig::default(),
    )
    .unwrap();

    let report = engine
        .run_distribution(
            &setup.mint.to_string(),
            text(data),
            ProgressSender::disabled(),
            &cancel,
        )
        .await
        .unwrap();

    assert_eq!(broadcaster.submitted(), vec![0]);
    assert_eq!(report.batches[0].state, BatchState::Confirmed);
    assert_eq!(report.batches[1].state, BatchState::NotSubmitted);
    assert_eq!(report.batches[2].state, BatchState::NotSubmitted);
    assert_eq!(report.succeeded(), 10);
    assert!(report.outcomes[10..]
        .iter()
        .all(|o| o.status == RecipientStatus::NotSubmitted));
}

#[tokio::test]
async fn test_mainnet_fee_is_charged_once() {
    let setup = setup(6, TokenProgram::SplToken);
    let (_, data) = recipients_csv(15, "1");
    let mut config = DistributionConfig {
        network: SolanaNetwork::MainnetBeta,
        ..Default::default()
    };
    config.fee.recipient = Some(Pubkey::new_unique().to_string());
    let engine = engine(&setup, LedgerBroadcaster::new(setup.ledger.clone()), config);

    let plan = engine
        .plan(&setup.mint.to_string(), text(data))
        .await
        .unwrap();

    let fee_batches: Vec<_> = plan.batches.iter().filter(|b| b.has_fee()).collect();
    assert_eq!(fee_batches.len(), 1);
    assert_eq!(fee_batches[0].index, 0);
    assert_eq!(plan.fee_lamports(), Some(100_000_000));
    assert_eq!(plan.recipient_count(), 15);
}

#[tokio::test]
async fn test_mainnet_without_fee_recipient_submits_nothing() {
    let setup = setup(6, TokenProgram::SplToken);
    let (_, data) = recipients_csv(3, "1");
    let broadcaster = Arc::new(LedgerBroadcaster::new(setup.ledger.clone()));
    let config = DistributionConfig {
        network: SolanaNetwork::MainnetBeta,
        ..Default::default()
    };
    let engine =
        DistributionEngine::new(setup.ledger.clone(), broadcaster.clone(), setup.funder, config)
            .unwrap();

    let result = engine
        .run_distribution(
            &setup.mint.to_string(),
            text(data),
            ProgressSender::disabled(),
            &CancellationFlag::new(),
        )
        .await;

    assert!(matches!(result, Err(DistributionError::FeeRecipientUnconfigured)));
    assert!(broadcaster.submitted().is_empty());
}

#[tokio::test]
async fn test_unknown_mint_is_reported() {
    let setup = setup(6, TokenProgram::SplToken);
    let (_, data) = recipients_csv(1, "1");
    let engine = engine(
        &setup,
        LedgerBroadcaster::new(setup.ledger.clone()),
        DistributionConfig::default(),
    );

    let missing = engine
        .plan(&Pubkey::new_unique().to_string(), text(data.clone()))
        .await;
    assert!(matches!(missing, Err(DistributionError::AssetNotFound(_))));

    let invalid = engine.plan("not-a-mint", text(data)).await;
    assert!(matches!(invalid, Err(DistributionError::InvalidIdentifier(_))));
}

#[tokio::test]
async fn test_progress_stream_walks_through_phases() {
    let setup = setup(6, TokenProgram::SplToken);
    let (_, data) = recipients_csv(12, "1");
    let engine = engine(
        &setup,
        LedgerBroadcaster::new(setup.ledger.clone()),
        DistributionConfig::default(),
    );
    let (progress, stream) = progress_channel();

    engine
        .run_distribution(
            &setup.mint.to_string(),
            text(data),
            progress,
            &CancellationFlag::new(),
        )
        .await
        .unwrap();

    use futures::StreamExt;
    let updates: Vec<_> = stream.collect().await;
    let mut phases: Vec<DistributionPhase> = updates.iter().map(|u| u.phase).collect();
    phases.dedup();
    assert_eq!(
        phases,
        vec![
            DistributionPhase::Normalizing,
            DistributionPhase::ResolvingAsset,
            DistributionPhase::CheckingAccounts,
            DistributionPhase::Building,
            DistributionPhase::Submitting,
            DistributionPhase::Confirming,
            DistributionPhase::Completed,
        ]
    );
}

#[tokio::test]
async fn test_approved_plan_is_executed_without_reading_the_ledger_again() {
    let setup = setup(6, TokenProgram::SplToken);
    let (owners, data) = recipients_csv(14, "3");
    let engine = engine(
        &setup,
        LedgerBroadcaster::new(setup.ledger.clone()),
        DistributionConfig::default(),
    );

    let plan = engine
        .plan(&setup.mint.to_string(), text(data))
        .await
        .unwrap();
    let queries_after_planning = setup.ledger.existence_query_count();
    assert_eq!(queries_after_planning, 14);

    let report = engine
        .execute(plan, ProgressSender::disabled(), &CancellationFlag::new())
        .await;

    assert!(report.is_complete_success());
    assert_eq!(setup.ledger.existence_query_count(), queries_after_planning);
    for owner in &owners {
        assert_eq!(
            setup
                .ledger
                .balance_of(owner, &setup.mint, TokenProgram::SplToken),
            3_000_000
        );
    }
}

#[tokio::test]
async fn test_all_rows_rejected_returns_the_rejections() {
    let setup = setup(0, TokenProgram::SplToken);
    let data = format!(
        "address,amount\n{},0.5\n{},0.25\n",
        Pubkey::new_unique(),
        Pubkey::new_unique()
    );
    let engine = engine(
        &setup,
        LedgerBroadcaster::new(setup.ledger.clone()),
        DistributionConfig::default(),
    );

    let result = engine.plan(&setup.mint.to_string(), text(data)).await;

    match result {
        Err(DistributionError::EmptyRecipientList { rejected }) => {
            let lines: Vec<_> = rejected.iter().map(|r| r.line).collect();
            assert_eq!(lines, vec![2, 3]);
            assert!(rejected
                .iter()
                .all(|r| matches!(r.reason, RejectionReason::InvalidAmount(_))));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}
