//! Basic integration tests for shade-state

use color_eyre::eyre::{eyre, Report};

use shade_chain::{
    amount::Amount,
    asset,
    block::Height,
    dex::{BatchSwapOutputData, BlockFlows, Fill, MockFlowCiphertext, TradingPair},
    note::Nullifier,
    tree,
};
use shade_test::transcript::{TransError, Transcript};

use shade_state::*;

fn pair() -> TradingPair {
    TradingPair::new(asset::Id::from([9; 32]), asset::Id::from([8; 32])).expect("distinct assets")
}

fn is_double_spend() -> TransError {
    TransError::downcast::<ValidateContextError, _>("a duplicate nullifier", |error| {
        matches!(error, ValidateContextError::DuplicateNullifier { .. })
    })
}

/// One block with a fully filled swap, and a claim of an earlier swap.
fn settle_one_block() -> Vec<(Request, Result<Response, TransError>)> {
    let nullifier = Nullifier::from([1; 32]);
    let anchor = tree::Root::from([2; 32]);
    let enc_amount_1 = MockFlowCiphertext::new(Amount::from(100));
    let enc_amount_2 = MockFlowCiphertext::new(Amount::from(300));

    let fill = Fill {
        lambda_1: 100,
        lambda_2: 300,
        ..Fill::default()
    };
    let batch = BatchSwapOutputData::new(Height::MIN, pair(), 100, 300, fill)
        .expect("fully filled batch conserves value");

    vec![
        (Request::Tip, Ok(Response::Tip(None))),
        (
            Request::BeginBlock { height: Height::MIN },
            Ok(Response::Began(Height::MIN)),
        ),
        (
            Request::AdmitSwap {
                trading_pair: pair(),
                enc_amount_1,
                enc_amount_2,
            },
            Ok(Response::Admitted),
        ),
        (
            Request::SpendNullifier(nullifier),
            Ok(Response::Spent(nullifier)),
        ),
        (
            Request::SpendNullifier(nullifier),
            Err(is_double_spend()),
        ),
        (
            Request::SealBlock,
            Ok(Response::Sealed {
                height: Height::MIN,
                flows: BlockFlows::new().fold(pair(), enc_amount_1, enc_amount_2),
            }),
        ),
        (
            Request::CommitBlock {
                anchor,
                outputs: vec![batch],
            },
            Ok(Response::Committed(Height::MIN)),
        ),
        (
            Request::ContainsNullifier(nullifier),
            Ok(Response::ContainsNullifier(true)),
        ),
        (Request::Tip, Ok(Response::Tip(Some(Height::MIN)))),
    ]
}

/// Check the settlement transcript against a fresh state opened from `config`.
#[spandoc::spandoc]
async fn check_settlement(config: Config) -> Result<(), Report> {
    let transcript = Transcript::from(settle_one_block());

    /// SPANDOC: initialize the state service
    let state = init(config).map_err(|e| eyre!(e))?;

    /// SPANDOC: check the settlement transcript
    transcript.check(state).await?;

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn settle_one_block_in_memory() -> Result<(), Report> {
    shade_test::init();

    check_settlement(Config::ephemeral()).await
}

#[tokio::test(flavor = "multi_thread")]
async fn settle_one_block_on_disk() -> Result<(), Report> {
    shade_test::init();

    let cache_dir = tempfile::tempdir()?;

    check_settlement(Config {
        cache_dir: cache_dir.path().to_owned(),
        ephemeral: false,
    })
    .await
}
