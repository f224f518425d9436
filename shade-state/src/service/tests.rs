//! Tests for the state service's block lifecycle.

use color_eyre::eyre::{eyre, Result};
use tower::{buffer::Buffer, util::BoxService, ServiceExt};

use shade_chain::{
    amount::Amount,
    asset, block,
    dex::{BatchSwapOutputData, BlockFlows, Fill, MockFlowCiphertext, TradingPair},
    note::Nullifier,
    tree,
};

use crate::{
    init_test, BoxError, CommitBlockError, Request, Response, ValidateContextError,
};

type State = Buffer<BoxService<Request, Response, BoxError>, Request>;

fn pair() -> TradingPair {
    TradingPair::new(asset::Id::from([1; 32]), asset::Id::from([2; 32])).expect("distinct assets")
}

fn anchor(height: u32) -> tree::Root {
    tree::Root::from([height as u8 + 1; 32])
}

/// A batch where every unit of asset_1 is refunded.
fn refund_batch(height: u32, delta_1: u128) -> BatchSwapOutputData {
    let fill = Fill {
        unfilled_1: delta_1,
        ..Fill::default()
    };

    BatchSwapOutputData::new(block::Height(height), pair(), delta_1, 0, fill)
        .expect("refunds conserve value")
}

async fn request(state: &State, req: Request) -> Result<Response, BoxError> {
    state.clone().oneshot(req).await
}

/// Begin a block, admit one swap of `t1` units, and seal it.
async fn sealed_block(state: &State, height: u32, t1: u64) -> Result<()> {
    request(
        state,
        Request::BeginBlock {
            height: block::Height(height),
        },
    )
    .await
    .map_err(|e| eyre!(e))?;
    request(
        state,
        Request::AdmitSwap {
            trading_pair: pair(),
            enc_amount_1: MockFlowCiphertext::new(Amount::from(t1)),
            enc_amount_2: MockFlowCiphertext::new(Amount::zero()),
        },
    )
    .await
    .map_err(|e| eyre!(e))?;
    request(state, Request::SealBlock)
        .await
        .map_err(|e| eyre!(e))?;

    Ok(())
}

fn duplicate_nullifier(error: &BoxError) -> Option<bool> {
    match error.downcast_ref::<ValidateContextError>() {
        Some(ValidateContextError::DuplicateNullifier {
            in_finalized_state, ..
        }) => Some(*in_finalized_state),
        _ => None,
    }
}

#[tokio::test]
async fn block_lifecycle_publishes_outputs() -> Result<()> {
    shade_test::init();

    let state = init_test();
    let nullifier = Nullifier::from([7; 32]);

    assert_eq!(request(&state, Request::Tip).await.map_err(|e| eyre!(e))?, Response::Tip(None));

    request(
        &state,
        Request::BeginBlock {
            height: block::Height::MIN,
        },
    )
    .await
    .map_err(|e| eyre!(e))?;

    for _ in 0..2 {
        let rsp = request(
            &state,
            Request::AdmitSwap {
                trading_pair: pair(),
                enc_amount_1: MockFlowCiphertext::new(Amount::from(50)),
                enc_amount_2: MockFlowCiphertext::new(Amount::zero()),
            },
        )
        .await
        .map_err(|e| eyre!(e))?;
        assert_eq!(rsp, Response::Admitted);
    }

    assert_eq!(
        request(&state, Request::SpendNullifier(nullifier))
            .await
            .map_err(|e| eyre!(e))?,
        Response::Spent(nullifier)
    );
    assert_eq!(
        request(&state, Request::ContainsNullifier(nullifier))
            .await
            .map_err(|e| eyre!(e))?,
        Response::ContainsNullifier(true)
    );

    let expected_flows = BlockFlows::new().fold(
        pair(),
        MockFlowCiphertext::new(Amount::from(100)),
        MockFlowCiphertext::identity(),
    );
    assert_eq!(
        request(&state, Request::SealBlock)
            .await
            .map_err(|e| eyre!(e))?,
        Response::Sealed {
            height: block::Height::MIN,
            flows: expected_flows,
        }
    );

    // No more actions once the block is sealed.
    let error = request(&state, Request::SpendNullifier(Nullifier::from([8; 32])))
        .await
        .expect_err("sealed blocks reject claims");
    assert!(matches!(
        error.downcast_ref::<CommitBlockError>(),
        Some(CommitBlockError::BlockSealed { .. })
    ));

    let batch = refund_batch(0, 100);
    assert_eq!(
        request(
            &state,
            Request::CommitBlock {
                anchor: anchor(0),
                outputs: vec![batch],
            },
        )
        .await
        .map_err(|e| eyre!(e))?,
        Response::Committed(block::Height::MIN)
    );

    assert_eq!(
        request(&state, Request::Tip).await.map_err(|e| eyre!(e))?,
        Response::Tip(Some(block::Height::MIN))
    );

    let Response::Anchor(Some(outputs)) = request(&state, Request::LookupAnchor(anchor(0)))
        .await
        .map_err(|e| eyre!(e))?
    else {
        return Err(eyre!("committed anchor must be found"));
    };
    assert_eq!(outputs.get(&pair()), Some(&batch));
    assert_eq!(outputs.height(), block::Height::MIN);

    assert_eq!(
        request(&state, Request::LookupAnchor(anchor(9)))
            .await
            .map_err(|e| eyre!(e))?,
        Response::Anchor(None)
    );

    Ok(())
}

#[tokio::test]
async fn concurrent_spends_of_one_nullifier_have_one_winner() -> Result<()> {
    shade_test::init();

    let state = init_test();
    let nullifier = Nullifier::from([3; 32]);

    request(
        &state,
        Request::BeginBlock {
            height: block::Height::MIN,
        },
    )
    .await
    .map_err(|e| eyre!(e))?;

    let (first, second) = tokio::join!(
        request(&state, Request::SpendNullifier(nullifier)),
        request(&state, Request::SpendNullifier(nullifier)),
    );

    let results = [first, second];
    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);

    let loser = results
        .iter()
        .find_map(|result| result.as_ref().err())
        .expect("one spend fails");
    assert_eq!(duplicate_nullifier(loser), Some(false));

    Ok(())
}

#[tokio::test]
async fn finalized_nullifiers_cannot_be_respent() -> Result<()> {
    shade_test::init();

    let state = init_test();
    let nullifier = Nullifier::from([4; 32]);

    request(
        &state,
        Request::BeginBlock {
            height: block::Height::MIN,
        },
    )
    .await
    .map_err(|e| eyre!(e))?;
    request(&state, Request::SpendNullifier(nullifier))
        .await
        .map_err(|e| eyre!(e))?;
    request(&state, Request::SealBlock)
        .await
        .map_err(|e| eyre!(e))?;
    request(
        &state,
        Request::CommitBlock {
            anchor: anchor(0),
            outputs: Vec::new(),
        },
    )
    .await
    .map_err(|e| eyre!(e))?;

    request(
        &state,
        Request::BeginBlock {
            height: block::Height(1),
        },
    )
    .await
    .map_err(|e| eyre!(e))?;

    let error = request(&state, Request::SpendNullifier(nullifier))
        .await
        .expect_err("finalized nullifier is spent");
    assert_eq!(duplicate_nullifier(&error), Some(true));

    Ok(())
}

#[tokio::test]
async fn abandoned_block_leaves_no_trace() -> Result<()> {
    shade_test::init();

    let state = init_test();
    let nullifier = Nullifier::from([5; 32]);

    sealed_block(&state, 0, 10).await?;

    // Sealing does not stop a block from being abandoned.
    assert_eq!(
        request(&state, Request::AbandonBlock)
            .await
            .map_err(|e| eyre!(e))?,
        Response::Abandoned(Some(block::Height::MIN))
    );
    assert_eq!(
        request(&state, Request::AbandonBlock)
            .await
            .map_err(|e| eyre!(e))?,
        Response::Abandoned(None)
    );

    // The same height can be started again, with empty flows.
    request(
        &state,
        Request::BeginBlock {
            height: block::Height::MIN,
        },
    )
    .await
    .map_err(|e| eyre!(e))?;
    request(&state, Request::SpendNullifier(nullifier))
        .await
        .map_err(|e| eyre!(e))?;
    request(&state, Request::AbandonBlock)
        .await
        .map_err(|e| eyre!(e))?;

    assert_eq!(
        request(&state, Request::ContainsNullifier(nullifier))
            .await
            .map_err(|e| eyre!(e))?,
        Response::ContainsNullifier(false)
    );

    request(
        &state,
        Request::BeginBlock {
            height: block::Height::MIN,
        },
    )
    .await
    .map_err(|e| eyre!(e))?;
    assert_eq!(
        request(&state, Request::SealBlock)
            .await
            .map_err(|e| eyre!(e))?,
        Response::Sealed {
            height: block::Height::MIN,
            flows: BlockFlows::new(),
        }
    );
    assert_eq!(
        request(&state, Request::Tip).await.map_err(|e| eyre!(e))?,
        Response::Tip(None)
    );

    Ok(())
}

#[tokio::test]
async fn lifecycle_requests_out_of_order_fail() -> Result<()> {
    shade_test::init();

    let state = init_test();

    let error = request(&state, Request::SealBlock)
        .await
        .expect_err("no block in progress");
    assert!(matches!(
        error.downcast_ref::<CommitBlockError>(),
        Some(CommitBlockError::NoBlockInProgress)
    ));

    let error = request(
        &state,
        Request::BeginBlock {
            height: block::Height(1),
        },
    )
    .await
    .expect_err("the first block is at the minimum height");
    assert!(matches!(
        error.downcast_ref::<CommitBlockError>(),
        Some(CommitBlockError::UnexpectedHeight {
            expected: Some(block::Height::MIN),
            ..
        })
    ));

    request(
        &state,
        Request::BeginBlock {
            height: block::Height::MIN,
        },
    )
    .await
    .map_err(|e| eyre!(e))?;

    let error = request(
        &state,
        Request::BeginBlock {
            height: block::Height::MIN,
        },
    )
    .await
    .expect_err("a block is already in progress");
    assert!(matches!(
        error.downcast_ref::<CommitBlockError>(),
        Some(CommitBlockError::BlockInProgress { .. })
    ));

    let error = request(
        &state,
        Request::CommitBlock {
            anchor: anchor(0),
            outputs: Vec::new(),
        },
    )
    .await
    .expect_err("the block is not sealed");
    assert!(matches!(
        error.downcast_ref::<CommitBlockError>(),
        Some(CommitBlockError::NotSealed { .. })
    ));

    Ok(())
}

#[tokio::test]
async fn committed_batches_must_match_sealed_flows() -> Result<()> {
    shade_test::init();

    let state = init_test();
    sealed_block(&state, 0, 10).await?;

    let error = request(
        &state,
        Request::CommitBlock {
            anchor: anchor(0),
            outputs: Vec::new(),
        },
    )
    .await
    .expect_err("the pair with flows has no batch");
    assert!(matches!(
        error.downcast_ref::<CommitBlockError>(),
        Some(CommitBlockError::MissingBatch(missing)) if *missing == pair()
    ));

    let error = request(
        &state,
        Request::CommitBlock {
            anchor: anchor(0),
            outputs: vec![refund_batch(1, 10)],
        },
    )
    .await
    .expect_err("the batch is for another height");
    assert!(matches!(
        error.downcast_ref::<CommitBlockError>(),
        Some(CommitBlockError::Batch(_))
    ));

    // Failed commits keep the block in progress.
    assert_eq!(
        request(
            &state,
            Request::CommitBlock {
                anchor: anchor(0),
                outputs: vec![refund_batch(0, 10)],
            },
        )
        .await
        .map_err(|e| eyre!(e))?,
        Response::Committed(block::Height::MIN)
    );

    // Blocks without swaps can't publish batches.
    request(
        &state,
        Request::BeginBlock {
            height: block::Height(1),
        },
    )
    .await
    .map_err(|e| eyre!(e))?;
    request(&state, Request::SealBlock)
        .await
        .map_err(|e| eyre!(e))?;

    let error = request(
        &state,
        Request::CommitBlock {
            anchor: anchor(1),
            outputs: vec![refund_batch(1, 0)],
        },
    )
    .await
    .expect_err("no flows for the batch's pair");
    assert!(matches!(
        error.downcast_ref::<CommitBlockError>(),
        Some(CommitBlockError::UnexpectedBatch(_))
    ));

    Ok(())
}
