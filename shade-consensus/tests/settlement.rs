//! End-to-end settlement of swaps and claims through the block processor.

use std::sync::Arc;

use color_eyre::eyre::{eyre, Report};

use shade_chain::{
    amount::Amount,
    asset,
    block::Height,
    dex::{
        BatchSwapOutputData, BlockOutputs, MockFlowCiphertext, Swap, SwapBody, SwapCiphertext,
        SwapClaim, SwapPlaintext, TradingPair,
    },
    keys::Address,
    note::{self, EncryptedNote, EphemeralKey, NoteKind, NotePayload, Nullifier},
    primitives::Proof,
    tree,
    value::{Blinding, Value},
};
use shade_consensus::{
    ActionError, BlockProcessor, ClearingRule, Config, Description, DigestProofVerifier,
    MockFlowDecryptor, ProportionalSplit, Request, Response,
};
use shade_test::transcript::{TransError, Transcript};

fn pair() -> TradingPair {
    TradingPair::new(asset::Id::from_denom("ushade"), asset::Id::from_denom("ugold"))
        .expect("distinct denominations")
}

fn payload(kind: NoteKind) -> NotePayload {
    NotePayload {
        note_commitment: note::Commitment::from([1; 32]),
        ephemeral_key: EphemeralKey([2; 32]),
        encrypted_note: EncryptedNote(vec![3; 64]),
        kind,
    }
}

fn swap(t1: u64, t2: u64) -> Swap {
    let plaintext = SwapPlaintext {
        trading_pair: pair(),
        t1: Amount::from(t1),
        t2: Amount::from(t2),
        fee: Amount::from(0),
        claim_address: Address {
            diversified_basepoint: [7; 32],
            transmission_key: [8; 32],
        },
    };
    let mut rng = rand::thread_rng();

    let mut swap = Swap {
        zkproof: Proof(Vec::new()),
        enc_amount_1: MockFlowCiphertext::new(plaintext.t1),
        enc_amount_2: MockFlowCiphertext::new(plaintext.t2),
        body: SwapBody {
            trading_pair: plaintext.trading_pair,
            ca1: plaintext.value_1().commit(&Blinding::new(&mut rng)),
            ca2: plaintext.value_2().commit(&Blinding::new(&mut rng)),
            cf: Value {
                amount: plaintext.fee,
                asset_id: asset::Id::from_denom("ushade"),
            }
            .commit(&Blinding::new(&mut rng)),
            swap_nft: NotePayload {
                note_commitment: plaintext.swap_nft_commitment([4; 32]),
                ..payload(NoteKind::SwapNft {
                    value: SwapPlaintext::swap_nft_value(),
                })
            },
            swap_ciphertext: SwapCiphertext(vec![5; 120]),
        },
    };
    swap.zkproof = DigestProofVerifier::prove(&swap.public_inputs());

    swap
}

fn claim(outputs: &BlockOutputs, nullifier: Nullifier) -> SwapClaim {
    let batch = outputs.get(&pair()).expect("the pair has a batch");

    let mut claim = SwapClaim {
        zkproof: Proof(Vec::new()),
        nullifier,
        fee: Amount::from(0),
        output_1: payload(NoteKind::Regular),
        output_2: payload(NoteKind::Regular),
        anchor: outputs.anchor(),
        price_1: batch.price_1(),
        price_2: batch.price_2(),
        trading_pair: pair(),
    };
    claim.zkproof = DigestProofVerifier::prove(&claim.public_inputs());

    claim
}

fn is_double_spend() -> TransError {
    TransError::downcast::<ActionError, _>("a double spend", |error| {
        matches!(error, ActionError::DoubleSpend(_))
    })
}

/// Two blocks: the first settles a batch of two swaps, the second claims one
/// of them, and rejects a second claim with the same nullifier.
fn settle_and_claim() -> Vec<(Request, Result<Response, TransError>)> {
    let first_anchor = tree::Root::from([1; 32]);
    let second_anchor = tree::Root::from([2; 32]);
    let nullifier = Nullifier::from([1; 32]);

    let batch = BatchSwapOutputData::new(
        Height::MIN,
        pair(),
        100,
        300,
        ProportionalSplit.fill(100, 300),
    )
    .expect("proportional split conserves value");
    let first_outputs = Arc::new(
        BlockOutputs::new(Height::MIN, first_anchor, [batch]).expect("one batch per pair"),
    );
    let second_outputs = Arc::new(
        BlockOutputs::new(Height(1), second_anchor, Vec::<BatchSwapOutputData>::new())
            .expect("no batches"),
    );

    let claim = Arc::new(claim(&first_outputs, nullifier));

    vec![
        (
            Request::BeginBlock { height: Height::MIN },
            Ok(Response::Began(Height::MIN)),
        ),
        (Request::Swap(Arc::new(swap(100, 0))), Ok(Response::Admitted)),
        (Request::Swap(Arc::new(swap(0, 300))), Ok(Response::Admitted)),
        (
            Request::EndBlock {
                anchor: first_anchor,
            },
            Ok(Response::Finalized(first_outputs)),
        ),
        (
            Request::BeginBlock { height: Height(1) },
            Ok(Response::Began(Height(1))),
        ),
        (
            Request::SwapClaim(claim.clone()),
            Ok(Response::Claimed(nullifier)),
        ),
        (
            Request::SwapClaim(claim),
            Err(is_double_spend()),
        ),
        (
            Request::EndBlock {
                anchor: second_anchor,
            },
            Ok(Response::Finalized(second_outputs)),
        ),
    ]
}

/// Check the settlement transcript against a block processor over a fresh
/// state opened from `config`.
#[spandoc::spandoc]
async fn check_settlement(config: shade_state::Config) -> Result<(), Report> {
    let transcript = Transcript::from(settle_and_claim());

    /// SPANDOC: initialize the state service
    let state = shade_state::init(config).map_err(|e| eyre!(e))?;

    /// SPANDOC: initialize the block processor
    let processor = BlockProcessor::new(
        &Config::default(),
        state,
        Arc::new(DigestProofVerifier),
        Arc::new(MockFlowDecryptor),
    );

    /// SPANDOC: check the settlement transcript
    transcript.check(processor).await?;

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn settle_and_claim_in_memory() -> Result<(), Report> {
    shade_test::init();

    check_settlement(shade_state::Config::ephemeral()).await
}

#[tokio::test(flavor = "multi_thread")]
async fn settle_and_claim_on_disk() -> Result<(), Report> {
    shade_test::init();

    let cache_dir = tempfile::tempdir()?;

    check_settlement(shade_state::Config {
        cache_dir: cache_dir.path().to_owned(),
        ephemeral: false,
    })
    .await
}
