//! Tests for the stateless swap and claim checks.

use shade_chain::{
    amount::Amount,
    asset, block,
    dex::{BatchSwapOutputData, BlockOutputs, Price, Swap, SwapPlaintext},
    note::NoteKind,
    primitives::Proof,
    value::Value,
};

use crate::{
    clearing::{ClearingRule, ProportionalSplit},
    primitives::proof::DigestProofVerifier,
    swap::verify_swap,
    swap_claim::check_against_batch,
    tests::{
        anchor, claim, nullifier, other_pair, pair, prove_claim, prove_swap, reversed_pair, swap,
        swap_on,
    },
};

use super::*;

fn outputs(delta_1: u128, delta_2: u128) -> BlockOutputs {
    let batch = BatchSwapOutputData::new(
        block::Height::MIN,
        pair(),
        delta_1,
        delta_2,
        ProportionalSplit.fill(delta_1, delta_2),
    )
    .expect("proportional split conserves value");

    BlockOutputs::new(block::Height::MIN, anchor(9), [batch]).expect("one batch per pair")
}

#[test]
fn swap_nft_must_be_one_swap_nft_unit() {
    shade_test::init();

    let nft = swap(100, 0).body.swap_nft;
    assert_eq!(swap_nft_is_well_formed(&nft), Ok(()));

    let two_units = NotePayload {
        kind: NoteKind::SwapNft {
            value: Value {
                amount: Amount::from(2),
                ..SwapPlaintext::swap_nft_value()
            },
        },
        ..nft.clone()
    };
    assert_eq!(
        swap_nft_is_well_formed(&two_units),
        Err(ActionError::MalformedSwapNft)
    );

    let wrong_asset = NotePayload {
        kind: NoteKind::SwapNft {
            value: Value {
                amount: Amount::from(1),
                asset_id: asset::Id::from_denom("ushade"),
            },
        },
        ..nft.clone()
    };
    assert_eq!(
        swap_nft_is_well_formed(&wrong_asset),
        Err(ActionError::MalformedSwapNft)
    );

    let untagged = NotePayload {
        kind: NoteKind::Regular,
        ..nft
    };
    assert_eq!(
        swap_nft_is_well_formed(&untagged),
        Err(ActionError::MalformedSwapNft)
    );
}

#[test]
fn reversed_pairs_are_not_canonical() {
    shade_test::init();

    assert_eq!(trading_pair_is_canonical(&pair()), Ok(()));
    assert_eq!(
        trading_pair_is_canonical(&reversed_pair()),
        Err(ActionError::NonCanonicalPair)
    );
}

#[test]
fn claim_prices_must_match_the_recorded_batch() {
    shade_test::init();

    let outputs = outputs(100, 300);
    let good = claim(&outputs, nullifier(1));
    assert_eq!(prices_match_batch(&good, &outputs), Ok(()));

    let stale = SwapClaim {
        price_1: Price::ratio(1, 1),
        ..good.clone()
    };
    assert_eq!(
        prices_match_batch(&stale, &outputs),
        Err(ActionError::StalePrice)
    );

    let swapped_prices = SwapClaim {
        price_1: good.price_2,
        price_2: good.price_1,
        ..good.clone()
    };
    assert_eq!(
        prices_match_batch(&swapped_prices, &outputs),
        Err(ActionError::StalePrice)
    );

    let no_batch = SwapClaim {
        trading_pair: other_pair(),
        ..good
    };
    assert_eq!(
        prices_match_batch(&no_batch, &outputs),
        Err(ActionError::StalePrice)
    );
}

#[test]
fn proofs_must_match_the_submitted_action() {
    shade_test::init();

    let verifier = DigestProofVerifier;

    let valid = swap(100, 300);
    assert_eq!(proof_is_valid(&verifier, &valid), Ok(()));

    let garbage = Swap {
        zkproof: Proof(vec![0; 64]),
        ..valid.clone()
    };
    assert_eq!(
        proof_is_valid(&verifier, &garbage),
        Err(ActionError::ProofInvalid)
    );

    // The proof was made for the canonical pair bytes.
    let mut reordered = valid;
    reordered.body.trading_pair = reversed_pair();
    assert_eq!(
        proof_is_valid(&verifier, &reordered),
        Err(ActionError::ProofInvalid)
    );

    let outputs = outputs(100, 300);
    let mut claim = claim(&outputs, nullifier(1));
    assert_eq!(proof_is_valid(&verifier, &claim), Ok(()));

    claim.fee = Amount::from(1);
    assert_eq!(
        proof_is_valid(&verifier, &claim),
        Err(ActionError::ProofInvalid)
    );
    assert_eq!(proof_is_valid(&verifier, &prove_claim(claim)), Ok(()));
}

#[test]
fn swap_checks_run_in_order() {
    shade_test::init();

    let verifier = DigestProofVerifier;

    assert_eq!(verify_swap(&swap(100, 300), &verifier), Ok(()));

    // A reversed pair with a bad proof fails the proof check first.
    let mut reversed = swap_on(reversed_pair(), 100, 300);
    reversed.zkproof = Proof(vec![0; 64]);
    assert_eq!(
        verify_swap(&reversed, &verifier),
        Err(ActionError::ProofInvalid)
    );

    // With a valid proof, the pair order is what fails.
    assert_eq!(
        verify_swap(&prove_swap(reversed), &verifier),
        Err(ActionError::NonCanonicalPair)
    );

    let mut malformed = swap(100, 300);
    malformed.body.swap_nft.kind = NoteKind::Regular;
    let malformed = prove_swap(malformed);
    assert_eq!(
        verify_swap(&malformed, &verifier),
        Err(ActionError::MalformedSwapNft)
    );
}

#[test]
fn relabelled_swap_nfts_fail_the_proof() {
    shade_test::init();

    let verifier = DigestProofVerifier;

    let mut two_units = swap(100, 300);
    two_units.body.swap_nft.kind = NoteKind::SwapNft {
        value: Value {
            amount: Amount::from(2),
            ..SwapPlaintext::swap_nft_value()
        },
    };
    let two_units = prove_swap(two_units);
    assert_eq!(
        verify_swap(&two_units, &verifier),
        Err(ActionError::MalformedSwapNft)
    );

    // Rewriting the declared value after proving breaks the proof.
    let mut relabelled = two_units;
    relabelled.body.swap_nft.kind = NoteKind::SwapNft {
        value: SwapPlaintext::swap_nft_value(),
    };
    assert_eq!(
        verify_swap(&relabelled, &verifier),
        Err(ActionError::ProofInvalid)
    );

    let mut untagged = swap(100, 300);
    untagged.body.swap_nft.kind = NoteKind::Regular;
    assert_eq!(
        verify_swap(&untagged, &verifier),
        Err(ActionError::ProofInvalid)
    );
}

#[test]
fn claims_on_reversed_pairs_are_not_canonical() {
    shade_test::init();

    let verifier = DigestProofVerifier;
    let outputs = outputs(100, 300);

    let good = claim(&outputs, nullifier(1));
    assert_eq!(check_against_batch(&good, &outputs, &verifier), Ok(()));

    let reversed = prove_claim(SwapClaim {
        trading_pair: reversed_pair(),
        ..good
    });
    assert_eq!(
        check_against_batch(&reversed, &outputs, &verifier),
        Err(ActionError::NonCanonicalPair)
    );
}
