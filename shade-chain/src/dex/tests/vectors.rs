//! Fixed test vectors for batched swap data structures.

use color_eyre::eyre::Result;

use crate::{
    amount::Amount,
    asset,
    block,
    keys::Address,
    note::{self, EncryptedNote, EphemeralKey, NoteKind, NotePayload, Nullifier},
    primitives::Proof,
    proto,
    serialization::{SerializationError, ShadeDeserializeInto, ShadeSerialize},
    tree,
    value::{Blinding, Value},
};

use super::super::*;

fn assets() -> (asset::Id, asset::Id) {
    let a = asset::Id::from_denom("ushade");
    let b = asset::Id::from_denom("ugold");

    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

fn pair() -> TradingPair {
    let (a, b) = assets();
    TradingPair::new(a, b).expect("distinct denominations")
}

fn address() -> Address {
    Address {
        diversified_basepoint: [7; 32],
        transmission_key: [8; 32],
    }
}

fn payload(kind: NoteKind) -> NotePayload {
    NotePayload {
        note_commitment: note::Commitment::from([1; 32]),
        ephemeral_key: EphemeralKey([2; 32]),
        encrypted_note: EncryptedNote(vec![3; 64]),
        kind,
    }
}

fn swap() -> Swap {
    let plaintext = SwapPlaintext {
        trading_pair: pair(),
        t1: Amount::from(100),
        t2: Amount::from(0),
        fee: Amount::from(3),
        claim_address: address(),
    };
    let mut rng = rand::thread_rng();

    Swap {
        zkproof: Proof(vec![0xab; 48]),
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
    }
}

fn swap_claim() -> SwapClaim {
    SwapClaim {
        zkproof: Proof(vec![0xcd; 48]),
        nullifier: Nullifier::from([6; 32]),
        fee: Amount::from(1),
        output_1: payload(NoteKind::Regular),
        output_2: payload(NoteKind::Regular),
        anchor: tree::Root::from([9; 32]),
        price_1: Price::ratio(3, 2),
        price_2: Price::ratio(2, 3),
        trading_pair: pair(),
    }
}

#[test]
fn trading_pair_canonical_order() {
    shade_test::init();

    let (a, b) = assets();

    let pair = TradingPair::new(b, a).expect("distinct");
    assert_eq!(pair.asset_1(), a);
    assert_eq!(pair.asset_2(), b);

    assert_eq!(TradingPair::orient(a, b), Ok((pair, true)));
    assert_eq!(TradingPair::orient(b, a), Ok((pair, false)));

    let raw = TradingPair::from_raw(b, a).expect("distinct");
    assert!(!raw.is_canonical());
    assert_eq!(raw.canonical(), pair);
    assert_ne!(raw, pair);
}

#[test]
fn same_asset_pair_fails_to_decode() {
    shade_test::init();

    let (a, _) = assets();
    let msg = proto::TradingPair {
        asset_1: Some(a.into()),
        asset_2: Some(a.into()),
    };

    assert!(matches!(
        TradingPair::try_from(msg),
        Err(SerializationError::Parse(_))
    ));
}

#[test]
fn price_fixed_point_vectors() {
    shade_test::init();

    assert_eq!(Price::ratio(1, 1), Price::ONE);
    assert_eq!(Price::ratio(1, 2).to_bits(), U256::one() << 127);
    assert_eq!(Price::ratio(5, 0), Price::ZERO);
    assert_eq!(Price::ratio(u128::MAX, 1).to_bits(), U256::from(u128::MAX) << 128);
    assert!(Price::ratio(1, u128::MAX) > Price::ZERO);

    // Thirds round down.
    assert_eq!(Price::ratio(1, 3).to_bits() * 3 + 1, Price::ONE.to_bits());

    let price = Price::ratio(7, 3);
    assert_eq!(Price::from_bytes(price.to_bytes()), price);
    assert!(Price::try_from(vec![0; 16]).is_err());
}

#[test]
fn lopsided_batches_keep_exact_prices() -> Result<()> {
    shade_test::init();

    // One unit of asset_1 against 2^65 units of asset_2.
    let fill = Fill {
        lambda_1: 1,
        lambda_2: 1 << 65,
        unfilled_1: 0,
        unfilled_2: 0,
    };
    let batch = BatchSwapOutputData::new(block::Height(1), pair(), 1, 1 << 65, fill)?;

    assert_eq!(batch.price_1(), Price::ratio(1 << 65, 1));
    assert_eq!(batch.price_1().to_bits(), U256::one() << (65 + 128));
    assert_eq!(batch.price_2().to_bits(), U256::one() << (128 - 65));

    // The asset_1 seller is owed 2^65 units, more than one note can hold.
    assert!(batch
        .output_amounts(Amount::from(1), Amount::from(0), Amount::from(0))
        .is_err());

    // Four sellers of u64::MAX units of asset_2 share four units of asset_1.
    let delta_2 = 4 * u128::from(u64::MAX);
    let fill = Fill {
        lambda_1: 4,
        lambda_2: delta_2,
        unfilled_1: 0,
        unfilled_2: 0,
    };
    let batch = BatchSwapOutputData::new(block::Height(1), pair(), 4, delta_2, fill)?;

    assert_eq!(
        batch.output_amounts(Amount::from(0), Amount::from(u64::MAX), Amount::from(0))?,
        (Amount::from(1), Amount::from(0))
    );
    assert_eq!(
        batch.output_amounts(Amount::from(1), Amount::from(0), Amount::from(0))?,
        (Amount::from(0), Amount::from(u64::MAX))
    );

    Ok(())
}

#[test]
fn batch_prices_follow_fill() -> Result<()> {
    shade_test::init();

    let fill = Fill {
        lambda_1: 100,
        lambda_2: 200,
        unfilled_1: 0,
        unfilled_2: 0,
    };
    let batch = BatchSwapOutputData::new(block::Height(3), pair(), 100, 200, fill)?;

    assert_eq!(batch.price_1(), Price::ratio(2, 1));
    assert_eq!(batch.price_2(), Price::ratio(1, 2));

    // A seller of 50 units of asset_1 receives 100 units of asset_2, less
    // the fee, which is taken entirely from the only non-zero output.
    assert_eq!(
        batch.output_amounts(Amount::from(50), Amount::from(0), Amount::from(10))?,
        (Amount::from(0), Amount::from(90))
    );

    assert_eq!(
        batch.output_amounts(Amount::from(0), Amount::from(100), Amount::from(0))?,
        (Amount::from(50), Amount::from(0))
    );

    Ok(())
}

#[test]
fn one_sided_batch_refunds_inputs() -> Result<()> {
    shade_test::init();

    let fill = Fill {
        lambda_1: 0,
        lambda_2: 0,
        unfilled_1: 100,
        unfilled_2: 0,
    };
    let batch = BatchSwapOutputData::new(block::Height(1), pair(), 100, 0, fill)?;

    assert_eq!(batch.price_1(), Price::ZERO);
    assert_eq!(batch.price_2(), Price::ZERO);
    assert_eq!(
        batch.output_amounts(Amount::from(100), Amount::from(0), Amount::from(0))?,
        (Amount::from(100), Amount::from(0))
    );

    Ok(())
}

#[test]
fn fee_larger_than_outputs_leaves_zero() -> Result<()> {
    shade_test::init();

    let fill = Fill {
        lambda_1: 10,
        lambda_2: 10,
        ..Fill::default()
    };
    let batch = BatchSwapOutputData::new(block::Height(1), pair(), 10, 10, fill)?;

    assert_eq!(
        batch.output_amounts(Amount::from(5), Amount::from(5), Amount::from(1_000))?,
        (Amount::zero(), Amount::zero())
    );

    Ok(())
}

#[test]
fn inconsistent_batches_are_rejected() {
    shade_test::init();

    let over_paid = Fill {
        lambda_1: 60,
        unfilled_1: 50,
        ..Fill::default()
    };
    assert_eq!(
        BatchSwapOutputData::new(block::Height(1), pair(), 100, 0, over_paid),
        Err(BatchError::Conservation {
            trading_pair: pair(),
            received: 100,
            paid_out: 110,
        })
    );

    let (a, b) = assets();
    let reversed = TradingPair::from_raw(b, a).expect("distinct");
    assert_eq!(
        BatchSwapOutputData::new(block::Height(1), reversed, 0, 0, Fill::default()),
        Err(BatchError::NonCanonicalPair(reversed))
    );
}

#[test]
fn block_outputs_index_by_pair() -> Result<()> {
    shade_test::init();

    let height = block::Height(4);
    let anchor = tree::Root::from([4; 32]);
    let batch = BatchSwapOutputData::new(height, pair(), 0, 0, Fill::default())?;

    let outputs = BlockOutputs::new(height, anchor, [batch])?;
    assert_eq!(outputs.get(&pair()), Some(&batch));
    assert_eq!(outputs.anchor(), anchor);
    assert_eq!(outputs.len(), 1);

    assert_eq!(
        BlockOutputs::new(height, anchor, [batch, batch]),
        Err(BatchError::DuplicateBatch(pair()))
    );
    assert_eq!(
        BlockOutputs::new(block::Height(5), anchor, [batch]),
        Err(BatchError::HeightMismatch {
            expected: block::Height(5),
            actual: height,
        })
    );

    Ok(())
}

#[test]
fn swap_wire_encoding() -> Result<()> {
    shade_test::init();

    let swap = swap();
    let bytes = swap.shade_serialize_to_vec();
    let decoded: Swap = bytes.as_slice().shade_deserialize_into()?;

    assert_eq!(decoded, swap);
    assert_eq!(
        decoded.body.swap_nft.swap_nft_value(),
        Some(SwapPlaintext::swap_nft_value())
    );

    let mut msg = proto::Swap::from(swap);
    msg.body = None;
    assert!(matches!(
        Swap::try_from(msg),
        Err(SerializationError::MissingField("Swap.body"))
    ));

    Ok(())
}

#[test]
fn swap_balance_commitment_sums_inputs() {
    shade_test::init();

    let swap = swap();

    assert_eq!(
        swap.balance_commitment(),
        swap.body.ca1 + swap.body.ca2 + swap.body.cf
    );
}

#[test]
fn swap_claim_wire_encoding() -> Result<()> {
    shade_test::init();

    let claim = swap_claim();
    let bytes = claim.shade_serialize_to_vec();
    let decoded: SwapClaim = bytes.as_slice().shade_deserialize_into()?;
    assert_eq!(decoded, claim);

    let mut msg = proto::SwapClaim::from(claim.clone());
    msg.price_1.truncate(8);
    assert!(SwapClaim::try_from(msg).is_err());

    let mut msg = proto::SwapClaim::from(claim);
    msg.trading_pair = None;
    assert!(matches!(
        SwapClaim::try_from(msg),
        Err(SerializationError::MissingField("SwapClaim.trading_pair"))
    ));

    Ok(())
}

#[test]
fn garbage_bytes_fail_to_decode() {
    shade_test::init();

    let result: std::result::Result<SwapClaim, _> = [0xff_u8; 7].as_slice().shade_deserialize_into();
    assert!(result.is_err());
}
