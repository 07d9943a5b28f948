use proptest::prelude::*;

use rollsync::config::SyncConfig;
use rollsync::delta::DeltaOp;
use rollsync::hash::rolling::Rolling32;
use rollsync::hash::strong::StrongAlgorithm;
use rollsync::index::SignatureIndex;
use rollsync::signature::Signature;
use rollsync::{matcher, rebuild};

fn strong_strategy() -> impl Strategy<Value = StrongAlgorithm> {
    prop_oneof![
        Just(StrongAlgorithm::Md4),
        Just(StrongAlgorithm::Md5),
        Just(StrongAlgorithm::Sha256),
    ]
}

proptest! {
    #[test]
    fn prop_roundtrip_reproduces_target(
        base in proptest::collection::vec(any::<u8>(), 0..2048),
        target in proptest::collection::vec(any::<u8>(), 0..2048),
        block_length in 1usize..=64,
        strong in strong_strategy()
    ) {
        let config = SyncConfig::new(block_length, strong);
        let signature = Signature::generate(&base, &config).unwrap();
        let index = SignatureIndex::build(&signature);
        let delta = matcher::find_delta(&target, &index);
        let rebuilt = rebuild::rebuild(&base, &delta).unwrap();
        prop_assert_eq!(rebuilt, target);
    }

    #[test]
    fn prop_identical_files_are_pure_copies(
        base in proptest::collection::vec(any::<u8>(), 1..2048),
        block_length in 1usize..=64
    ) {
        let config = SyncConfig::new(block_length, StrongAlgorithm::Md4);
        let signature = Signature::generate(&base, &config).unwrap();
        let index = SignatureIndex::build(&signature);
        let delta = matcher::find_delta(&base, &index);

        prop_assert_eq!(delta.literal_bytes(), 0, "identical files need no literals");
        prop_assert_eq!(delta.copy_ops(), signature.block_count());
        // Lowest-index tie-break: copied indices never decrease arbitrarily —
        // duplicate blocks all resolve to their first occurrence.
        for op in delta.ops() {
            let DeltaOp::Copy { index } = op else {
                panic!("unexpected literal in identical-file delta");
            };
            let block = &signature.blocks()[*index as usize];
            let first = signature
                .blocks()
                .iter()
                .find(|b| b.weak == block.weak && b.strong == block.strong && b.len == block.len)
                .unwrap();
            prop_assert_eq!(first.index, *index);
        }
    }

    #[test]
    fn prop_rolling_equals_fresh_at_every_offset(
        data in proptest::collection::vec(any::<u8>(), 2..512),
        window_frac in 1usize..100
    ) {
        let window = 1 + window_frac % data.len().min(100);
        prop_assume!(window <= data.len());

        let mut state = Rolling32::new();
        state.seed(&data[..window]);
        for i in 0..=data.len() - window {
            prop_assert_eq!(
                state.digest(),
                Rolling32::compute(&data[i..i + window]),
                "mismatch at offset {}", i
            );
            if i + window < data.len() {
                state.roll(data[i], data[i + window]);
            }
        }
    }

    #[test]
    fn prop_signature_framing_roundtrip(
        base in proptest::collection::vec(any::<u8>(), 0..1024),
        block_length in 1usize..=64,
        strong in strong_strategy()
    ) {
        let config = SyncConfig::new(block_length, strong);
        let signature = Signature::generate(&base, &config).unwrap();
        let mut framed = Vec::new();
        signature.write_to(&mut framed).unwrap();
        prop_assert_eq!(Signature::read_from(framed.as_slice()).unwrap(), signature);
    }

    #[test]
    fn prop_delta_never_references_missing_blocks(
        base in proptest::collection::vec(any::<u8>(), 0..1024),
        target in proptest::collection::vec(any::<u8>(), 0..1024),
        block_length in 1usize..=32
    ) {
        let config = SyncConfig::new(block_length, StrongAlgorithm::Md4);
        let signature = Signature::generate(&base, &config).unwrap();
        let index = SignatureIndex::build(&signature);
        let delta = matcher::find_delta(&target, &index);
        for op in delta.ops() {
            if let DeltaOp::Copy { index } = op {
                prop_assert!((*index as usize) < signature.block_count());
            }
        }
    }
}
