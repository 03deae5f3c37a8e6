//! Property tests for derivation, across several hash functions.

use blake2::Blake2b512;
use hdsk_crypto::{
    child, fingerprint, lineage, master, node, HashFunction, Path, Schema, FINGERPRINT_SIZE,
};
use proptest::prelude::*;
use sha2::{Sha256, Sha512};
use sha3::Sha3_256;

fn arb_secret() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..=64)
}

fn arb_indices() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(any::<u32>(), 1..=6)
}

fn check_determinism<D: HashFunction>(secret: &[u8]) -> Result<(), TestCaseError> {
    let a = master::<D>(secret).unwrap();
    let b = master::<D>(secret).unwrap();
    prop_assert_eq!(a.key(), b.key());
    prop_assert_eq!(a.chain_code(), b.chain_code());
    prop_assert_eq!(a.fingerprint(), b.fingerprint());
    prop_assert_eq!(a.depth(), 0);
    Ok(())
}

fn check_lineage<D: HashFunction>(secret: &[u8], index: u32) -> Result<(), TestCaseError> {
    let parent = master::<D>(secret).unwrap();
    let kid = child::<D>(&parent, index).unwrap();
    prop_assert_eq!(kid.depth(), parent.depth() + 1);
    prop_assert!(lineage::<D>(&kid, &parent).unwrap());
    Ok(())
}

proptest! {
    #[test]
    fn master_is_deterministic(secret in arb_secret()) {
        check_determinism::<Sha256>(&secret)?;
        check_determinism::<Sha512>(&secret)?;
        check_determinism::<Sha3_256>(&secret)?;
        check_determinism::<Blake2b512>(&secret)?;
    }

    #[test]
    fn child_lineage_is_sound(secret in arb_secret(), index in any::<u32>()) {
        check_lineage::<Sha256>(&secret, index)?;
        check_lineage::<Sha3_256>(&secret, index)?;
        check_lineage::<Blake2b512>(&secret, index)?;
    }

    #[test]
    fn lineage_rejects_other_parent(
        secret_a in arb_secret(),
        secret_b in arb_secret(),
        index in any::<u32>(),
    ) {
        prop_assume!(secret_a != secret_b);
        let parent = master::<Sha256>(&secret_a).unwrap();
        let other = master::<Sha256>(&secret_b).unwrap();
        let kid = child::<Sha256>(&parent, index).unwrap();
        prop_assert!(!lineage::<Sha256>(&kid, &other).unwrap());
    }

    #[test]
    fn depth_tracks_path_length(secret in arb_secret(), indices in arb_indices()) {
        let m = master::<Sha256>(&secret).unwrap();
        let n = node::<Sha256>(&m, &Path::from(indices.clone())).unwrap();
        prop_assert_eq!(n.depth() as usize, indices.len());
    }

    #[test]
    fn node_equals_child_fold(secret in arb_secret(), indices in arb_indices()) {
        let m = master::<Sha256>(&secret).unwrap();
        let via_node = node::<Sha256>(&m, &Path::from(indices.clone())).unwrap();
        let mut folded = m.clone();
        for index in &indices {
            folded = child::<Sha256>(&folded, *index).unwrap();
        }
        prop_assert_eq!(via_node, folded);
    }

    #[test]
    fn parsed_path_node_equals_fold(
        secret in arb_secret(),
        app in "[a-z][a-z-]{0,11}",
        purpose in 0u32..1000,
        index in any::<u32>(),
    ) {
        let schema = Schema::parse("m / application: str / purpose: any / index: num").unwrap();
        let path_str = format!("m/{app}/{purpose}/{index}");
        let path = schema.parse_path::<Sha256>(&path_str).unwrap();

        let m = master::<Sha256>(&secret).unwrap();
        let via_node = node::<Sha256>(&m, &path).unwrap();
        let mut folded = m.clone();
        for resolved in path.indices() {
            folded = child::<Sha256>(&folded, *resolved).unwrap();
        }
        prop_assert_eq!(via_node, folded);
        prop_assert_eq!(path.indices()[1], purpose);
        prop_assert_eq!(path.indices()[2], index);
        prop_assert!(path.indices()[0] < (1 << 31));
    }

    #[test]
    fn fingerprint_is_always_16_bytes(
        parent in prop::collection::vec(any::<u8>(), 0..=256),
        kid in prop::collection::vec(any::<u8>(), 0..=256),
    ) {
        prop_assert_eq!(fingerprint::<Sha256>(&parent, &kid).unwrap().len(), FINGERPRINT_SIZE);
        prop_assert_eq!(fingerprint::<Blake2b512>(&parent, &kid).unwrap().len(), FINGERPRINT_SIZE);
    }
}
