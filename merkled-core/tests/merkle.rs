use merkled_core::digest::Digest;
use merkled_core::merkle::{build_root, MerkleTree, OddLeafPolicy, ODD_LEAF_POLICY};
use merkled_core::SealError;
use proptest::prelude::*;

fn leaves(n: usize) -> Vec<Digest> {
    (0..n).map(|i| Digest::of(format!("leaf-{i}").as_bytes())).collect()
}

#[test]
fn empty_input_is_an_error() {
    assert!(matches!(build_root(&[]), Err(SealError::EmptyInput)));
}

#[test]
fn single_leaf_is_its_own_root() {
    let l = leaves(1);
    assert_eq!(build_root(&l).unwrap(), l[0]);
    assert_eq!(MerkleTree::build(&l).unwrap().depth(), 0);
}

#[test]
fn two_leaves_hash_the_sorted_concatenation() {
    let a = Digest::of(b"a");
    let b = Digest::of(b"b");
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    let mut cat = lo.as_bytes().to_vec();
    cat.extend_from_slice(hi.as_bytes());
    assert_eq!(build_root(&[a, b]).unwrap(), Digest::of(&cat));
    assert_eq!(build_root(&[b, a]).unwrap(), Digest::of(&cat));
}

#[test]
fn odd_leaf_is_promoted_unchanged() {
    assert_eq!(ODD_LEAF_POLICY, OddLeafPolicy::Promote);
    let l = leaves(3);
    let expected = Digest::combine(&Digest::combine(&l[0], &l[1]), &l[2]);
    assert_eq!(build_root(&l).unwrap(), expected);

    let tree = MerkleTree::build(&l).unwrap();
    assert_eq!(tree.levels()[1], vec![Digest::combine(&l[0], &l[1]), l[2]]);
    assert_eq!(tree.depth(), 2);
    assert_eq!(tree.leaf_count(), 3);
}

#[test]
fn duplicate_policy_gives_a_different_root() {
    let l = leaves(3);
    let dup = MerkleTree::build_with(&l, OddLeafPolicy::Duplicate).unwrap().root();
    let expected =
        Digest::combine(&Digest::combine(&l[0], &l[1]), &Digest::combine(&l[2], &l[2]));
    assert_eq!(dup, expected);
    assert_ne!(dup, build_root(&l).unwrap());
}

#[test]
fn five_leaves_promote_across_two_levels() {
    let l = leaves(5);
    let ab = Digest::combine(&l[0], &l[1]);
    let cd = Digest::combine(&l[2], &l[3]);
    let expected = Digest::combine(&Digest::combine(&ab, &cd), &l[4]);
    assert_eq!(build_root(&l).unwrap(), expected);
}

#[test]
fn root_depends_on_leaf_order() {
    let l = leaves(3);
    let rotated = vec![l[2], l[0], l[1]];
    assert_ne!(build_root(&l).unwrap(), build_root(&rotated).unwrap());
}

proptest! {
    #[test]
    fn root_is_deterministic(n in 1usize..64) {
        let l = leaves(n);
        prop_assert_eq!(build_root(&l).unwrap(), build_root(&l.clone()).unwrap());
    }

    #[test]
    fn swapping_a_sibling_pair_keeps_the_root(n in 2usize..64, pick in 0usize..32) {
        let l = leaves(n);
        let pairs = n / 2;
        let p = pick % pairs;
        let mut swapped = l.clone();
        swapped.swap(2 * p, 2 * p + 1);
        prop_assert_eq!(build_root(&l).unwrap(), build_root(&swapped).unwrap());
    }

    #[test]
    fn level_sizes_halve_rounding_up(n in 1usize..200) {
        let tree = MerkleTree::build(&leaves(n)).unwrap();
        for w in tree.levels().windows(2) {
            prop_assert_eq!(w[1].len(), w[0].len().div_ceil(2));
        }
        prop_assert_eq!(tree.levels().last().unwrap().len(), 1);
    }
}
