use hdsk_crypto::{child, lineage, master, node, Path, Schema, DEFAULT_PATH, DEFAULT_SCHEMA};
use sha2::{Sha256, Sha512};

#[divan::bench]
fn master_sha256(bencher: divan::Bencher) {
    let secret = [0u8; 32];
    bencher.bench(|| master::<Sha256>(divan::black_box(&secret)).unwrap());
}

#[divan::bench]
fn master_sha512(bencher: divan::Bencher) {
    let secret = [0u8; 32];
    bencher.bench(|| master::<Sha512>(divan::black_box(&secret)).unwrap());
}

#[divan::bench]
fn child_sha256(bencher: divan::Bencher) {
    let parent = master::<Sha256>(&[0u8; 32]).unwrap();
    bencher.bench(|| child::<Sha256>(divan::black_box(&parent), 42).unwrap());
}

#[divan::bench(args = [1, 4, 16, 64])]
fn node_sha256(bencher: divan::Bencher, depth: u32) {
    let m = master::<Sha256>(&[0u8; 32]).unwrap();
    let path = Path::from((0..depth).collect::<Vec<_>>());
    bencher.bench(|| node::<Sha256>(divan::black_box(&m), divan::black_box(&path)).unwrap());
}

#[divan::bench]
fn parse_default_path(bencher: divan::Bencher) {
    let schema = Schema::parse(DEFAULT_SCHEMA).unwrap();
    bencher.bench(|| schema.parse_path::<Sha256>(divan::black_box(DEFAULT_PATH)).unwrap());
}

#[divan::bench]
fn lineage_sha256(bencher: divan::Bencher) {
    let parent = master::<Sha256>(&[0u8; 32]).unwrap();
    let kid = child::<Sha256>(&parent, 42).unwrap();
    bencher.bench(|| lineage::<Sha256>(divan::black_box(&kid), divan::black_box(&parent)).unwrap());
}

fn main() {
    divan::main();
}
