use cdtds_miner::fptree::FPTree;
use cdtds_miner::item::Interner;
use cdtds_miner::mining::fpgrowth;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn build_tree(n_transactions: usize, n_items: usize) -> FPTree {
    let mut interner = Interner::new();
    let items: Vec<_> = (0..n_items).map(|i| interner.intern(&format!("item{i}"))).collect();
    let mut tree = FPTree::new();
    for tx in 0..n_transactions {
        let path: Vec<_> = items
            .iter()
            .enumerate()
            .filter(|(i, _)| (tx + i) % 3 == 0)
            .map(|(_, &item)| item)
            .collect();
        if !path.is_empty() {
            tree.insert(&path, 1);
        }
    }
    tree.sort();
    tree
}

fn fpgrowth_benchmark(c: &mut Criterion) {
    let tree = build_tree(2000, 30);
    c.bench_function("fpgrowth_mine_2000x30", |b| {
        b.iter(|| fpgrowth::mine(black_box(&tree), black_box(0.05), black_box(false)))
    });
}

criterion_group!(benches, fpgrowth_benchmark);
criterion_main!(benches);
