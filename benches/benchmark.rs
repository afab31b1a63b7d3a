use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use nhxtree::distance::{DuplicateLabelPolicy, distance_matrix_par, distance_matrix_with};
use nhxtree::layout::{LayoutOptions, layout};
use nhxtree::{parse_newick_str, parse_nhx_str, parse_phylip_str};
use std::hint::black_box;

const REGRESSION_SIZES: &[usize] = &[64, 512];
const REPORTING_SIZES: &[usize] = &[2048];

/// Balanced tree over leaves `lo..hi`, optionally with NHX blocks on every leaf.
fn balanced_newick(lo: usize, hi: usize, nhx: bool, out: &mut String) {
    if hi - lo == 1 {
        out.push_str(&format!("Taxon_{lo}:0.{:03}", lo % 997 + 1));
        if nhx {
            out.push_str(&format!("[&&NHX:S=species_{}:D=N]", lo % 17));
        }
        return;
    }
    let mid = lo + (hi - lo) / 2;
    out.push('(');
    balanced_newick(lo, mid, nhx, out);
    out.push(',');
    balanced_newick(mid, hi, nhx, out);
    out.push_str(&format!("):{}.5", (hi - lo) % 7));
}

fn generate(num_leaves: usize, nhx: bool) -> String {
    let mut newick = String::with_capacity(num_leaves * 40);
    balanced_newick(0, num_leaves, nhx, &mut newick);
    newick.push(';');
    newick
}

fn parsing(c: &mut Criterion, sizes: &[usize]) {
    let mut group = c.benchmark_group("parse");
    for &n in sizes {
        let plain = generate(n, false);
        let nhx = generate(n, true);
        group.bench_with_input(BenchmarkId::new("newick", n), &plain, |b, s| {
            b.iter(|| parse_newick_str(black_box(s)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("nhx", n), &nhx, |b, s| {
            b.iter(|| parse_nhx_str(black_box(s)).unwrap());
        });
    }
    group.finish();
}

fn distances(c: &mut Criterion, sizes: &[usize]) {
    let mut group = c.benchmark_group("distance_matrix");
    for &n in sizes {
        let tree = parse_newick_str(generate(n, false)).unwrap();
        group.bench_with_input(BenchmarkId::new("sequential", n), &tree, |b, t| {
            b.iter(|| distance_matrix_with(black_box(t), DuplicateLabelPolicy::LastWins).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("parallel", n), &tree, |b, t| {
            b.iter(|| distance_matrix_par(black_box(t), DuplicateLabelPolicy::LastWins).unwrap());
        });
    }
    group.finish();
}

fn layout_and_phylip(c: &mut Criterion, sizes: &[usize]) {
    let options = LayoutOptions::default();
    for &n in sizes {
        let tree = parse_newick_str(generate(n, false)).unwrap();
        c.bench_function(&format!("layout/{n}"), |b| {
            b.iter(|| layout(black_box(&tree), &options).unwrap());
        });

        let text = distance_matrix_with(&tree, DuplicateLabelPolicy::LastWins).unwrap().to_phylip();
        c.bench_function(&format!("phylip/{n}"), |b| {
            b.iter(|| parse_phylip_str(black_box(&text)).unwrap());
        });
    }
}

fn regression_suite(c: &mut Criterion) {
    parsing(c, REGRESSION_SIZES);
    distances(c, REGRESSION_SIZES);
    layout_and_phylip(c, REGRESSION_SIZES);
}

fn reporting_suite(c: &mut Criterion) {
    parsing(c, REPORTING_SIZES);
    distances(c, REPORTING_SIZES);
}

criterion_group!(regression, regression_suite);
criterion_group! {
    name = reporting;
    config = Criterion::default().sample_size(10);
    targets = reporting_suite
}
criterion_main!(regression, reporting);
