use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use wavix::bit_vector::Rank9SelIndex;
use wavix::WaveletMatrix;

fn bench_wavelet_matrix(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    let n = 1 << 16;
    let sigma = 256usize;
    let seq: Vec<usize> = (0..n).map(|_| rng.gen_range(0..sigma)).collect();
    let wm = WaveletMatrix::<Rank9SelIndex>::from_ints(seq.iter().copied()).unwrap();

    let mut group = c.benchmark_group("wavelet_matrix");

    group.bench_function("access", |b| {
        b.iter(|| {
            for pos in 0..n {
                black_box(wm.access(pos));
            }
        })
    });

    group.bench_function("rank", |b| {
        b.iter(|| {
            for pos in 0..n {
                black_box(wm.rank(pos, pos % sigma));
            }
        })
    });

    group.bench_function("select", |b| {
        b.iter(|| {
            for val in 0..sigma {
                let freq = wm.freq(val);
                for k in (0..freq).step_by(8) {
                    black_box(wm.select(k, val));
                }
            }
        })
    });

    group.bench_function("quantile", |b| {
        b.iter(|| {
            for beg in (0..n - 64).step_by(64) {
                black_box(wm.quantile(beg..beg + 64, 32));
            }
        })
    });

    group.bench_function("list_mode", |b| {
        b.iter(|| {
            for beg in (0..n - 1024).step_by(1024) {
                black_box(wm.list_mode_range(0..sigma, beg..beg + 1024, 4));
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_wavelet_matrix);
criterion_main!(benches);
