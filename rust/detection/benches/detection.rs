// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Benchmark block detection on synthetic venue grids.
//!
//! Each grid is a lattice of 3x4 blocks: a 2x2 label merge, two stall
//! numbers and a thick outline, separated by one-cell aisles.
//!
//! Run with: cargo bench -p venuemap-detection --bench detection

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use venuemap_core::{build_venue_map, GridPos, GridRect, RawSheet, RawValue, VenueMap};
use venuemap_detection::{detect_blocks, DetectionConfig};

const LABELS: [&str; 6] = ["A", "B", "C", "D", "E", "F"];

/// Build a `side` x `side` lattice of blocks.
fn generate_venue(side: u32) -> VenueMap {
    let mut sheet = RawSheet::new("1日目");
    for by in 0..side {
        for bx in 0..side {
            let top = 2 + by * 4;
            let left = 2 + bx * 5;
            let label = LABELS[((by * side + bx) % LABELS.len() as u32) as usize];
            sheet
                .set_value(GridPos::new(top, left), RawValue::Text(label.into()))
                .merge(GridRect::spanning(
                    GridPos::new(top, left),
                    GridPos::new(top + 1, left + 1),
                ))
                .set_value(GridPos::new(top, left + 2), RawValue::Number(1.0))
                .set_value(GridPos::new(top + 1, left + 2), RawValue::Number(2.0))
                .outline(
                    GridRect::spanning(GridPos::new(top, left), GridPos::new(top + 2, left + 3)),
                    "thick",
                );
        }
    }
    build_venue_map(&sheet).expect("synthetic sheet has a range")
}

fn bench_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect_blocks");
    let config = DetectionConfig::default();

    for side in [4u32, 12, 24] {
        let map = generate_venue(side);
        group.throughput(Throughput::Elements(map.cell_count() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(side * side), &map, |b, map| {
            b.iter(|| detect_blocks(black_box(map), &config))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_detection);
criterion_main!(benches);
