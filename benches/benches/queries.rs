// Copyright 2025 the Placemark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use geo::{Geometry, LineString, Polygon};
use placemark_index::{Envelope, ExtractOptions, FeatureIndex};
use placemark_tree::{Document, MarkupNode};

/// An `n`×`n` grid of placemarks, alternating points and unit squares.
fn gen_grid_index(n: usize) -> FeatureIndex {
    let mut doc = Document::new();
    let root = doc.insert(None, MarkupNode::document());
    for y in 0..n {
        for x in 0..n {
            let (x0, y0) = (x as f64, y as f64);
            let pm = doc.insert(Some(root), MarkupNode::placemark(None));
            if (x + y) % 2 == 0 {
                let _ = doc.insert(Some(pm), MarkupNode::point(x0 + 0.5, y0 + 0.5));
            } else {
                let ring = [(x0, y0), (x0 + 1.0, y0), (x0 + 1.0, y0 + 1.0), (x0, y0)]
                    .into_iter()
                    .map(|(x, y)| placemark_tree::Coordinate::new(x, y))
                    .collect();
                let _ = doc.insert(Some(pm), MarkupNode::polygon(ring, Vec::new()));
            }
        }
    }
    FeatureIndex::build(doc, &ExtractOptions::default()).unwrap()
}

fn bench_view(c: &mut Criterion) {
    let mut group = c.benchmark_group("view");
    for &n in &[32usize, 128] {
        let index = gen_grid_index(n);
        let half = n as f64 / 2.0;
        let view = Envelope::new(half - 4.0, half - 4.0, half + 4.0, half + 4.0);
        group.bench_function(format!("ids_in_view_n{}", n), |b| {
            b.iter(|| black_box(index.ids_in_view(black_box(&view)).len()))
        });
        group.bench_function(format!("extent_n{}", n), |b| {
            b.iter(|| black_box(index.extent()))
        });
    }
    group.finish();
}

fn bench_intersect(c: &mut Criterion) {
    let mut group = c.benchmark_group("intersect");
    let index = gen_grid_index(128);
    let diamond: Geometry<f64> = Polygon::new(
        LineString::from(vec![(64.0, 40.0), (88.0, 64.0), (64.0, 88.0), (40.0, 64.0)]),
        vec![],
    )
    .into();
    group.bench_function("diamond_n128", |b| {
        b.iter(|| black_box(index.intersect(black_box(&diamond)).len()))
    });
    group.bench_function("by_id_n128", |b| {
        b.iter(|| black_box(index.by_id(black_box("8000")).is_some()))
    });
    group.finish();
}

criterion_group!(benches, bench_view, bench_intersect);
criterion_main!(benches);
