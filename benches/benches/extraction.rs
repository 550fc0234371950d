// Copyright 2025 the Placemark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use placemark_index::{ExtractOptions, FeatureIndex};
use placemark_tree::{Coordinate, Document, MarkupNode, kml};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
    fn coord(&mut self) -> Coordinate {
        Coordinate::new(self.next_f64() * 360.0 - 180.0, self.next_f64() * 180.0 - 90.0)
    }
}

/// `folders` folders of `per_folder` placemarks; every third placemark holds a
/// multi-geometry of a polygon and two points.
fn gen_document(folders: usize, per_folder: usize, seed: u64) -> Document {
    let mut rng = Rng::new(seed);
    let mut doc = Document::new();
    let kml = doc.insert(None, MarkupNode::other("kml"));
    let root = doc.insert(Some(kml), MarkupNode::document());
    for _ in 0..folders {
        let folder = doc.insert(Some(root), MarkupNode::folder());
        for i in 0..per_folder {
            let pm = doc.insert(Some(folder), MarkupNode::placemark(Some("#style")));
            if i % 3 == 0 {
                let multi = doc.insert(Some(pm), MarkupNode::multi_geometry());
                let c = rng.coord();
                let ring = vec![
                    c,
                    Coordinate::new(c.longitude + 0.1, c.latitude),
                    Coordinate::new(c.longitude + 0.1, c.latitude + 0.1),
                    c,
                ];
                let _ = doc.insert(Some(multi), MarkupNode::polygon(ring, Vec::new()));
                for _ in 0..2 {
                    let p = rng.coord();
                    let _ = doc.insert(Some(multi), MarkupNode::point(p.longitude, p.latitude));
                }
            } else {
                let p = rng.coord();
                let _ = doc.insert(Some(pm), MarkupNode::point(p.longitude, p.latitude));
            }
        }
    }
    doc
}

fn gen_kml(placemarks: usize, seed: u64) -> String {
    let mut rng = Rng::new(seed);
    let mut out = String::from(
        "<kml xmlns=\"http://www.opengis.net/kml/2.2\"><Document>\
         <Style id=\"s\"><LineStyle><color>ff0000ff</color><width>2</width></LineStyle></Style>",
    );
    for _ in 0..placemarks {
        let (a, b) = (rng.coord(), rng.coord());
        out.push_str(&format!(
            "<Placemark><styleUrl>#s</styleUrl><LineString><coordinates>{},{} {},{}</coordinates></LineString></Placemark>",
            a.longitude, a.latitude, b.longitude, b.latitude
        ));
    }
    out.push_str("</Document></kml>");
    out
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    let options = ExtractOptions::default();
    for &n in &[16usize, 64, 256] {
        let doc = gen_document(n, 16, 0x5eed);
        group.throughput(Throughput::Elements((n * 16) as u64));
        group.bench_function(format!("index_folders{}", n), |b| {
            b.iter_batched(
                || doc.clone(),
                |doc| {
                    let index = FeatureIndex::build(doc, &options).unwrap();
                    black_box(index.geometry_count());
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("read");
    for &n in &[256usize, 4096] {
        let xml = gen_kml(n, 0xabcd);
        group.throughput(Throughput::Bytes(xml.len() as u64));
        group.bench_function(format!("kml_placemarks{}", n), |b| {
            b.iter(|| {
                let doc = kml::read_str(black_box(&xml)).unwrap();
                black_box(doc.len());
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_read);
criterion_main!(benches);
