use criterion::{criterion_group, criterion_main, Criterion};
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use scission_networks::{loader, molecule::Molecule, scission::recursive_scissions};

pub fn seed_networks(c: &mut Criterion) {
    // Define a new criterion benchmark group of seed-network benchmarks.
    let mut group = c.benchmark_group("seed_networks");

    // Load all seed molecules from the reference dataset.
    let paths = fs::read_dir(Path::new("data").join("seeds")).unwrap();
    let mut seeds: Vec<(String, Molecule)> = Vec::new();
    for path in paths {
        let name = path.unwrap().path();
        if name.extension().and_then(OsStr::to_str) != Some("json") {
            continue;
        }
        let molecule = loader::parse(&name).expect(&format!("Failed to parse {name:?}"));
        seeds.push((
            name.file_stem().unwrap().to_string_lossy().into_owned(),
            molecule,
        ));
    }
    seeds.sort_by(|a, b| a.0.cmp(&b.0));

    // Benchmark the full recursive enumeration of each seed individually.
    for (name, molecule) in &seeds {
        group.bench_function(name.as_str(), |b| {
            b.iter(|| recursive_scissions(std::slice::from_ref(molecule)));
        });
    }

    // And of the whole dataset at once, where subnetworks overlap.
    let all: Vec<Molecule> = seeds.iter().map(|(_, m)| m.clone()).collect();
    group.bench_function("all_seeds", |b| {
        b.iter(|| recursive_scissions(&all));
    });

    group.finish();
}

criterion_group!(benches, seed_networks);
criterion_main!(benches);
