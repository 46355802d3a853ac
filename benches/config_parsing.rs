//! Benchmarks for project list parsing.
//!
//! These benchmarks measure parsing `config.yaml` project lists of various
//! sizes, including the URL-to-directory derivation done for every entry.

use build_farm::config;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// A single project relying on every default.
const MINIMAL_CONFIG: &str = r#"
- url: https://github.com/madler/zlib.git
  build: ./configure && make
"#;

/// Projects exercising every optional field.
const FULL_CONFIG: &str = r#"
- url: https://github.com/madler/zlib.git
  build: ./configure && make
  requirements: [autoconf]
- url: git@github.com:curl/curl.git
  dir: curl-src
  build: autoreconf -fi && ./configure && make
  clean: make distclean
  depth: 0
  branch: master
  requirements:
    packages: [libssl-dev, libpsl-dev]
    build-dep: [curl]
- url: https://example.org/project.git
  dir: project
  build: make
"#;

fn generate_large_config(num_projects: usize) -> String {
    let mut config = String::new();
    for i in 0..num_projects {
        config.push_str(&format!(
            "- url: https://github.com/example/repo-{i}.git\n  build: make -j4 target{i}\n  requirements:\n    packages: [lib{i}-dev]\n"
        ));
    }
    config
}

fn bench_config_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("config_parsing");

    group.bench_function("minimal", |b| {
        b.iter(|| config::parse(black_box(MINIMAL_CONFIG)))
    });

    group.bench_function("full", |b| {
        b.iter(|| config::parse(black_box(FULL_CONFIG)))
    });

    group.finish();
}

fn bench_config_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("config_scaling");

    for num_projects in [10, 50, 200] {
        let config = generate_large_config(num_projects);
        group.bench_with_input(
            BenchmarkId::new("projects", num_projects),
            &config,
            |b, config| b.iter(|| config::parse(black_box(config))),
        );
    }

    group.finish();
}

fn bench_dirname_from_url(c: &mut Criterion) {
    let mut group = c.benchmark_group("dirname_from_url");

    for url in [
        "https://github.com/madler/zlib.git",
        "git@github.com:curl/curl.git",
        "https://example.org/project.git",
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(url), url, |b, url| {
            b.iter(|| config::dirname_from_url(black_box(url)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_config_parsing,
    bench_config_scaling,
    bench_dirname_from_url
);
criterion_main!(benches);
