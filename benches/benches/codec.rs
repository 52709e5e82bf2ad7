//! Benchmark suite for the LZSS and sprite codecs and STK archive access
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml
//!
//! For flamegraph profiling:
//! cargo bench --manifest-path benches/Cargo.toml -- --profile-time=5

use std::{hint::black_box, io::Cursor};

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use gob_benches::{generate_script, generate_sprite_pixels, generate_v1_archive, sizes};
use gob_types::file::{lzss, sprite, stk};

/// Benchmark LZSS decompression of script-like data
fn bench_lzss_decompress(c: &mut Criterion) {
	let mut group = c.benchmark_group("lzss_decompress");

	for (name, len) in [("script", sizes::SCRIPT), ("large", sizes::LARGE_MEMBER)] {
		let packed = lzss::compress(&generate_script(len)).unwrap();
		group.throughput(Throughput::Bytes(len as u64));
		group.bench_with_input(BenchmarkId::new("prefixed", name), &packed, |b, packed| {
			b.iter(|| black_box(lzss::decompress_prefixed(black_box(packed))));
		});
	}

	group.finish();
}

/// Benchmark LZSS compression, with and without output verification
fn bench_lzss_compress(c: &mut Criterion) {
	let mut group = c.benchmark_group("lzss_compress");
	let text = generate_script(sizes::SCRIPT);

	group.throughput(Throughput::Bytes(text.len() as u64));
	group.bench_function("compress", |b| {
		b.iter(|| black_box(lzss::compress_with(black_box(&text), false)));
	});
	group.bench_function("compress_verified", |b| {
		b.iter(|| black_box(lzss::compress_with(black_box(&text), true)));
	});

	group.finish();
}

/// Benchmark sprite decoding for both encodings
fn bench_sprite_decode(c: &mut Criterion) {
	let mut group = c.benchmark_group("sprite_decode");

	for (name, (width, height)) in [("small", sizes::SMALL_SPRITE), ("screen", sizes::SCREEN)] {
		let pixels = generate_sprite_pixels(width, height, 16, 40);
		let rle = sprite::encode_run_length(&pixels).unwrap();
		let packed = sprite::encode_lzss(&pixels).unwrap();

		group.throughput(Throughput::Elements(pixels.len() as u64));
		group.bench_with_input(BenchmarkId::new("rle", name), &rle, |b, blob| {
			b.iter(|| black_box(sprite::decode(black_box(blob), width, height)));
		});
		group.bench_with_input(BenchmarkId::new("lzss", name), &packed, |b, blob| {
			b.iter(|| black_box(sprite::decode(black_box(blob), width, height)));
		});
	}

	group.finish();
}

/// Benchmark the run-length encoder
fn bench_sprite_encode(c: &mut Criterion) {
	let mut group = c.benchmark_group("sprite_encode");
	let (width, height) = sizes::SCREEN;
	let pixels = generate_sprite_pixels(width, height, 16, 400);

	group.throughput(Throughput::Elements(pixels.len() as u64));
	group.bench_function("rle_screen", |b| {
		b.iter(|| black_box(sprite::encode_run_length(black_box(&pixels))));
	});

	group.finish();
}

/// Full archive workloads: index parsing, reading every member, rebuilding
fn bench_archive(c: &mut Criterion) {
	let mut group = c.benchmark_group("stk_archive");
	let data = generate_v1_archive(32, 4096);

	group.throughput(Throughput::Bytes(data.len() as u64));
	group.bench_function("open", |b| {
		b.iter(|| black_box(stk::File::from_reader(Cursor::new(black_box(&data)))));
	});

	group.bench_function("read_all", |b| {
		let mut archive = stk::File::from_reader(Cursor::new(&data)).unwrap();
		let names = archive.list();
		b.iter(|| {
			for name in &names {
				black_box(archive.read(name).unwrap());
			}
		});
	});

	group.sample_size(20);
	group.bench_function("rebuild_one_changed", |b| {
		let mut archive = stk::File::from_reader(Cursor::new(&data)).unwrap();
		let mut replacements = stk::Replacements::new();
		replacements.insert("SCENE007.TOT".to_string(), generate_script(5000));
		let options = stk::RebuildOptions::default();
		b.iter(|| black_box(archive.rebuild(&replacements, &options)));
	});

	group.finish();
}

criterion_group!(
	benches,
	bench_lzss_decompress,
	bench_lzss_compress,
	bench_sprite_decode,
	bench_sprite_encode,
	bench_archive,
);

criterion_main!(benches);
