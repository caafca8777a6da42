use criterion::{
	black_box, criterion_group, criterion_main, measurement::WallTime, BenchmarkGroup, BenchmarkId, Criterion,
	SamplingMode,
};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::time::Duration;
use tincture::{Cancellation, EuclideanDistance, PaletteConfig, Pixels, SampleCounts};

/// Synthetic RGBA images: a smooth gradient and a few flat blocks with noise
fn images() -> Vec<(String, u32, u32, Vec<u8>)> {
	let mut images = Vec::new();

	for size in [64, 200, 512] {
		let gradient = (0..size)
			.flat_map(|y| (0..size).map(move |x| (x, y)))
			.flat_map(|(x, y)| {
				#[allow(clippy::cast_possible_truncation)]
				let (r, g) = ((x * 255 / size) as u8, (y * 255 / size) as u8);
				[r, g, 255 - r / 2, 255]
			})
			.collect::<Vec<_>>();

		images.push((format!("gradient {size}x{size}"), size, size, gradient));

		let blocks = (0..size)
			.flat_map(|y| (0..size).map(move |x| (x, y)))
			.flat_map(|(x, y)| {
				let base = match (x * 4 / size, y * 4 / size) {
					(0 | 1, 0 | 1) => [200, 40, 40],
					(_, 0 | 1) => [40, 160, 60],
					(0 | 1, _) => [50, 70, 190],
					_ => [230, 190, 60],
				};
				#[allow(clippy::cast_possible_truncation)]
				let noise = ((x * 31 + y * 17) % 16) as u8;
				[base[0] + noise, base[1] + noise, base[2] + noise, 255]
			})
			.collect::<Vec<_>>();

		images.push((format!("blocks {size}x{size}"), size, size, blocks));
	}

	images
}

fn create_group<'a>(c: &'a mut Criterion, name: &'a str) -> BenchmarkGroup<'a, WallTime> {
	let mut group = c.benchmark_group(name);
	group
		.sample_size(30)
		.noise_threshold(0.05)
		.sampling_mode(SamplingMode::Flat)
		.warm_up_time(Duration::from_millis(500));
	group
}

fn sampling(c: &mut Criterion) {
	let mut group = create_group(c, "sampling");
	let config = PaletteConfig::default();

	for (name, width, height, data) in images() {
		let pixels = Pixels::new(width, height, &data).expect("valid buffer");
		group.bench_with_input(BenchmarkId::from_parameter(&name), &pixels, |b, &pixels| {
			b.iter(|| SampleCounts::from_pixels(pixels, black_box(&config)).expect("valid config"));
		});
	}
}

fn kmeans(c: &mut Criterion) {
	let mut group = create_group(c, "kmeans");

	let counts = images()
		.into_iter()
		.map(|(name, width, height, data)| {
			let pixels = Pixels::new(width, height, &data).expect("valid buffer");
			let counts = SampleCounts::from_pixels(pixels, &PaletteConfig::default().with_sample_stride(1))
				.expect("valid config");
			(name, counts)
		})
		.collect::<Vec<_>>();

	fn bench(name: &str, group: &mut BenchmarkGroup<WallTime>, counts: &[(String, SampleCounts)], k: u8, convergence: f64) {
		for (path, counts) in counts {
			group.bench_with_input(BenchmarkId::new(name, path), &counts, |b, counts| {
				b.iter(|| {
					tincture::kmeans::run::<EuclideanDistance>(
						counts,
						black_box(k),
						black_box(convergence),
						black_box(1024),
						&mut Xoshiro256PlusPlus::seed_from_u64(0),
						&Cancellation::never(),
					)
				});
			});
		}
	}

	group.measurement_time(Duration::from_secs(2));
	bench("default", &mut group, &counts, 12, 1.0);
	bench("low k", &mut group, &counts, 4, 1.0);
	bench("low convergence", &mut group, &counts, 12, 0.1);
}

fn all_steps(c: &mut Criterion) {
	let mut group = create_group(c, "all steps");
	group.measurement_time(Duration::from_secs(4));

	let config = PaletteConfig::default().with_seed(0);
	for (name, width, height, data) in images() {
		let pixels = Pixels::new(width, height, &data).expect("valid buffer");
		group.bench_with_input(BenchmarkId::from_parameter(&name), &pixels, |b, &pixels| {
			b.iter(|| tincture::extract_palette(pixels, black_box(&config)));
		});
	}
}

criterion_group!(benches, sampling, kmeans, all_steps);
criterion_main!(benches);
