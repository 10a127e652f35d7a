//! Benchmark suite for local telemetry provider collection.
//!
//! Run with: `cargo bench -p telemetry-platform`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use telemetry_platform::{new_local_platform, Platform};

fn bench_cpu_usage(c: &mut Criterion) {
    let platform = new_local_platform();
    c.bench_function("cpu_usage", |b| {
        b.iter(|| black_box(platform.cpu().usage()).ok())
    });
}

fn bench_cpu_total_usage(c: &mut Criterion) {
    let platform = new_local_platform();
    c.bench_function("cpu_total_usage", |b| {
        b.iter(|| black_box(platform.cpu().total_usage()).ok())
    });
}

fn bench_cpu_info(c: &mut Criterion) {
    let platform = new_local_platform();
    c.bench_function("cpu_info", |b| {
        b.iter(|| black_box(platform.cpu().info()).ok())
    });
}

fn bench_memory_stats(c: &mut Criterion) {
    let platform = new_local_platform();
    c.bench_function("memory_stats", |b| {
        b.iter(|| black_box(platform.memory().stats()).ok())
    });
}

fn bench_memory_swap_stats(c: &mut Criterion) {
    let platform = new_local_platform();
    c.bench_function("memory_swap_stats", |b| {
        b.iter(|| black_box(platform.memory().swap_stats()).ok())
    });
}

fn bench_network_interfaces(c: &mut Criterion) {
    let platform = new_local_platform();
    c.bench_function("network_interfaces", |b| {
        b.iter(|| black_box(platform.network().interfaces()).ok())
    });
}

fn bench_network_all_stats(c: &mut Criterion) {
    let platform = new_local_platform();
    c.bench_function("network_all_stats", |b| {
        b.iter(|| black_box(platform.network().all_stats()).ok())
    });
}

fn bench_filesystem_mounts(c: &mut Criterion) {
    let platform = new_local_platform();
    c.bench_function("filesystem_mounts", |b| {
        b.iter(|| black_box(platform.filesystem().mounts()).ok())
    });
}

fn bench_filesystem_stats_root(c: &mut Criterion) {
    let platform = new_local_platform();
    c.bench_function("filesystem_stats_root", |b| {
        b.iter(|| black_box(platform.filesystem().stats("/")).ok())
    });
}

fn bench_sensors_temperatures(c: &mut Criterion) {
    let platform = new_local_platform();
    let Some(sensors) = platform.sensors() else {
        return;
    };
    c.bench_function("sensors_temperatures", |b| {
        b.iter(|| black_box(sensors.temperatures()).ok())
    });
}

criterion_group!(
    cpu_benches,
    bench_cpu_usage,
    bench_cpu_total_usage,
    bench_cpu_info,
);

criterion_group!(memory_benches, bench_memory_stats, bench_memory_swap_stats,);

criterion_group!(
    network_benches,
    bench_network_interfaces,
    bench_network_all_stats,
);

criterion_group!(
    filesystem_benches,
    bench_filesystem_mounts,
    bench_filesystem_stats_root,
);

criterion_group!(sensor_benches, bench_sensors_temperatures);

criterion_main!(
    cpu_benches,
    memory_benches,
    network_benches,
    filesystem_benches,
    sensor_benches,
);
