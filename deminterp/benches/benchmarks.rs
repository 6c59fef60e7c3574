use criterion::{criterion_group, criterion_main, Criterion};
use deminterp::{interpolate_line, interpolate_path, InterpOptions};
use demset::{DemSet, GridTransform, MemBlobStore, StoreConfig};
use geo::geometry::Coord;

const DATA_OFFSET: usize = 64;

/// One 200x200 tile of rolling synthetic terrain over an identity
/// grid.
fn rolling_store() -> DemSet {
    let (x0, y0, xn, yn) = (0i32, 0i32, 199i32, 199i32);
    let mut bytes = vec![0u8; DATA_OFFSET];
    for y in y0..=yn {
        for x in x0..=xn {
            let h = 100.0 + 40.0 * (x as f32 / 7.0).sin() * (y as f32 / 11.0).cos();
            bytes.extend_from_slice(&h.to_le_bytes());
        }
    }
    let mut blobs = MemBlobStore::default();
    blobs.insert("rolling.bin", bytes);

    let manifest = format!(
        "path\timage_width\timage_height\timage_x0\timage_y0\timage_xn\timage_yn\tdata_offset\torigin_e\torigin_n\n\
         rolling.bin\t200\t200\t{x0}\t{y0}\t{xn}\t{yn}\t{DATA_OFFSET}\t0.0\t0.0\n"
    );
    let config = StoreConfig {
        cell_size: 100,
        grid: GridTransform {
            origin_e: 0.0,
            origin_n: 0.0,
            step_e: 1.0,
            step_n: 1.0,
        },
        ..StoreConfig::default()
    };
    DemSet::new(manifest.as_bytes(), Box::new(blobs), config).unwrap()
}

fn line_profile(c: &mut Criterion) {
    let mut group = c.benchmark_group("Line Profile");
    let opts = InterpOptions::default();

    let start = Coord { x: 3.7, y: 11.2 };
    let end = Coord { x: 188.4, y: 176.9 };

    let mut set = rolling_store();
    group.bench_function("diagonal", |b| {
        b.iter(|| interpolate_line(&mut set, start, end, &opts).unwrap())
    });
}

fn path_profile(c: &mut Criterion) {
    let mut group = c.benchmark_group("Path Profile");
    let opts = InterpOptions::default();

    let path = [
        Coord { x: 3.7, y: 11.2 },
        Coord { x: 120.0, y: 40.0 },
        Coord { x: 188.4, y: 176.9 },
    ];

    let mut set = rolling_store();
    group.bench_function("two legs, 256 samples", |b| {
        b.iter(|| interpolate_path(&mut set, &path, 256, &opts).unwrap())
    });
}

criterion_group!(benches, line_profile, path_profile);
criterion_main!(benches);
