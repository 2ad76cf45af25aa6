//! Benchmark end-to-end decode throughput against a small synthetic image,
//! since no bundled test corpus ships with this crate.
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use jpegrs::Decoder;

/// A 16x16, 4:2:0, 3-component baseline JPEG with one restart-free MCU
/// grid: enough structure to exercise subsampling and color conversion
/// without needing an external test-image corpus.
fn sixteen_by_sixteen_jpeg() -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&[0xFF, 0xD8]);

    // Three quantization tables (Y, Cb, Cr), all-ones, in a single DQT.
    bytes.extend_from_slice(&[0xFF, 0xDB]);
    let dqt_len: u16 = 2 + 3 * 65;
    bytes.extend_from_slice(&dqt_len.to_be_bytes());
    for id in 0..3u8 {
        bytes.push(id);
        bytes.extend(std::iter::repeat(1u8).take(64));
    }

    for class in [0u8, 1u8] {
        bytes.extend_from_slice(&[0xFF, 0xC4]);
        bytes.extend_from_slice(&(20u16).to_be_bytes());
        bytes.push(class << 4);
        bytes.push(1);
        bytes.extend(std::iter::repeat(0u8).take(15));
        bytes.push(0x00);
    }

    bytes.extend_from_slice(&[0xFF, 0xC0]);
    bytes.extend_from_slice(&(17u16).to_be_bytes());
    bytes.push(8);
    bytes.extend_from_slice(&(16u16).to_be_bytes());
    bytes.extend_from_slice(&(16u16).to_be_bytes());
    bytes.push(3);
    bytes.extend_from_slice(&[1, 0x22, 0]); // Y, 2x2
    bytes.extend_from_slice(&[2, 0x11, 1]); // Cb, 1x1
    bytes.extend_from_slice(&[3, 0x11, 2]); // Cr, 1x1

    bytes.extend_from_slice(&[0xFF, 0xDA]);
    bytes.extend_from_slice(&(12u16).to_be_bytes());
    bytes.push(3);
    bytes.extend_from_slice(&[1, 0x00]);
    bytes.extend_from_slice(&[2, 0x00]);
    bytes.extend_from_slice(&[3, 0x00]);
    bytes.extend_from_slice(&[0, 63, 0x00]);

    // 6 data units per MCU (4 Y + 1 Cb + 1 Cr), each an immediate EOB.
    bytes.push(0x00);
    bytes.extend_from_slice(&[0xFF, 0xD9]);
    bytes
}

fn criterion_benchmark(c: &mut Criterion) {
    let data = sixteen_by_sixteen_jpeg();
    c.bench_function("decode 16x16 4:2:0 baseline", |b| {
        b.iter(|| black_box(Decoder::decode_buffer(black_box(&data[..]))))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
