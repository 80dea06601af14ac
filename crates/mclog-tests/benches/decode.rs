use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use mclog_decoder::{LogDecoder, decode_log};
use mclog_tests::{RECORD_BYTES, motor_header, motor_log};
use mclog_wire::bits::BitReader;

fn bench_decode_small(c: &mut Criterion) {
    let log = motor_log(100);

    c.bench_function("decode_small", |b| {
        b.iter(|| decode_log(log.as_slice()).unwrap());
    });
}

fn bench_decode_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_throughput");

    for records in [1_000, 10_000, 100_000] {
        let log = motor_log(records);

        group.throughput(Throughput::Bytes(log.len() as u64));
        group.bench_with_input(BenchmarkId::new("stream", records), &log, |b, log| {
            b.iter(|| {
                let mut decoder = LogDecoder::open(log.as_slice()).unwrap();
                for event in decoder.by_ref() {
                    event.unwrap();
                }
                decoder.summary()
            });
        });
    }

    group.finish();
}

fn bench_decode_noisy(c: &mut Criterion) {
    let clean = motor_log(10_000);
    let mut noisy = clean.clone();
    let header = motor_header().len();
    for n in (0..10_000).step_by(50) {
        noisy[header + n * RECORD_BYTES + 5] ^= 0x40;
    }

    let mut group = c.benchmark_group("decode_resync");
    group.throughput(Throughput::Bytes(clean.len() as u64));

    group.bench_function("clean", |b| {
        b.iter(|| decode_log(clean.as_slice()).unwrap());
    });
    group.bench_function("every_50th_corrupt", |b| {
        b.iter(|| decode_log(noisy.as_slice()).unwrap());
    });

    group.finish();
}

fn bench_bit_reader(c: &mut Criterion) {
    let record: Vec<u8> = (0..RECORD_BYTES as u8).collect();
    let widths = [16, 12, 12, 12, 12, 16, 16, 16, 8, 8, 8];

    c.bench_function("bit_reader_record", |b| {
        b.iter(|| {
            let mut reader = BitReader::new(&record);
            let mut sum = 0u64;
            for width in widths {
                sum += u64::from(reader.read(width).unwrap());
            }
            sum
        });
    });
}

criterion_group!(
    benches,
    bench_decode_small,
    bench_decode_throughput,
    bench_decode_noisy,
    bench_bit_reader
);
criterion_main!(benches);
