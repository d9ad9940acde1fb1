//! Criterion benchmarks for the throughput-sensitive pieces of this crate:
//! line buffering, SSE parsing, JSON repair/completion, and vector ops.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use llmstream::vector::{cosine_similarity, cosine_similarity_batch_to_vec, dot_product};
use llmstream::{complete_to_string, repair_to_string, LineBuffer, SseParser};

fn bench_line_buffer(c: &mut Criterion) {
    let mut group = c.benchmark_group("line_buffer");

    let payload: Vec<u8> = (0..1000).flat_map(|i| format!("line-{i}\n").into_bytes()).collect();
    group.throughput(Throughput::Bytes(payload.len() as u64));
    group.bench_function("append_and_drain_1000_lines", |b| {
        b.iter(|| {
            let mut buf = LineBuffer::new(4096);
            buf.append(black_box(&payload));
            let mut count = 0;
            while buf.next_line().is_some() {
                count += 1;
            }
            count
        });
    });

    // Worst case for the amortized-compaction design: tiny chunks arriving
    // one byte at a time.
    group.bench_function("byte_at_a_time_ingestion", |b| {
        b.iter(|| {
            let mut buf = LineBuffer::new(256);
            for byte in &payload {
                buf.append(std::slice::from_ref(byte));
                while buf.next_line().is_some() {}
            }
        });
    });

    group.finish();
}

fn bench_sse_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("sse_parser");

    let stream: String = (0..500)
        .map(|i| format!("id: {i}\nevent: delta\ndata: {{\"token\":\"chunk-{i}\"}}\n\n"))
        .collect();
    group.throughput(Throughput::Bytes(stream.len() as u64));

    group.bench_function("ingest_500_events", |b| {
        b.iter(|| {
            let mut parser = SseParser::new();
            let mut count = 0;
            for line in stream.lines() {
                parser.ingest_line(black_box(line.as_bytes()), |_| count += 1);
            }
            count
        });
    });

    group.finish();
}

fn bench_json_repair(c: &mut Criterion) {
    let mut group = c.benchmark_group("json_repair");

    let truncated = r#"{"name":"search","arguments":{"query":"rust async runtimes and streaming parsers","limit":10,"filters":["recent","#;
    group.throughput(Throughput::Bytes(truncated.len() as u64));
    group.bench_function("repair_truncated_tool_call", |b| {
        b.iter(|| repair_to_string(black_box(truncated.as_bytes()), 256));
    });

    let valid = r#"{"status":"ok","items":[1,2,3,4,5,6,7,8,9,10],"meta":{"count":10,"page":1}}"#;
    group.throughput(Throughput::Bytes(valid.len() as u64));
    group.bench_function("passthrough_valid_json", |b| {
        b.iter(|| repair_to_string(black_box(valid.as_bytes()), 256));
    });

    group.finish();
}

fn bench_json_completer(c: &mut Criterion) {
    let mut group = c.benchmark_group("json_completer");

    let partial = r#"{"choices":[{"delta":{"content":"The quick brown fox jumps over the lazy d"#;
    group.throughput(Throughput::Bytes(partial.len() as u64));
    group.bench_function("complete_streaming_delta", |b| {
        b.iter(|| complete_to_string(black_box(partial.as_bytes()), 64));
    });

    group.finish();
}

fn bench_vector_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("vector_ops");

    const DIM: usize = 1536;
    const CORPUS_SIZE: usize = 256;

    let query: Vec<f32> = (0..DIM).map(|i| (i as f32).sin()).collect();
    let other: Vec<f32> = (0..DIM).map(|i| (i as f32).cos()).collect();
    let corpus: Vec<f32> = (0..DIM * CORPUS_SIZE).map(|i| ((i % 97) as f32) / 97.0).collect();

    group.throughput(Throughput::Elements(DIM as u64));
    group.bench_function("dot_product_1536d", |b| {
        b.iter(|| dot_product(black_box(&query), black_box(&other)));
    });
    group.bench_function("cosine_similarity_1536d", |b| {
        b.iter(|| cosine_similarity(black_box(&query), black_box(&other)));
    });

    group.throughput(Throughput::Elements((DIM * CORPUS_SIZE) as u64));
    group.bench_function("cosine_similarity_batch_256x1536", |b| {
        b.iter(|| cosine_similarity_batch_to_vec(black_box(&query), black_box(&corpus), DIM));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_line_buffer,
    bench_sse_parser,
    bench_json_repair,
    bench_json_completer,
    bench_vector_ops,
);
criterion_main!(benches);
