use criterion::{black_box, criterion_group, criterion_main, Criterion};

use std::fs;

use fraghub::io::{BlockDelimiter, BlockLayout, BlockReader};
use fraghub::prelude::*;
use fraghub::scheduler::SchedulerConfig;
use fraghub::{FilterConfig, ReferenceData};

fn library_text(copies: usize) -> String {
    let text = fs::read_to_string("./test/data/small.msp").unwrap();
    let mut buf = String::with_capacity(text.len() * copies);
    for _ in 0..copies {
        buf.push_str(&text);
        buf.push('\n');
    }
    buf
}

fn serial(text: &str) {
    let reference = ReferenceData::builtin();
    let normalizer = Normalizer::new(&reference);
    let report = DeletionReport::new();
    let filters = PeakFilterPipeline::default();
    let kept = BlockReader::new(text.as_bytes(), BlockDelimiter::BlankLine)
        .filter_map(|block| block.ok())
        .filter_map(|block| BlockLayout::MSP.parse_block(&block))
        .map(|raw| normalizer.normalize(raw))
        .filter_map(|record| filters.apply(record, &report))
        .count();
    assert_eq!(kept + report.len(), 3000);
}

fn chunked(pipeline: &SpectrumPipeline, text: &str) {
    let output = pipeline
        .process_text(text, SpectralFormat::MSP, &NoProgress)
        .unwrap();
    assert_eq!(output.records.len() + output.deletions.len(), 3000);
}

fn msp_pipeline(c: &mut Criterion) {
    let text = library_text(1000);
    let pipeline = SpectrumPipeline::new(
        ReferenceData::builtin().into(),
        FilterConfig::default(),
        SchedulerConfig::default(),
    )
    .unwrap();
    let small_chunks = SpectrumPipeline::new(
        ReferenceData::builtin().into(),
        FilterConfig::default(),
        SchedulerConfig {
            chunk_size: Some(64),
            ..Default::default()
        },
    )
    .unwrap();

    c.bench_function("serial_execution", |b| b.iter(|| serial(black_box(&text))));
    c.bench_function("chunked_execution", |b| {
        b.iter(|| chunked(&pipeline, black_box(&text)))
    });
    c.bench_function("chunked_execution_small_chunks", |b| {
        b.iter(|| chunked(&small_chunks, black_box(&text)))
    });
}

criterion_group!(benches, msp_pipeline);
criterion_main!(benches);
