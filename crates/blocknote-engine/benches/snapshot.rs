use blocknote_engine::editing::{Block, Document, EditSession, policy};
use blocknote_engine::registry::BlockKind;
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn note_with_blocks(count: usize) -> Document {
    let blocks = (0..count)
        .map(|i| {
            let kind = if i % 10 == 0 {
                BlockKind::Heading2
            } else {
                BlockKind::Paragraph
            };
            let content = if i % 7 == 0 {
                String::new()
            } else {
                format!("<b>note</b> text for block {i}")
            };
            Block::with_content(kind, content)
        })
        .collect();
    Document::from_blocks(blocks).unwrap()
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");
    group.sample_size(20);

    for count in [50, 500] {
        let doc = note_with_blocks(count);
        let mut session = EditSession::new();
        session.on_focus(&doc, doc.blocks()[count / 2].id);
        let hovered = Some(doc.blocks()[0].id);

        group.bench_function(format!("derive_{count}_blocks"), |b| {
            b.iter(|| {
                let snap = policy::snapshot(black_box(&doc), &session, hovered);
                black_box(snap);
            });
        });
    }

    group.finish();
}

fn bench_emptiness(c: &mut Criterion) {
    let mut group = c.benchmark_group("emptiness");

    group.bench_function("markup_heavy_content", |b| {
        let content = "<div><b>bold</b> and <i>italic</i> and &nbsp; entities</div>".repeat(8);
        b.iter(|| black_box(policy::text_is_empty(black_box(&content))));
    });

    group.finish();
}

criterion_group!(benches, bench_snapshot, bench_emptiness);
criterion_main!(benches);
