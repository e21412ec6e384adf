use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mosaic_editor::{tree, Block};
use mosaic_model::IdGenerator;

/// Wide, shallow page: `groups` root containers with `per_group` leaves each
fn build_page(groups: usize, per_group: usize) -> Vec<Block> {
    (0..groups)
        .map(|g| {
            let group_id = format!("group-{}", g);
            let mut group = Block::container(group_id.clone(), "core/group");
            for i in 0..per_group {
                let mut child = Block::leaf(format!("{}-b{}", group_id, i), "core/paragraph");
                child.parent_id = Some(group_id.clone());
                group.children.push(child);
            }
            group
        })
        .collect()
}

fn bench_move_within_container(c: &mut Criterion) {
    c.bench_function("move_within_container_20x25", |b| {
        b.iter_batched(
            || build_page(20, 25),
            |mut page| {
                tree::move_block(
                    black_box(&mut page),
                    Some("group-10"),
                    0,
                    Some("group-10"),
                    20,
                );
                page
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_move_across_containers(c: &mut Criterion) {
    c.bench_function("move_across_containers_20x25", |b| {
        b.iter_batched(
            || build_page(20, 25),
            |mut page| {
                tree::move_block(black_box(&mut page), Some("group-0"), 0, Some("group-19"), 0);
                page
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_duplicate_deep(c: &mut Criterion) {
    c.bench_function("duplicate_group_of_25", |b| {
        b.iter_batched(
            || (build_page(20, 25), IdGenerator::from_seed("bench".to_string())),
            |(mut page, mut ids)| {
                tree::duplicate_block_deep(black_box(&mut page), "group-10", &mut ids);
                page
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_find_deep(c: &mut Criterion) {
    let page = build_page(20, 25);
    c.bench_function("find_last_block_20x25", |b| {
        b.iter(|| tree::find(black_box(&page), "group-19-b24"))
    });
}

criterion_group!(
    benches,
    bench_move_within_container,
    bench_move_across_containers,
    bench_duplicate_deep,
    bench_find_deep
);
criterion_main!(benches);
