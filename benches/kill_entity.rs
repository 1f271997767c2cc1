use criterion::*;
use sparsec::{Entity, Pool};

#[derive(Debug, Clone, Copy, Default)]
struct Pos {
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, Copy, Default)]
struct Health(i32);

fn populated_pool(entities: usize) -> (Pool, Vec<Entity>) {
    let pool = Pool::new(entities);
    let list: Vec<Entity> = (0..entities)
        .map(|_| {
            let entity = pool.create();
            pool.add_many(entity, (Pos { x: 1.0, y: 2.0 }, Health(100)));
            entity
        })
        .collect();
    (pool, list)
}

fn kill_entity(c: &mut Criterion) {
    let mut group = c.benchmark_group("kill entity");

    for log_entities in (4..=12).step_by(4) {
        let entities = 1usize << log_entities;
        group.throughput(Throughput::Elements(entities as u64));

        group.bench_with_input(
            BenchmarkId::new("kill all", format!("{entities} entities")),
            &entities,
            |b, &entities| {
                b.iter_batched(
                    || populated_pool(entities),
                    |(pool, list)| {
                        pool.kill_many(list);
                        pool
                    },
                    BatchSize::SmallInput,
                );
            },
        );

        group.bench_with_input(
            BenchmarkId::new("kill and recycle", format!("{entities} entities")),
            &entities,
            |b, &entities| {
                b.iter_batched(
                    || populated_pool(entities),
                    |(pool, list)| {
                        pool.kill_many(list);
                        for _ in 0..entities {
                            let _ = pool.create();
                        }
                        pool
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(benches, kill_entity);
criterion_main!(benches);
