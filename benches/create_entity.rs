use criterion::*;
use sparsec::Pool;

#[derive(Debug, Clone, Copy, Default)]
struct Pos {
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, Copy, Default)]
struct Vel {
    dx: f32,
    dy: f32,
}

#[derive(Debug, Clone, Copy, Default)]
struct Health(i32);

fn create_entity(c: &mut Criterion) {
    let mut group = c.benchmark_group("create entity");

    for log_entities in (4..=12).step_by(4) {
        let entities = 1usize << log_entities;
        group.throughput(Throughput::Elements(entities as u64));

        group.bench_with_input(
            BenchmarkId::new("bare", format!("{entities} entities")),
            &entities,
            |b, &entities| {
                b.iter_batched(
                    || Pool::new(entities),
                    |pool| {
                        for _ in 0..entities {
                            let _ = pool.create();
                        }
                        pool
                    },
                    BatchSize::SmallInput,
                );
            },
        );

        group.bench_with_input(
            BenchmarkId::new("3 components", format!("{entities} entities")),
            &entities,
            |b, &entities| {
                b.iter_batched(
                    || Pool::new(entities),
                    |pool| {
                        for _ in 0..entities {
                            let entity = pool.create();
                            pool.add_many(
                                entity,
                                (Pos { x: 1.0, y: 2.0 }, Vel { dx: 0.1, dy: 0.2 }, Health(100)),
                            );
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

criterion_group!(benches, create_entity);
criterion_main!(benches);
