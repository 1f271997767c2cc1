use itertools::Itertools;

use crate::test_util::{self, Health, Pos, Vel};
use crate::{Entity, Pool, Queryable};

fn ids(entities: &[Entity]) -> Vec<u32> { entities.iter().map(|entity| entity.id()).collect() }

#[test]
fn get_absent_returns_zero_value() {
    let pool = Pool::new(4);
    let entity = pool.create();

    let healths = pool.storage::<Health>();
    assert!(!healths.contains(entity));
    assert_eq!(healths.get(entity), Health::default());
}

#[test]
fn update_overwrites_present_row() {
    let pool = Pool::new(4);
    let entity = pool.create();
    pool.add(entity, Health(10));

    let healths = pool.storage::<Health>();
    healths.update(entity, Health(25));
    assert_eq!(healths.get(entity), Health(25));
}

#[test]
fn update_absent_row_leaves_it_absent() {
    let pool = Pool::new(4);
    let entity = pool.create();

    let healths = pool.storage::<Health>();
    healths.update(entity, Health(25));
    assert!(!healths.contains(entity), "update must not flip the presence bit");
    assert_eq!(healths.get(entity), Health::default());

    // a later add establishes presence with its own value
    pool.add(entity, Health(3));
    assert_eq!(healths.get(entity), Health(3));
}

#[test]
fn handles_share_one_table() {
    let pool = Pool::new(4);
    let entity = pool.create();
    pool.add(entity, Health(1));

    let a = pool.storage::<Health>();
    let b = a.clone();
    a.update(entity, Health(2));
    assert_eq!(b.get(entity), Health(2));
}

/// capacity 6; e1..e6 get ids 1..=6; components laid out as:
/// Pos on 1,2,3,4; Vel on 2,4,6; Health on 3,4.
fn fixture() -> (Pool, Vec<Entity>) {
    let pool = Pool::new(6);
    let entities: Vec<Entity> = (0..6).map(|_| pool.create()).collect();
    for &entity in &entities[..4] {
        pool.add(entity, Pos { x: 1.0, y: 1.0 });
    }
    for &entity in entities.iter().skip(1).step_by(2) {
        pool.add(entity, Vel { dx: 1.0, dy: 0.0 });
    }
    for &entity in &entities[2..4] {
        pool.add(entity, Health(5));
    }
    (pool, entities)
}

#[test]
fn entities_lists_own_component_ascending() {
    let (pool, _) = fixture();
    assert_eq!(ids(&pool.storage::<Vel>().entities()), vec![2, 4, 6]);
}

#[test]
fn and_with_no_operands_is_entities() {
    let (pool, _) = fixture();
    let positions = pool.storage::<Pos>();
    assert_eq!(positions.and(&[]), positions.entities());
}

#[test]
fn and_intersects() {
    test_util::init();
    let (pool, _) = fixture();
    let positions = pool.storage::<Pos>();
    let velocities = pool.storage::<Vel>();
    let healths = pool.storage::<Health>();

    assert_eq!(ids(&positions.and(&[&velocities])), vec![2, 4]);
    assert_eq!(ids(&positions.and(&[&velocities, &healths])), vec![4]);
    // argument order must not matter
    assert_eq!(ids(&positions.and(&[&healths, &velocities])), vec![4]);
}

#[test]
fn or_unions() {
    let (pool, _) = fixture();
    let velocities = pool.storage::<Vel>();
    let healths = pool.storage::<Health>();

    assert_eq!(ids(&velocities.or(&[&healths])), vec![2, 3, 4, 6]);
}

#[test]
fn but_not_subtracts() {
    let (pool, _) = fixture();
    let positions = pool.storage::<Pos>();
    let velocities = pool.storage::<Vel>();
    let healths = pool.storage::<Health>();

    assert_eq!(ids(&positions.but_not(&[&velocities])), vec![1, 3]);
    assert_eq!(ids(&positions.but_not(&[&velocities, &healths])), vec![1]);
}

#[test]
fn query_with_duplicate_operands() {
    let (pool, _) = fixture();
    let positions = pool.storage::<Pos>();
    let velocities = pool.storage::<Vel>();

    assert_eq!(ids(&positions.and(&[&velocities, &velocities])), vec![2, 4]);
    assert_eq!(
        positions.but_not(&[&positions as &dyn Queryable]),
        Vec::<Entity>::new(),
        "a storage minus itself holds nothing",
    );
}

#[test]
fn query_results_are_strictly_ascending() {
    let (pool, _) = fixture();
    let all = pool.storage::<Pos>().or(&[&pool.storage::<Vel>(), &pool.storage::<Health>()]);
    assert!(ids(&all).iter().tuple_windows().all(|(a, b)| a < b));
}

#[test]
fn rows_mut_bulk_update() {
    let (pool, _) = fixture();
    let positions = pool.storage::<Pos>();
    let velocities = pool.storage::<Vel>();

    // query before locking, lock before the loop
    let moving = positions.and(&[&velocities]);
    {
        let mut rows = positions.rows_mut();
        let velocity_rows = velocities.rows();
        for &entity in &moving {
            let (Some(pos), Some(vel)) = (rows.get_mut(entity), velocity_rows.get(entity)) else {
                continue;
            };
            pos.x += vel.dx;
            pos.y += vel.dy;
        }
    }

    for entity in moving {
        assert_eq!(positions.get(entity), Pos { x: 2.0, y: 1.0 });
    }
}

#[test]
fn rows_mut_absent_row_is_none() {
    let (pool, entities) = fixture();
    let velocities = pool.storage::<Vel>();

    let mut rows = velocities.rows_mut();
    assert!(rows.get_mut(entities[0]).is_none(), "entity 1 has no velocity");
    assert!(rows.get(entities[1]).is_some());
    assert!(rows.contains(entities[1]));
}

#[test]
fn kill_clears_row_under_view_taken_later() {
    let (pool, entities) = fixture();
    let positions = pool.storage::<Pos>();

    pool.kill(entities[1]);
    let rows = positions.rows();
    assert!(rows.get(entities[1]).is_none(), "killed entities must not be visible in raw views");
}
