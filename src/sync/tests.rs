use super::SwitchLock;

#[test]
fn locked_read_write() {
    let lock = SwitchLock::new(vec![1, 2, 3], true);

    {
        let mut guard = lock.write();
        guard.push(4);
    }

    let guard = lock.read();
    assert_eq!(*guard, vec![1, 2, 3, 4]);
}

#[test]
fn locked_reads_are_shared() {
    let lock = SwitchLock::new(7, true);
    let a = lock.read();
    let b = lock.read();
    assert_eq!(*a + *b, 14);
}

#[test]
fn unlocked_read_write() {
    // single thread, non-overlapping access: within the disabled-locking contract
    let lock = SwitchLock::new(String::from("a"), false);

    {
        let mut guard = lock.write();
        guard.push('b');
    }

    assert_eq!(*lock.read(), "ab");
}

#[test]
fn mapped_guard_projects() {
    let lock = SwitchLock::new((1, "one"), true);
    let number = lock.read().map(|pair| &pair.0);
    assert_eq!(*number, 1);
}

#[test]
fn guards_release_on_drop() {
    let lock = SwitchLock::new(0, true);

    {
        let mut guard = lock.write();
        *guard = 1;
    }

    // a second write would deadlock if the first guard leaked its lock
    let mut guard = lock.write();
    *guard = 2;
    drop(guard);

    assert_eq!(*lock.read(), 2);
}
