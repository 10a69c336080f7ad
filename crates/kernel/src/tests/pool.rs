use crate::pool::BufferPool;

#[test]
fn lease_returns_buffer_on_drop() {
    let pool = BufferPool::new(2);

    let first = pool.acquire().unwrap();
    let second = pool.acquire().unwrap();
    assert!(pool.acquire().is_none());

    let stats = pool.stats();
    assert_eq!(stats.free, 0);
    assert_eq!(stats.used, 2);
    assert_eq!(stats.failed, 1);

    drop(first);
    drop(second);

    let stats = pool.stats();
    assert_eq!(stats.free, 2);
    assert_eq!(stats.used, 0);
    assert_eq!(stats.min_free, 0);
}

#[test]
fn clones_share_the_same_buffers() {
    let pool = BufferPool::new(1);
    let other = pool.clone();

    let lease = other.acquire().unwrap();
    assert!(pool.acquire().is_none());
    drop(lease);
    assert!(pool.acquire().is_some());
}
