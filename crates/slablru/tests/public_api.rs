use std::sync::Arc;
use std::thread;

use slablru::{Error, LruCache};

#[test]
fn test_construct_rejects_non_positive_capacity() {
    assert!(matches!(
        LruCache::<u64, String>::new(0),
        Err(Error::InvalidCapacity)
    ));
    assert!(matches!(
        LruCache::<u64, String>::new(-1),
        Err(Error::InvalidCapacity)
    ));
}

#[test]
fn test_capacity_three_walkthrough() {
    let cache = LruCache::new(3).unwrap();

    cache.put(1, "1".to_string());
    cache.put(2, "2".to_string());
    assert_eq!(cache.keys(), vec![2, 1]);

    cache.put(1, "new1".to_string());
    assert_eq!(cache.peek(&1).as_deref(), Some("new1"));
    assert_eq!(cache.keys(), vec![1, 2]);
    assert_eq!(cache.len(), 2);

    cache.put(3, "3".to_string());
    cache.put(4, "4".to_string());
    assert_eq!(cache.keys(), vec![4, 3, 1]);
    assert!(!cache.contains(&2));
    assert_eq!(cache.len(), 3);

    assert_eq!(cache.get(&1).as_deref(), Some("new1"));
    assert_eq!(cache.keys(), vec![1, 4, 3]);

    assert_eq!(cache.get(&2), None);
    assert_eq!(cache.keys(), vec![1, 4, 3]);
}

#[test]
fn test_shared_values_are_not_copied() {
    let cache = LruCache::new(2).unwrap();
    let payload = Arc::new(vec![0u8; 1024]);

    cache.put(1u32, Arc::clone(&payload));
    let fetched = cache.get(&1).unwrap();

    assert!(Arc::ptr_eq(&payload, &fetched));
}

#[test]
fn test_concurrent_put_get_respects_capacity() {
    const THREADS: u64 = 8;
    const OPS: u64 = 5_000;

    let cache = Arc::new(LruCache::new(64).unwrap());

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..OPS {
                    let key = (t * 31 + i * 7) % 256;
                    if i % 2 == 0 {
                        cache.put(key, key * 2);
                    } else if let Some(value) = cache.get(&key) {
                        assert_eq!(value, key * 2);
                    }
                    assert!(cache.len() <= 64);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cache.len(), 64);
    let keys = cache.keys();
    assert_eq!(keys.len(), 64);
    for key in keys {
        assert_eq!(cache.peek(&key), Some(key * 2));
    }

    let stats = cache.stats();
    assert_eq!(stats.inserts() + stats.updates(), THREADS * OPS / 2);
    assert_eq!(stats.hits() + stats.misses(), THREADS * OPS / 2);
    assert_eq!(stats.evictions(), stats.inserts() - 64);
}

#[test]
fn test_concurrent_readers_see_last_write() {
    let cache = LruCache::new(4).unwrap();
    cache.put("config", 0u64);

    thread::scope(|s| {
        s.spawn(|| {
            for i in 1..=1_000 {
                cache.put("config", i);
            }
        });
        for _ in 0..4 {
            s.spawn(|| {
                let mut last = 0;
                for _ in 0..1_000 {
                    let seen = cache.get("config").unwrap();
                    assert!(seen >= last, "value went backwards");
                    last = seen;
                }
            });
        }
    });

    assert_eq!(cache.get("config"), Some(1_000));
    assert_eq!(cache.len(), 1);
}
