/// Concurrent cache tests
///
/// Table -> entity lookups shared between threads
/// Run with: cargo test --test concurrent_cache_tests

use binary_uuid::{EntityDescriptor, EntityRegistry, SettingsResolver, TableEntityCache, UuidConfig};
use std::sync::{Arc, Barrier};
use std::thread;

fn config() -> UuidConfig {
    (0..50).fold(UuidConfig::new(), |config, i| {
        config.entity(EntityDescriptor::new(&format!("Entity{}", i), &format!("table_{}", i)))
    })
}

#[test]
fn test_concurrent_lookups_scan_once() {
    let config = config();
    let registry = Arc::new(EntityRegistry::from_config(&config).unwrap());
    let cache = Arc::new(TableEntityCache::new());
    let resolver = SettingsResolver::new(&config, registry, Arc::clone(&cache));

    let num_threads = 16;
    let barrier = Arc::new(Barrier::new(num_threads));
    let mut handles = vec![];

    for _ in 0..num_threads {
        let resolver = resolver.clone();
        let barrier = Arc::clone(&barrier);

        handles.push(thread::spawn(move || {
            barrier.wait();
            let entity = resolver.entity_for_table("table_42").unwrap();
            entity.name.clone()
        }));
    }

    for handle in handles {
        assert_eq!(handle.join().unwrap(), "Entity42");
    }

    assert_eq!(cache.scan_count(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_shared_cache_across_resolvers() {
    let config = config();
    let registry = Arc::new(EntityRegistry::from_config(&config).unwrap());
    let cache = Arc::new(TableEntityCache::new());

    let first = SettingsResolver::new(&config, Arc::clone(&registry), Arc::clone(&cache));
    let second = SettingsResolver::new(&config, registry, Arc::clone(&cache));

    let a = first.entity_for_table("table_7").unwrap();
    let b = second.entity_for_table("table_7").unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(cache.scan_count(), 1);
}

#[test]
fn test_concurrent_distinct_tables() {
    let config = config();
    let resolver = SettingsResolver::from_config(&config).unwrap();

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let resolver = resolver.clone();
            thread::spawn(move || {
                for _ in 0..20 {
                    let table = format!("table_{}", i);
                    assert_eq!(resolver.primary_key_for_table(&table), "id");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(resolver.cache().scan_count(), 10);
    assert_eq!(resolver.cache().len(), 10);
}

#[test]
fn test_concurrent_misses_scan_once() {
    let config = config();
    let resolver = SettingsResolver::from_config(&config).unwrap();
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let resolver = resolver.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..10 {
                    assert!(resolver.entity_for_table("audit_log").is_none());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(resolver.cache().scan_count(), 1);
    assert_eq!(resolver.cache().len(), 1);
}
