use bounded_lru::BoundedLru;

fn main() {
    let cache = BoundedLru::new(4).unwrap();

    cache.on_evicted(|key: &i32| println!("Item evicted from the cache. Key {}", key));

    cache.add_or_update(1, "Val1").unwrap();
    cache.add_or_update(2, "Val2").unwrap();
    cache.add_or_update(3, "Val3").unwrap();
    cache.add_or_update(4, "Val4").unwrap();
    cache.add_or_update(3, "Val5").unwrap();
    // Cache is full and 1 is the oldest, so this evicts 1.
    cache.add_or_update(6, "Val6").unwrap();

    if let Some(value) = cache.get(&3) {
        println!("Value for item 3: {}", value);
    }

    if let Some(value) = cache.get(&1) {
        println!("Value for item 1: {}", value);
    }

    let order = cache
        .eviction_queue()
        .iter()
        .map(|key| key.to_string())
        .collect::<Vec<_>>();
    println!("Current eviction order: {}", order.join(","));
}

// Expected output:
// Item evicted from the cache. Key 1
// Value for item 3: Val5
// Current eviction order: 2,4,6,3
