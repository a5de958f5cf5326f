use bounded_lru::BoundedLru;
use rand::Rng;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

fn main() {
    let numbers = Arc::new(BoundedLru::<usize, usize>::new(10_000).unwrap());

    let evictions = Arc::new(AtomicUsize::new(0));
    {
        let evictions = Arc::clone(&evictions);
        numbers.on_evicted(move |_: &usize| {
            evictions.fetch_add(1, Ordering::Relaxed);
        });
    }

    let handles = (0..4)
        .map(|thread| {
            let numbers = Arc::clone(&numbers);
            std::thread::spawn(move || {
                eprintln!("Thread {} started", thread);
                let mut rng = rand::thread_rng();
                for i in 0..1_000_000 {
                    let key = rng.gen_range(0..50_000);
                    if numbers.get(&key).is_none() {
                        numbers.add_or_update(key, i).unwrap();
                    }
                    if i % 100_000 == 0 {
                        eprintln!("Thread {} finished {}", thread, i);
                    }
                }
            })
        })
        .collect::<Vec<_>>();

    for handle in handles {
        handle.join().unwrap();
    }

    eprintln!(
        "Done: {} resident, {} evicted",
        numbers.len(),
        evictions.load(Ordering::Relaxed)
    );
}
