use rand::Rng;
use semsync_primitives::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

// Every test in this file works on the process-wide table, each one on its own ids

#[test]
fn invalid_ids_are_rejected() {
    for id in [32u8, 100, u8::MAX] {
        assert!(!binary_semaphore_take(id));
        assert!(!binary_semaphore_release(id));
    }
    for id in [20u8, 21] {
        assert!(!BinarySemaphoreTable::global().is_reserved(id).unwrap());
    }
}

#[test]
fn boundary_ids_are_valid() {
    assert!(binary_semaphore_take(BINARY_SEMAPHORE_ID_MAX));
    assert!(BinarySemaphoreTable::global()
        .is_reserved(BINARY_SEMAPHORE_ID_MAX)
        .unwrap());
    assert!(binary_semaphore_release(BINARY_SEMAPHORE_ID_MAX));

    assert!(binary_semaphore_take(BINARY_SEMAPHORE_ID_MIN + 10));
    assert!(binary_semaphore_release(BINARY_SEMAPHORE_ID_MIN + 10));
}

#[test]
fn second_take_waits_for_release() {
    const ID: u8 = 2;
    let acquired = AtomicBool::new(false);

    assert!(binary_semaphore_take(ID));

    crossbeam::thread::scope(|s| {
        s.builder()
            .name("waiter".to_string())
            .spawn(|_| {
                assert!(binary_semaphore_take(ID));
                acquired.store(true, Ordering::SeqCst);
                assert!(binary_semaphore_release(ID));
            })
            .unwrap();

        std::thread::sleep(Duration::from_millis(50));
        assert!(!acquired.load(Ordering::SeqCst));
        assert!(binary_semaphore_release(ID));
    })
    .unwrap();

    assert!(acquired.load(Ordering::SeqCst));
}

#[test]
fn at_most_one_holder_at_a_time() {
    const THREADS_COUNT: usize = 8;
    const ROUNDS: usize = 50;

    let holders = AtomicUsize::new(0);
    let max_holders = AtomicUsize::new(0);
    let completed = AtomicUsize::new(0);

    crossbeam::thread::scope(|s| {
        for _ in 0..THREADS_COUNT {
            s.spawn(|_| {
                let mut rng = rand::thread_rng();
                for _ in 0..ROUNDS {
                    assert!(binary_semaphore_take(0));
                    let current = holders.fetch_add(1, Ordering::SeqCst) + 1;
                    max_holders.fetch_max(current, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_micros(rng.gen_range(0..50)));
                    holders.fetch_sub(1, Ordering::SeqCst);
                    completed.fetch_add(1, Ordering::SeqCst);
                    assert!(binary_semaphore_release(0));
                }
            });
        }
    })
    .unwrap();

    assert_eq!(max_holders.load(Ordering::SeqCst), 1);
    assert_eq!(completed.load(Ordering::SeqCst), THREADS_COUNT * ROUNDS);
}
