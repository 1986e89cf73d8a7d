#![cfg(not(loom))]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use seqring::{mpmc, Empty, Full, Queue};

const PRODUCERS: usize = 8;
const CONSUMERS: usize = 8;
const PER_PRODUCER: usize = 10_000;

/// Tag layout: high bits producer id, low bits per-producer sequence.
fn tag(producer: usize, seq: usize) -> usize {
    producer << 32 | seq
}

fn untag(value: usize) -> (usize, usize) {
    (value >> 32, value & 0xffff_ffff)
}

/// Run `f` on its own thread and fail instead of stalling if it does not finish in time.
fn with_watchdog<R: Send + 'static>(secs: u64, f: impl FnOnce() -> R + Send + 'static) -> R {
    let (done_tx, done_rx) = channel();
    let worker = thread::spawn(move || {
        let result = f();
        let _ = done_tx.send(());
        result
    });

    match done_rx.recv_timeout(Duration::from_secs(secs)) {
        // A panic in `f` drops the sender; joining re-raises it.
        Ok(()) | Err(RecvTimeoutError::Disconnected) => worker.join().unwrap(),
        Err(RecvTimeoutError::Timeout) => panic!("queue operations did not return within {secs}s"),
    }
}

fn run_stress(capacity: usize) {
    with_watchdog(120, move || drain_all(capacity));
}

fn drain_all(capacity: usize) {
    seqring::init_tracing();

    let queue = Arc::new(Queue::new(capacity).unwrap());
    let barrier = Arc::new(Barrier::new(PRODUCERS + CONSUMERS));
    let total = PRODUCERS * PER_PRODUCER;
    let drained = Arc::new(AtomicUsize::new(0));

    let producers: Vec<_> = (0..PRODUCERS).map(|p| {
        let queue = queue.clone();
        let barrier = barrier.clone();
        thread::spawn(move || {
            barrier.wait();
            for i in 0..PER_PRODUCER {
                let mut v = tag(p, i);
                while let Err(Full(back)) = queue.enqueue(v) {
                    v = back;
                    thread::yield_now();
                }
            }
        })
    })
    .collect();

    let consumers: Vec<_> = (0..CONSUMERS).map(|_| {
        let queue = queue.clone();
        let barrier = barrier.clone();
        let drained = drained.clone();
        thread::spawn(move || {
            barrier.wait();
            let mut received = Vec::new();
            while drained.load(Ordering::Relaxed) < total {
                match queue.dequeue() {
                    Ok(v) => {
                        received.push(v);
                        drained.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(Empty) => thread::yield_now(),
                }
            }
            received
        })
    })
    .collect();

    for producer in producers {
        producer.join().unwrap();
    }

    let mut seen: HashMap<usize, usize> = HashMap::new();
    for consumer in consumers {
        let received = consumer.join().unwrap();

        // A single consumer observes each producer's values in the order they were sent.
        let mut last = vec![None; PRODUCERS];
        for &v in &received {
            let (p, seq) = untag(v);
            if let Some(prev) = last[p] {
                assert!(seq > prev, "producer {p}: {seq} dequeued after {prev}");
            }
            last[p] = Some(seq);
            *seen.entry(v).or_default() += 1;
        }
    }

    assert_eq!(seen.len(), total);
    assert!(seen.values().all(|&n| n == 1));
    for p in 0..PRODUCERS {
        for i in 0..PER_PRODUCER {
            assert!(seen.contains_key(&tag(p, i)));
        }
    }
    assert!(queue.is_empty());
    assert_eq!(queue.dequeue(), Err(Empty));
}

#[test]
fn test_stress_8x8_pow2() {
    run_stress(64);
}

#[test]
fn test_stress_8x8_non_pow2() {
    run_stress(100);
}

#[test]
fn test_stress_8x8_single_slot() {
    run_stress(1);
}

#[test]
fn test_single_producer_fifo_through_handles() {
    with_watchdog(120, || {
        let (tx, rx) = mpmc(8).unwrap();
        let count = 100_000;

        let producer = thread::spawn(move || {
            for i in 0..count {
                let mut v = i;
                while let Err(Full(back)) = tx.try_send(v) {
                    v = back;
                    thread::yield_now();
                }
            }
        });

        let mut expected = 0;
        while expected < count {
            match rx.try_recv() {
                Ok(v) => {
                    assert_eq!(v, expected);
                    expected += 1;
                }
                Err(Empty) => thread::yield_now(),
            }
        }

        producer.join().unwrap();
        assert_eq!(rx.try_recv(), Err(Empty));
    });
}

#[test]
fn test_len_stays_within_capacity() {
    let queue = Arc::new(Queue::new(16).unwrap());
    let stop = Arc::new(AtomicUsize::new(0));

    let workers: Vec<_> = (0..4).map(|i| {
        let queue = queue.clone();
        let stop = stop.clone();
        thread::spawn(move || {
            while stop.load(Ordering::Relaxed) == 0 {
                if i % 2 == 0 {
                    let _ = queue.enqueue(i);
                } else {
                    let _ = queue.dequeue();
                }
            }
        })
    })
    .collect();

    for _ in 0..10_000 {
        assert!(queue.len() <= queue.capacity());
    }

    stop.store(1, Ordering::Relaxed);
    for worker in workers {
        worker.join().unwrap();
    }
}

#[test]
fn test_values_left_behind_are_dropped() {
    struct Counted(Arc<AtomicUsize>);

    impl Drop for Counted {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    let drops = Arc::new(AtomicUsize::new(0));
    let queue = Arc::new(Queue::new(32).unwrap());

    let producers: Vec<_> = (0..4).map(|_| {
        let queue = queue.clone();
        let drops = drops.clone();
        thread::spawn(move || {
            let mut sent = 0;
            for _ in 0..8 {
                if queue.enqueue(Counted(drops.clone())).is_ok() {
                    sent += 1;
                }
            }
            sent
        })
    })
    .collect();

    let sent: usize = producers.into_iter().map(|p| p.join().unwrap()).sum();
    assert_eq!(sent, 32);

    // Every value is still owned by the queue.
    assert_eq!(drops.load(Ordering::Relaxed), 0);

    for _ in 0..10 {
        drop(queue.dequeue().unwrap_or_else(|_| panic!("queue should not be empty")));
    }
    assert_eq!(drops.load(Ordering::Relaxed), 10);

    drop(queue);
    assert_eq!(drops.load(Ordering::Relaxed), 32);
}
