use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Barrier};

use crossbeam_utils::thread;
use message_slot::{SlotRegistry, MAX_MESSAGE_LEN};

#[test]
fn concurrent_first_selection_creates_one_channel() {
    for _ in 0..50 {
        let registry = SlotRegistry::new();
        let threads = 8;
        let barrier = Barrier::new(threads);

        let channels = thread::scope(|s| {
            let handles: Vec<_> = (0..threads)
                .map(|_| {
                    s.spawn(|_| {
                        let mut session = registry.open(0).unwrap();
                        barrier.wait();
                        session.select_channel(7).unwrap();
                        Arc::clone(session.channel().unwrap())
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .collect::<Vec<_>>()
        })
        .unwrap();

        for channel in &channels[1..] {
            assert!(Arc::ptr_eq(&channels[0], channel));
        }
        assert_eq!(registry.slot(0).unwrap().channel_count(), 1);
    }
}

#[test]
fn concurrent_first_open_creates_one_slot() {
    let registry = SlotRegistry::new();
    let threads = 8;
    let barrier = Barrier::new(threads);

    let slots = thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                s.spawn(|_| {
                    barrier.wait();
                    Arc::clone(registry.open(42).unwrap().slot())
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>()
    })
    .unwrap();

    for slot in &slots[1..] {
        assert!(Arc::ptr_eq(&slots[0], slot));
    }
    assert_eq!(registry.slot_count(), 1);
}

#[test]
fn readers_never_observe_torn_messages() {
    // Each writer fills the whole message with one repeated byte and a
    // length derived from that byte, so a mixed or mis-sized read shows up.
    fn message_for(tag: u8) -> Vec<u8> {
        let len = 1 + (tag as usize % MAX_MESSAGE_LEN);
        vec![tag; len]
    }

    const READERS: usize = 4;
    const READS_PER_READER: u64 = 20_000;

    let registry = SlotRegistry::new();
    let stop = AtomicBool::new(false);
    let reads = AtomicU64::new(0);

    let mut seed = registry.open(0).unwrap();
    seed.select_channel(1).unwrap();
    seed.write(message_for(0).as_slice()).unwrap();

    thread::scope(|s| {
        for w in 0..4u8 {
            let registry = &registry;
            let stop = &stop;
            s.spawn(move |_| {
                let mut session = registry.open(0).unwrap();
                session.select_channel(1).unwrap();
                let mut tag = w;
                while !stop.load(Ordering::Relaxed) {
                    session.write(message_for(tag).as_slice()).unwrap();
                    tag = tag.wrapping_add(4);
                }
            });
        }

        let readers: Vec<_> = (0..READERS)
            .map(|_| {
                s.spawn(|_| {
                    let mut session = registry.open(0).unwrap();
                    session.select_channel(1).unwrap();
                    let mut buf = [0u8; MAX_MESSAGE_LEN];
                    for _ in 0..READS_PER_READER {
                        match session.read(&mut buf[..]) {
                            Ok(len) => {
                                let tag = buf[0];
                                assert_eq!(&buf[..len], message_for(tag).as_slice());
                                reads.fetch_add(1, Ordering::Relaxed);
                            }
                            Err(e) => panic!("unexpected read error: {e}"),
                        }
                    }
                })
            })
            .collect();

        let all_ok = readers.into_iter().all(|h| h.join().is_ok());
        stop.store(true, Ordering::Relaxed);
        assert!(all_ok, "a reader saw a torn message");
    })
    .unwrap();

    assert_eq!(reads.load(Ordering::Relaxed), READERS as u64 * READS_PER_READER);
}
