// Heap accounting for the hot path.
//
// Once a session is bound, write and read copy through fixed-size buffers
// and should not touch the heap. dhat runs in testing mode with its own
// global allocator, so this file holds a single test.
//
// cargo test --test allocation -- --nocapture

use message_slot::{SlotRegistry, MAX_MESSAGE_LEN};

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

#[test]
#[serial_test::serial]
fn bound_write_and_read_do_not_allocate() {
    let _profiler = dhat::Profiler::builder().testing().build();

    let registry = SlotRegistry::new();
    let mut session = registry.open(0).unwrap();
    session.select_channel(1).unwrap();

    let message = [0x5au8; MAX_MESSAGE_LEN];
    let mut buf = [0u8; MAX_MESSAGE_LEN];

    // Warm up lazily initialised thread and lock state.
    for _ in 0..16 {
        session.write(&message[..]).unwrap();
        session.read(&mut buf[..]).unwrap();
    }

    let before = dhat::HeapStats::get();
    for i in 0..1_000usize {
        let len = 1 + i % MAX_MESSAGE_LEN;
        session.write(&message[..len]).unwrap();
        assert_eq!(session.read(&mut buf[..]).unwrap(), len);
    }
    let after = dhat::HeapStats::get();

    println!("heap blocks before: {}, after: {}", before.total_blocks, after.total_blocks);
    dhat::assert_eq!(after.total_blocks, before.total_blocks);
}
