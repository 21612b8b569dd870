use tempo::prelude::*;
use tempo::StatsdClient;
use std::thread;

pub const NUM_THREADS: u64 = 4;
pub const NUM_ITERATIONS: u64 = 100;

// One client per thread, the supported pattern for a client that is
// Send but not Sync.
#[allow(dead_code)]
pub fn run_threaded_test(clients: Vec<StatsdClient>, iterations: u64) {
    let threads: Vec<_> = clients
        .into_iter()
        .map(|client| {
            thread::spawn(move || {
                for i in 0..iterations {
                    client.count("some.counter", i as i64);
                    client.time("some.timer", i);
                    client.gauge("some.gauge", i);
                    client.set("some.set", i);
                    client.incr_with_rate("some.sampled.counter", 0.5);
                }
            })
        })
        .collect();

    for t in threads {
        t.join().unwrap();
    }
}
