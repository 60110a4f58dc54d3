//! Inbound dispatch benchmark suite.
//!
//! Measures the synchronous path from raw frame text to session state:
//! - Frame decode and tag routing
//! - Envelope decode and message routing
//! - Full login burst (`added` + seven queued feeds)
//!
//! Run with: cargo bench --bench dispatch
//! Results saved to: target/criterion/

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use lv20_client::Socket;
use lv20_client::transport::{Outbox, OutboxReceiver};
use serde_json::{Value, json};

// ============================================================================
// Fixtures
// ============================================================================

fn answer(message: &Value) -> String {
    let envelope = serde_json::to_string(&[message.to_string()]).expect("envelope");
    format!("a{envelope}")
}

fn socket() -> (Socket, OutboxReceiver) {
    let (outbox, rx) = Outbox::channel();
    (Socket::new(outbox), rx)
}

fn drain(rx: &mut OutboxReceiver) {
    while rx.try_recv().is_ok() {}
}

fn added() -> String {
    answer(&json!({
        "msg": "added",
        "collection": "users",
        "id": "RN62wtdTrNjjDEFrP",
        "fields": { "username": "Tester", "profile": { "email": "tester@example.org" } },
    }))
}

fn removed() -> String {
    answer(&json!({ "msg": "removed", "collection": "users", "id": "RN62wtdTrNjjDEFrP" }))
}

// ============================================================================
// Benchmark: Single Frames
// ============================================================================

fn bench_frames(c: &mut Criterion) {
    let mut group = c.benchmark_group("frames");
    group.throughput(Throughput::Elements(1));

    let frames = [
        ("heartbeat", "h".to_string()),
        ("ping", answer(&json!({ "msg": "ping" }))),
        ("connected", answer(&json!({ "msg": "connected", "session": "S1" }))),
        ("unmatched", answer(&json!({ "msg": "ready", "subs": ["a", "b"] }))),
    ];

    for (name, text) in &frames {
        let (socket, mut rx) = socket();
        group.bench_with_input(BenchmarkId::new("on_message", name), text, |b, text| {
            b.iter(|| {
                socket.on_message(black_box(text)).expect("dispatch");
                drain(&mut rx);
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Login Burst
// ============================================================================

fn bench_login_cycle(c: &mut Criterion) {
    let (added, removed) = (added(), removed());
    let (socket, mut rx) = socket();

    c.bench_function("login_cycle", |b| {
        b.iter(|| {
            socket.on_message(black_box(&added)).expect("added");
            socket.on_message(black_box(&removed)).expect("removed");
            drain(&mut rx);
        });
    });
}

criterion_group!(benches, bench_frames, bench_login_cycle);
criterion_main!(benches);
