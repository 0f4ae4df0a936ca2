use criterion::{Criterion, black_box, criterion_group, criterion_main};
use vt_codec_core::{Key, KeyAction, KeyEncoder, KeyEvent, KittyFlags, Mods};

fn typing_events() -> Vec<KeyEvent<'static>> {
    let mut events = Vec::new();
    for key in [Key::KeyH, Key::KeyE, Key::KeyL, Key::KeyL, Key::KeyO, Key::Space] {
        events.push(KeyEvent::new(key));
    }
    events.push(KeyEvent {
        mods: Mods::CTRL,
        ..KeyEvent::new(Key::KeyC)
    });
    events.push(KeyEvent::new(Key::ArrowUp));
    events.push(KeyEvent::new(Key::Enter));
    events.push(KeyEvent {
        mods: Mods::CTRL | Mods::SHIFT,
        ..KeyEvent::new(Key::KeyV)
    });
    events.push(KeyEvent::new(Key::F5));
    events.push(KeyEvent {
        action: KeyAction::Release,
        ..KeyEvent::new(Key::KeyA)
    });
    events
}

fn bench_key_encode(c: &mut Criterion) {
    let events = typing_events();
    let mut group = c.benchmark_group("key_encode");

    group.bench_function("legacy", |b| {
        let encoder = KeyEncoder::new();
        let mut buf = [0u8; 128];
        b.iter(|| {
            for event in &events {
                black_box(encoder.encode(event, &mut buf).unwrap());
            }
        });
    });

    group.bench_function("kitty_all", |b| {
        let mut encoder = KeyEncoder::new();
        encoder.options.kitty_flags = KittyFlags::ALL;
        let mut buf = [0u8; 128];
        b.iter(|| {
            for event in &events {
                black_box(encoder.encode(event, &mut buf).unwrap());
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_key_encode);
criterion_main!(benches);
