use criterion::{criterion_group, criterion_main, Criterion};
use life_core::{Gender, NewPlayer, SesClass, SimConfig};
use life_runtime::{Autopilot, LifeEngine};

fn bench_life(c: &mut Criterion) {
    let pilot = Autopilot::default();
    c.bench_function("autopilot_60_years", |b| {
        b.iter(|| {
            let mut engine = LifeEngine::new(SimConfig::default());
            let player = engine
                .create_player(NewPlayer {
                    name: "Bench".into(),
                    avatar: "cat".into(),
                    gender: Gender::Male,
                    ses: SesClass::Middle,
                    traits: vec![],
                })
                .unwrap();
            let _ = engine.run_years(player, 60, &pilot);
        })
    });

    let mut engine = LifeEngine::new(SimConfig::default());
    let player = engine
        .create_player(NewPlayer {
            name: "Bench".into(),
            avatar: "cat".into(),
            gender: Gender::Female,
            ses: SesClass::Upper,
            traits: vec![],
        })
        .unwrap();
    c.bench_function("select_event", |b| {
        b.iter(|| engine.select_random_event(&player))
    });
}

criterion_group!(benches, bench_life);
criterion_main!(benches);
