//! Rules benchmarks for mek_core.
//!
//! Run with: `cargo bench -p mek_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mek_core::battle_value;
use mek_core::damage::{resolve_hit, roll_location, HitTable, Side};
use mek_core::dice::SeededDice;
use mek_core::hex::{intervening, HexCoord};
use mek_core::movement::{compile_path, StepType};
use mek_core::options::GameOptions;
use mek_core::to_hit::weapon_to_hit;
use mek_test_utils::fixtures::{duel, medium_mech, skirmish};

/// Path compilation over a long mixed path.
pub fn movement_benchmark(c: &mut Criterion) {
    let game = skirmish(GameOptions::default());
    let steps = [
        StepType::Forward,
        StepType::Forward,
        StepType::TurnLeft,
        StepType::Forward,
        StepType::TurnRight,
        StepType::Forward,
        StepType::Forward,
        StepType::Backward,
    ];
    c.bench_function("compile_path", |b| {
        b.iter(|| compile_path(black_box(&game), 1, black_box(&steps)))
    });
    c.bench_function("intervening_long_line", |b| {
        b.iter(|| intervening(black_box(HexCoord::new(0, 0)), black_box(HexCoord::new(15, 16))))
    });
}

/// To-hit, damage and battle value on a standard medium mech.
pub fn combat_benchmark(c: &mut Criterion) {
    let duel = duel(5);
    c.bench_function("weapon_to_hit", |b| {
        b.iter(|| weapon_to_hit(black_box(&duel.game), duel.attacker, duel.target, 0))
    });

    let target = medium_mech("Target").build().expect("fixture builds");
    let options = GameOptions::default();
    c.bench_function("resolve_hit", |b| {
        let mut dice = SeededDice::from_seed(1);
        b.iter(|| {
            let mut victim = target.clone();
            let hit = roll_location(&victim, HitTable::Normal, Side::Front, &mut dice);
            resolve_hit(&mut victim, &hit, black_box(10), &options, &mut dice, None)
        })
    });
    c.bench_function("battle_value", |b| b.iter(|| battle_value::calculate(black_box(&target))));
}

criterion_group!(benches, movement_benchmark, combat_benchmark);
criterion_main!(benches);
