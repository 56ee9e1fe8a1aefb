use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use ffa_terminal::cards::build_manager_cards;
use ffa_terminal::charts::{ChartRegistry, render_all};
use ffa_terminal::demo_feed::demo_league;
use ffa_terminal::payload::parse_league_analytics_json;

const LEAGUE_JSON: &str = include_str!("../tests/fixtures/league_analytics.json");

fn bench_payload_parse(c: &mut Criterion) {
    c.bench_function("league_analytics_parse", |b| {
        b.iter(|| {
            let data = parse_league_analytics_json(black_box(LEAGUE_JSON)).unwrap();
            black_box(data.manager_analytics.len());
        })
    });
}

fn bench_render_all(c: &mut Criterion) {
    let data = demo_league("bench-league");
    let mut registry = ChartRegistry::new();
    c.bench_function("render_all_demo_league", |b| {
        b.iter(|| {
            render_all(&mut registry, black_box(&data));
            black_box(registry.live_count());
        })
    });
}

fn bench_cards(c: &mut Criterion) {
    let data = demo_league("bench-league");
    c.bench_function("build_manager_cards", |b| {
        b.iter(|| {
            let cards = build_manager_cards(black_box(&data));
            black_box(cards.len());
        })
    });
}

criterion_group!(benches, bench_payload_parse, bench_render_all, bench_cards);
criterion_main!(benches);
