//! 專案分析效能基準
//!
//! 以固定種子產生 500 個 BOM 行、20 家供應商的合成專案。

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use procure::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

const LINES: usize = 500;
const VENDORS: usize = 20;

fn analysis_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
}

fn synthetic_store(seed: u64) -> InMemoryStore {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut project = Project::new("BENCH", "合成專案", Decimal::from(5_000_000));
    let mut requisition = ProjectRequisition::new("批次請購");
    let mut store = InMemoryStore::new();

    for i in 0..LINES {
        let line_id = format!("L{:04}", i);
        let spec_id = format!("SPEC-{:04}", i);
        let needed = rng.gen_range(1..200u32);
        project = project.with_bom_line(BomLine::new(&line_id, &spec_id, needed));
        store = store.with_specification(
            Specification::new(&spec_id, format!("規格 {}", i)).with_category(format!("類別 {}", i % 12)),
        );

        let planned = rng.gen_range(0..=needed);
        if planned > 0 {
            let mut item = RequisitionItem::new(&line_id, planned);
            if rng.gen_bool(0.5) {
                item = item.with_target_unit_price(Decimal::new(rng.gen_range(500..20_000), 2));
            }
            requisition = requisition.with_item(item);
        }

        for v in 0..VENDORS {
            if !rng.gen_bool(0.3) {
                continue;
            }
            let quote_date = analysis_date() - Duration::days(rng.gen_range(0..180));
            let mut quote = Quote::new(
                format!("V{:02}", v),
                &spec_id,
                Decimal::new(rng.gen_range(500..20_000), 2),
                quote_date,
            );
            if rng.gen_bool(0.1) {
                quote = quote.with_valid_until(analysis_date() - Duration::days(1));
            }
            store.add_quote(quote);
        }
    }

    for v in 0..VENDORS {
        let mut score = || rng.gen_range(1..=5u8);
        let rating = VendorRating::new(format!("V{:02}", v)).with_scores(score(), score(), score(), score());
        store = store.with_rating(rating);
    }

    store.with_project(project.with_requisition(requisition))
}

fn bench_analyze_project(c: &mut Criterion) {
    let store = synthetic_store(42);
    let engine = ProcurementEngine::new(store.clone(), store.clone(), store)
        .with_analysis_date(analysis_date());

    let mut group = c.benchmark_group("analyze_project");
    for kind in StrategyKind::ALL {
        let strategy = ProcurementStrategy::new(kind);
        group.bench_with_input(BenchmarkId::from_parameter(kind), &strategy, |b, strategy| {
            b.iter(|| engine.analyze_project(black_box("BENCH"), strategy))
        });
    }
    group.finish();
}

fn bench_compare_scenarios(c: &mut Criterion) {
    let store = synthetic_store(42);
    let engine = ProcurementEngine::new(store.clone(), store.clone(), store)
        .with_analysis_date(analysis_date());

    c.bench_function("compare_scenarios", |b| {
        b.iter(|| engine.compare_scenarios(black_box("BENCH")))
    });
}

criterion_group!(benches, bench_analyze_project, bench_compare_scenarios);
criterion_main!(benches);
