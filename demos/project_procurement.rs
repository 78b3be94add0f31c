//! 專案採購分析完整範例
//!
//! 展示從 BOM、請購與報價到推薦分配、情境比較與風險評估的完整流程
//!
//! 執行：`RUST_LOG=procure=debug cargo run --example project_procurement`

use chrono::{Duration, NaiveDate};
use procure::*;
use rust_decimal::Decimal;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    println!("===== Project Procurement Example =====\n");

    let analysis_date = NaiveDate::from_ymd_opt(2025, 3, 1)
        .ok_or_else(|| anyhow::anyhow!("無效的分析日期"))?;

    // 步驟 1: 建立專案 BOM 與請購
    println!("[1] Create Project BOM");
    let project = create_project();
    for line in &project.bom_lines {
        println!("    {}: {} x {}", line.id, line.specification_id, line.quantity_needed);
    }
    println!("    Budget: ${}\n", project.budget);

    // 步驟 2: 載入報價與評分
    println!("[2] Load Quotes and Ratings");
    let store = create_store(project, analysis_date);
    println!("    Vendors: ACME, BOLT, CRAFT, DELTA\n");

    // 步驟 3: 設定優化參數
    println!("[3] Configure Optimizer");
    let config = OptimizerConfig::from_json_str(
        r#"{ "coverage_weight": 0.7, "rank_weight": 0.3, "stale_after_days": 60 }"#,
    )?;
    println!(
        "    w1 = {}, w2 = {}, alpha = {}, beta = {}\n",
        config.coverage_weight, config.rank_weight, config.balanced_cost_weight, config.balanced_vendor_weight
    );

    let engine = ProcurementEngine::new(store.clone(), store.clone(), store)
        .with_analysis_date(analysis_date)
        .with_config(config);

    // 步驟 4: 執行分析
    println!("[4] Analyze Project (balanced)");
    let strategy = ProcurementStrategy::from_name("balanced")?.with_preferred_vendor("ACME");
    let analysis = engine.analyze_project("PRJ-2025-01", &strategy)?;
    println!("    Completed in {} ms\n", analysis.calculation_time_ms);

    // 步驟 5: BOM 覆蓋
    println!("[5] BOM Coverage");
    for line in &analysis.bom_analyses {
        let best = line
            .best_quote
            .as_ref()
            .map(|q| format!("{} @ ${}", q.vendor_id, q.normalized_unit_price))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "    {:<4} {:<12} planned {:>3}/{:<3} ({:>6}%)  quotes {}  best {}  risk {}",
            line.bom_line_id,
            line.specification_name,
            line.quantity_planned,
            line.quantity_needed,
            line.coverage_percent,
            line.eligible_quotes.len(),
            best,
            line.risk
        );
    }
    println!(
        "    Fully covered {}, partial {}, uncovered {}\n",
        analysis.coverage.fully_covered, analysis.coverage.partially_covered, analysis.coverage.uncovered
    );

    // 步驟 6: 供應商整合
    println!("[6] Vendor Consolidation");
    for vendor in &analysis.vendor_consolidation {
        println!(
            "    {:<6} lines {}  cost ${}  avg rank {:.2}{}",
            vendor.vendor_id,
            vendor.line_count(),
            vendor.total_cost_if_used,
            vendor.average_price_rank,
            if vendor.shipping_advantage { "  (shipping advantage)" } else { "" }
        );
    }
    println!();

    // 步驟 7: 推薦分配
    println!("[7] Recommended Assignment");
    for vendor in &analysis.assignment.vendors {
        println!(
            "    #{} {:<6} ${:<10} {:?}  {}",
            vendor.priority,
            vendor.vendor_id,
            vendor.total_cost,
            vendor.bom_line_ids(),
            vendor.rationale
        );
    }
    for uncovered in &analysis.uncovered_lines {
        println!("    Uncovered {}: {}", uncovered.bom_line_id, uncovered.reason);
    }
    println!("    Total: ${}\n", analysis.assignment.total_cost);

    // 步驟 8: 情境比較
    println!("[8] Scenario Comparison");
    for scenario in engine.compare_scenarios("PRJ-2025-01")? {
        println!(
            "    {:<16} vendors {}  cost ${:<10} vs budget ${:<10} {}",
            scenario.name, scenario.vendor_count, scenario.total_cost, scenario.savings_vs_budget, scenario.trade_off
        );
    }
    println!();

    // 步驟 9: 風險與節省
    println!("[9] Risk and Savings");
    let risk = &analysis.risk_assessment;
    println!(
        "    Overall risk: {}  (score {} / {})",
        risk.overall,
        risk.risk_score.score,
        risk.risk_score.level()
    );
    if let Some(budget) = &risk.budget {
        println!("    Lines over target: {:?}", budget.items_over_budget);
    }
    println!("    Unrated vendors: {:?}", risk.unrated_vendors);
    for factor in &analysis.risk_assessment.factors {
        println!("    - [{}] {}", factor.level, factor.description);
    }
    for action in &analysis.risk_assessment.mitigation_actions {
        println!("    > {}", action);
    }
    let savings = &analysis.savings_summary;
    println!("    Savings vs budget: ${}", savings.savings_vs_budget);
    match savings.savings_vs_target {
        Some(amount) => println!("    Savings vs target: ${}", amount),
        None => println!("    Savings vs target: N/A"),
    }
    println!(
        "    Quotes: {} fresh, {} stale, {} expired\n",
        analysis.quote_freshness.fresh_quotes,
        analysis.quote_freshness.stale_quotes,
        analysis.quote_freshness.expired_quotes
    );

    for issue in &analysis.issues {
        println!("    ! {} {}", issue.subject_id, issue.message);
    }

    println!("===== Done =====");
    Ok(())
}

fn create_project() -> Project {
    Project::new("PRJ-2025-01", "實驗室擴建", Decimal::from(60_000))
        .with_bom_line(BomLine::new("L1", "CABLE-CAT6", 300))
        .with_bom_line(BomLine::new("L2", "SWITCH-24P", 12))
        .with_bom_line(BomLine::new("L3", "RACK-42U", 4))
        .with_bom_line(BomLine::new("L4", "UPS-3KVA", 6))
        .with_bom_line(BomLine::new("L5", "FIBER-SFP", 24).with_notes("尚未詢價"))
        .with_requisition(
            ProjectRequisition::new("PR-001 網路設備")
                .with_item(RequisitionItem::new("L1", 300).with_target_unit_price(Decimal::new(450, 2)))
                .with_item(RequisitionItem::new("L2", 12).with_target_unit_price(Decimal::from(900))),
        )
        .with_requisition(
            ProjectRequisition::new("PR-002 機房設施")
                .with_item(RequisitionItem::new("L3", 2))
                .with_item(RequisitionItem::new("L4", 6).with_target_unit_price(Decimal::from(1_400))),
        )
}

fn create_store(project: Project, analysis_date: NaiveDate) -> InMemoryStore {
    let recent = analysis_date - Duration::days(10);
    let old = analysis_date - Duration::days(120);

    InMemoryStore::new()
        .with_project(project)
        .with_specification(Specification::new("CABLE-CAT6", "Cat6 網路線").with_category("網路"))
        .with_specification(Specification::new("SWITCH-24P", "24 埠交換器").with_category("網路"))
        .with_specification(Specification::new("RACK-42U", "42U 機櫃").with_category("機房"))
        .with_specification(Specification::new("UPS-3KVA", "3KVA UPS").with_category("機房"))
        .with_quote(Quote::new("ACME", "CABLE-CAT6", Decimal::new(420, 2), recent).with_vendor_name("Acme Networks"))
        .with_quote(Quote::new("BOLT", "CABLE-CAT6", Decimal::new(415, 2), recent).with_vendor_name("Bolt Supply"))
        .with_quote(Quote::new("ACME", "SWITCH-24P", Decimal::from(880), recent).with_vendor_name("Acme Networks"))
        .with_quote(Quote::new("CRAFT", "SWITCH-24P", Decimal::from(860), old).with_vendor_name("Craft IT"))
        .with_quote(Quote::new("ACME", "RACK-42U", Decimal::from(1_250), recent).with_vendor_name("Acme Networks"))
        .with_quote(Quote::new("DELTA", "RACK-42U", Decimal::from(1_100), recent).with_vendor_name("Delta Power"))
        .with_quote(Quote::new("DELTA", "UPS-3KVA", Decimal::from(1_450), recent).with_vendor_name("Delta Power"))
        .with_quote(
            Quote::new("BOLT", "UPS-3KVA", Decimal::from(1_300), old)
                .with_vendor_name("Bolt Supply")
                .with_valid_until(analysis_date - Duration::days(5)),
        )
        .with_rating(VendorRating::new("ACME").with_scores(4, 5, 4, 5))
        .with_rating(VendorRating::new("BOLT").with_scores(5, 3, 3, 4))
        .with_rating(VendorRating::new("CRAFT").with_scores(3, 2, 2, 3))
        .with_rating(VendorRating::new("DELTA").with_scores(4, 4, 5, 4))
}
