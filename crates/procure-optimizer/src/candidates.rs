//! 候選報價池與逐行選擇工具

use procure_calc::{BomLineAnalysis, ConsolidationAnalyzer, VendorConsolidation};
use procure_core::{ProcurementStrategy, Quote};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

use crate::assignment::UncoveredReason;

/// 供應商在某行的最佳報價
#[derive(Debug, Clone, Copy)]
pub(crate) struct Offer<'a> {
    pub quote: &'a Quote,
    /// 在該行所有合格報價中的價格排名（1 = 最便宜）
    pub rank: usize,
}

impl<'a> Offer<'a> {
    pub fn vendor_id(&self) -> &'a str {
        &self.quote.vendor_id
    }

    pub fn price(&self) -> Decimal {
        self.quote.normalized_unit_price
    }
}

/// 單行的候選報價（按價格升序，每家供應商一筆）
#[derive(Debug, Clone)]
pub(crate) struct LineOffers<'a> {
    pub analysis: &'a BomLineAnalysis,
    pub offers: Vec<Offer<'a>>,
    /// 無候選時的原因
    pub empty_reason: Option<UncoveredReason>,
}

impl<'a> LineOffers<'a> {
    pub fn is_coverable(&self) -> bool {
        !self.offers.is_empty()
    }

    pub fn offer_from(&self, vendor_id: &str) -> Option<&Offer<'a>> {
        self.offers.iter().find(|o| o.vendor_id() == vendor_id)
    }
}

/// 逐行選擇
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Pick<'a> {
    Vendor(&'a Quote),
    Uncovered(UncoveredReason),
}

impl<'a> Pick<'a> {
    pub fn vendor_id(&self) -> Option<&'a str> {
        match self {
            Pick::Vendor(quote) => Some(&quote.vendor_id),
            Pick::Uncovered(_) => None,
        }
    }
}

/// 候選報價池
///
/// 排除清單與額外的供應商過濾在建立時套用，被過濾的供應商不參與任何評分。
#[derive(Debug, Clone)]
pub(crate) struct CandidatePool<'a> {
    pub lines: Vec<LineOffers<'a>>,
}

impl<'a> CandidatePool<'a> {
    pub fn build<F>(analyses: &'a [BomLineAnalysis], strategy: &ProcurementStrategy, allow: F) -> Self
    where
        F: Fn(&str) -> bool,
    {
        let lines = analyses
            .iter()
            .map(|analysis| {
                let offers: Vec<Offer<'a>> =
                    ConsolidationAnalyzer::price_ranks(&analysis.eligible_quotes)
                        .into_iter()
                        .filter(|(quote, _)| {
                            !strategy.is_excluded(&quote.vendor_id) && allow(&quote.vendor_id)
                        })
                        .map(|(quote, rank)| Offer { quote, rank })
                        .collect();

                let empty_reason = if !offers.is_empty() {
                    None
                } else if analysis.is_data_unavailable() {
                    Some(UncoveredReason::DataUnavailable)
                } else if analysis.has_quotes() {
                    Some(UncoveredReason::VendorFiltered)
                } else {
                    Some(UncoveredReason::NoQuotes)
                };

                LineOffers {
                    analysis,
                    offers,
                    empty_reason,
                }
            })
            .collect();

        Self { lines }
    }

    pub fn coverable_count(&self) -> usize {
        self.lines.iter().filter(|l| l.is_coverable()).count()
    }

    /// 池中所有供應商（排序）
    pub fn vendor_ids(&self) -> BTreeSet<&'a str> {
        self.lines
            .iter()
            .flat_map(|l| l.offers.iter().map(Offer::vendor_id))
            .collect()
    }

    /// 各供應商的平均價格排名
    pub fn average_ranks(&self) -> BTreeMap<&'a str, f64> {
        let mut sums: BTreeMap<&'a str, (usize, usize)> = BTreeMap::new();
        for line in &self.lines {
            for offer in &line.offers {
                let entry = sums.entry(offer.vendor_id()).or_insert((0, 0));
                entry.0 += offer.rank;
                entry.1 += 1;
            }
        }
        sums.into_iter()
            .map(|(vendor, (sum, count))| (vendor, sum as f64 / count as f64))
            .collect()
    }

    /// 池中供應商按整合分析順序（可供應行數降序、成本升序）
    pub fn consolidation_order(&self, consolidation: &[VendorConsolidation]) -> Vec<&'a str> {
        let vendors = self.vendor_ids();
        let mut ordered: Vec<&'a str> = Vec::new();
        for entry in consolidation {
            if let Some(vendor) = vendors.get(entry.vendor_id.as_str()) {
                ordered.push(*vendor);
            }
        }
        // 整合分析未涵蓋的供應商按ID排在最後
        for vendor in vendors {
            if !ordered.contains(&vendor) {
                ordered.push(vendor);
            }
        }
        ordered
    }

    /// 在允許的供應商中為每行選最便宜報價；沒有允許供應商的行標記為 `fallback`
    pub fn cheapest_picks<F>(
        &self,
        strategy: &ProcurementStrategy,
        tolerance: Decimal,
        allowed: F,
        fallback: UncoveredReason,
    ) -> Vec<Pick<'a>>
    where
        F: Fn(&str) -> bool,
    {
        self.lines
            .iter()
            .map(|line| match line.empty_reason {
                Some(reason) => Pick::Uncovered(reason),
                None => pick_cheapest(line, strategy, tolerance, &allowed)
                    .map(Pick::Vendor)
                    .unwrap_or(Pick::Uncovered(fallback)),
            })
            .collect()
    }
}

/// 在允許的供應商中選最便宜的報價
///
/// 偏好供應商的報價不高於最低價 × (1 + 容差) 時優先選擇。
pub(crate) fn pick_cheapest<'a, F>(
    line: &LineOffers<'a>,
    strategy: &ProcurementStrategy,
    tolerance: Decimal,
    allowed: F,
) -> Option<&'a Quote>
where
    F: Fn(&str) -> bool,
{
    let candidates: Vec<&Offer<'a>> = line
        .offers
        .iter()
        .filter(|o| allowed(o.vendor_id()))
        .collect();
    let cheapest = *candidates.first()?;

    if strategy.preferred_vendor_ids.is_empty() {
        return Some(cheapest.quote);
    }

    let ceiling = cheapest.price() * (Decimal::ONE + tolerance);
    let preferred = candidates
        .iter()
        .take_while(|o| o.price() <= ceiling)
        .find(|o| strategy.is_preferred(o.vendor_id()));

    Some(preferred.unwrap_or(&cheapest).quote)
}

/// 選擇中使用的供應商數
pub(crate) fn vendor_count(picks: &[Pick<'_>]) -> usize {
    picks
        .iter()
        .filter_map(Pick::vendor_id)
        .collect::<BTreeSet<_>>()
        .len()
}

/// 選擇的總成本
pub(crate) fn total_cost(pool: &CandidatePool<'_>, picks: &[Pick<'_>]) -> Decimal {
    pool.lines
        .iter()
        .zip(picks)
        .filter_map(|(line, pick)| match pick {
            Pick::Vendor(quote) => Some(quote.total_for(line.analysis.quantity_needed)),
            Pick::Uncovered(_) => None,
        })
        .sum()
}

/// 限制供應商數
///
/// 保留可供應行數最多的前 N 家已用供應商（同數時分配行數多、支出大者優先），
/// 其餘行改派給保留供應商中最便宜者，無法改派的行標記為 `vendor_limit_exceeded`。
pub(crate) fn cap_vendors<'a>(
    pool: &CandidatePool<'a>,
    picks: Vec<Pick<'a>>,
    strategy: &ProcurementStrategy,
    tolerance: Decimal,
) -> Vec<Pick<'a>> {
    let Some(max) = strategy.max_vendors.map(|m| m as usize) else {
        return picks;
    };
    if vendor_count(&picks) <= max {
        return picks;
    }

    // (可供應行數, 已分配行數, 已分配支出)
    let mut usage: BTreeMap<&'a str, (usize, usize, Decimal)> = BTreeMap::new();
    for (line, pick) in pool.lines.iter().zip(&picks) {
        if let Pick::Vendor(quote) = *pick {
            let entry = usage
                .entry(quote.vendor_id.as_str())
                .or_insert((0, 0, Decimal::ZERO));
            entry.1 += 1;
            entry.2 += quote.total_for(line.analysis.quantity_needed);
        }
    }
    for line in &pool.lines {
        for offer in &line.offers {
            if let Some(entry) = usage.get_mut(offer.vendor_id()) {
                entry.0 += 1;
            }
        }
    }

    let mut ranked: Vec<(&'a str, (usize, usize, Decimal))> = usage.into_iter().collect();
    ranked.sort_by(|(va, a), (vb, b)| {
        b.0.cmp(&a.0)
            .then_with(|| b.1.cmp(&a.1))
            .then_with(|| b.2.cmp(&a.2))
            .then_with(|| va.cmp(vb))
    });
    let kept: BTreeSet<&str> = ranked.into_iter().take(max).map(|(v, _)| v).collect();

    tracing::debug!("供應商數上限 {}: 保留 {:?}", max, kept);

    pool.lines
        .iter()
        .zip(picks)
        .map(|(line, pick)| match pick {
            Pick::Vendor(quote) if kept.contains(quote.vendor_id.as_str()) => pick,
            Pick::Vendor(_) => pick_cheapest(line, strategy, tolerance, |v| kept.contains(v))
                .map(Pick::Vendor)
                .unwrap_or(Pick::Uncovered(UncoveredReason::VendorLimitExceeded)),
            uncovered => uncovered,
        })
        .collect()
}
