use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Every fundamental field the gates know about.
///
/// Percent-like fields are stored on a 0-100 scale after normalization.
/// Money amounts are absolute (not crore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    MarketCap,
    Pe,
    ForwardPe,
    Pb,
    Roe,
    Roce,
    Roa,
    DeRatio,
    CurrentRatio,
    GrossMargin,
    OperatingMargin,
    ProfitMargin,
    DividendYield,
    PayoutRatio,
    Revenue,
    TotalDebt,
    TotalCash,
    Ocf,
    Fcf,
    EarningsGrowthQoq,
    RevenueGrowthQoq,
    RevCagr3y,
    PatCagr3y,
    BookValue,
    Eps,
    InsiderPct,
    PromoterHolding,
    Beta,
    EnterpriseValue,
    EvEbitda,
    EvRevenue,
    Gnpa,
    Nnpa,
    FinancingMargin,
    FiiHolding,
    DiiHolding,
}

/// Which provider supplied the final value of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Primary,
    Secondary,
    Derived,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sourced {
    pub value: f64,
    pub source: Provenance,
}

/// Outcome of one provider fetch during aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum SourceStatus {
    Ok,
    Skipped,
    Failed(String),
}

impl SourceStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, SourceStatus::Ok)
    }
}

/// Raw output of the primary fundamentals provider.
///
/// `values` is keyed by the provider's own field names and holds numbers exactly
/// as reported (fractions and percentages mixed). Annual series are newest first.
#[derive(Debug, Clone, Default)]
pub struct PrimaryFundamentals {
    pub values: HashMap<String, f64>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub annual_revenue: Vec<f64>,
    pub annual_net_income: Vec<f64>,
}

impl PrimaryFundamentals {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied().filter(|v| v.is_finite())
    }
}

/// Merged fundamentals for one symbol. Every field is optional and tagged with
/// the provider that supplied it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundamentalSnapshot {
    metrics: BTreeMap<Metric, Sourced>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub primary_status: SourceStatus,
    pub secondary_status: SourceStatus,
}

impl Default for FundamentalSnapshot {
    fn default() -> Self {
        Self {
            metrics: BTreeMap::new(),
            sector: None,
            industry: None,
            primary_status: SourceStatus::Skipped,
            secondary_status: SourceStatus::Skipped,
        }
    }
}

impl FundamentalSnapshot {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.metrics.get(&metric).map(|s| s.value)
    }

    pub fn sourced(&self, metric: Metric) -> Option<Sourced> {
        self.metrics.get(&metric).copied()
    }

    pub fn provenance(&self, metric: Metric) -> Option<Provenance> {
        self.metrics.get(&metric).map(|s| s.source)
    }

    /// Non-finite values are treated as absent.
    pub fn set(&mut self, metric: Metric, value: f64, source: Provenance) {
        if value.is_finite() {
            self.metrics.insert(metric, Sourced { value, source });
        }
    }

    pub fn set_opt(&mut self, metric: Metric, value: Option<f64>, source: Provenance) {
        if let Some(v) = value {
            self.set(metric, v, source);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, Sourced)> + '_ {
        self.metrics.iter().map(|(m, s)| (*m, *s))
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Promoter holding when the secondary provider reported it, insider holding otherwise.
    pub fn controlling_holding(&self) -> Option<(f64, HolderKind)> {
        self.get(Metric::PromoterHolding)
            .map(|v| (v, HolderKind::Promoter))
            .or_else(|| self.get(Metric::InsiderPct).map(|v| (v, HolderKind::Insider)))
    }

    pub fn data_source_label(&self) -> &'static str {
        if self.secondary_status.is_ok() {
            "secondary + primary"
        } else {
            "primary"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolderKind {
    Promoter,
    Insider,
}

impl HolderKind {
    pub fn label(&self) -> &'static str {
        match self {
            HolderKind::Promoter => "promoter",
            HolderKind::Insider => "insider",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_finite_values_are_dropped() {
        let mut snap = FundamentalSnapshot::default();
        snap.set(Metric::Pe, f64::NAN, Provenance::Primary);
        snap.set(Metric::Pb, f64::INFINITY, Provenance::Primary);
        assert!(snap.is_empty());
    }

    #[test]
    fn test_controlling_holding_prefers_promoter() {
        let mut snap = FundamentalSnapshot::default();
        snap.set(Metric::InsiderPct, 30.0, Provenance::Primary);
        assert_eq!(snap.controlling_holding(), Some((30.0, HolderKind::Insider)));

        snap.set(Metric::PromoterHolding, 55.0, Provenance::Secondary);
        assert_eq!(snap.controlling_holding(), Some((55.0, HolderKind::Promoter)));
    }

    #[test]
    fn test_snapshot_serializes_metric_keys() {
        let mut snap = FundamentalSnapshot::default();
        snap.set(Metric::DeRatio, 0.4, Provenance::Derived);
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["metrics"]["de_ratio"]["source"], "derived");
        assert_eq!(json["secondary_status"]["status"], "skipped");
    }
}
