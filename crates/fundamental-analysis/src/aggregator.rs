use crate::company_page::{parse_company_page, CompanyPageMetrics};
use crate::normalize;
use analysis_core::{
    round_to, FundamentalSnapshot, Metric, PrimaryFundamentals, PrimaryFundamentalsProvider,
    Provenance, SecondaryFundamentalsProvider, SourceStatus, Symbol,
};
use std::sync::Arc;

/// Crore to absolute units.
const CRORE: f64 = 1e7;

/// Years used for the primary-provider growth CAGR.
const CAGR_YEARS: usize = 3;

/// When a secondary value replaces the merged value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideWhen {
    Present,
    NonZero,
}

/// One row of the secondary-over-primary precedence table.
#[derive(Clone, Copy)]
pub struct PrecedenceRule {
    pub metric: Metric,
    pub read: fn(&CompanyPageMetrics) -> Option<f64>,
    pub scale: f64,
    pub when: OverrideWhen,
    pub provenance: Provenance,
}

impl PrecedenceRule {
    fn value(&self, page: &CompanyPageMetrics) -> Option<f64> {
        let raw = (self.read)(page)?;
        match self.when {
            OverrideWhen::NonZero if raw == 0.0 => None,
            _ => Some(raw * self.scale),
        }
    }
}

macro_rules! rule {
    ($metric:ident <- $field:ident, $when:ident) => {
        rule!($metric <- $field, $when, 1.0, Secondary)
    };
    ($metric:ident <- $field:ident, $when:ident, $scale:expr, $prov:ident) => {
        PrecedenceRule {
            metric: Metric::$metric,
            read: |m| m.$field,
            scale: $scale,
            when: OverrideWhen::$when,
            provenance: Provenance::$prov,
        }
    };
}

/// Fields where a secondary value wins, applied in order (later rows win ties).
/// Fields not listed always keep the primary value.
pub static SECONDARY_PRECEDENCE: [PrecedenceRule; 21] = [
    rule!(Pe <- pe, NonZero),
    rule!(Pb <- pb, NonZero, 1.0, Derived),
    rule!(Roe <- roe, Present),
    rule!(Roce <- roce, Present),
    rule!(Roce <- roce_annual, Present),
    rule!(BookValue <- book_value, NonZero),
    rule!(DividendYield <- dividend_yield, Present),
    rule!(Eps <- eps, NonZero),
    rule!(MarketCap <- market_cap_cr, NonZero, CRORE, Secondary),
    rule!(DeRatio <- de_ratio, Present, 1.0, Derived),
    rule!(RevCagr3y <- rev_cagr_3y, Present),
    rule!(PatCagr3y <- pat_cagr_3y, Present),
    rule!(OperatingMargin <- opm, Present),
    rule!(PromoterHolding <- promoter_holding, Present),
    rule!(InsiderPct <- promoter_holding, Present),
    rule!(Ocf <- ocf_cr, Present, CRORE, Secondary),
    rule!(Gnpa <- gnpa, Present),
    rule!(Nnpa <- nnpa, Present),
    rule!(FinancingMargin <- financing_margin, Present),
    rule!(FiiHolding <- fii_holding, Present),
    rule!(DiiHolding <- dii_holding, Present),
];

/// Apply `rules` to `snapshot`, returning how many fields were overridden.
pub fn apply_precedence(
    snapshot: &mut FundamentalSnapshot,
    page: &CompanyPageMetrics,
    rules: &[PrecedenceRule],
) -> usize {
    let mut applied = 0;
    for rule in rules {
        if let Some(value) = rule.value(page) {
            snapshot.set(rule.metric, value, rule.provenance);
            applied += 1;
        }
    }
    applied
}

/// Company-page slug for a symbol, or `None` when the symbol is not eligible.
///
/// Domestic suffixes are stripped; bare tickers are tried as-is; anything
/// carrying another suffix or an index marker is skipped.
pub fn secondary_slug(symbol: &str) -> Option<String> {
    let s = symbol.trim().to_uppercase();
    if let Some(base) = s.strip_suffix(".NS").or_else(|| s.strip_suffix(".BO")) {
        return Some(base.to_string());
    }
    if !s.is_empty() && !s.contains('.') && !s.contains('^') {
        return Some(s);
    }
    None
}

/// Compound annual growth between the newest value and the one `years` back
/// (or the oldest available). Both ends must be positive.
pub fn cagr(newest_first: &[f64], years: usize) -> Option<f64> {
    if newest_first.len() < 2 || years == 0 {
        return None;
    }
    let n = years.min(newest_first.len() - 1);
    let latest = newest_first[0];
    let past = newest_first[n];
    if latest > 0.0 && past > 0.0 {
        Some(round_to(((latest / past).powf(1.0 / n as f64) - 1.0) * 100.0, 1))
    } else {
        None
    }
}

/// Map primary-provider fields into a snapshot, normalizing percent-like values.
pub fn primary_snapshot(primary: &PrimaryFundamentals) -> FundamentalSnapshot {
    use Metric::*;

    let mut snap = FundamentalSnapshot::default();
    snap.sector = primary.sector.clone();
    snap.industry = primary.industry.clone();
    snap.primary_status = SourceStatus::Ok;
    let p = Provenance::Primary;
    let get = |key: &str| primary.get(key);

    let direct = [
        (MarketCap, "marketCap"),
        (Pe, "trailingPE"),
        (ForwardPe, "forwardPE"),
        (Pb, "priceToBook"),
        (CurrentRatio, "currentRatio"),
        (PayoutRatio, "payoutRatio"),
        (Revenue, "totalRevenue"),
        (TotalDebt, "totalDebt"),
        (TotalCash, "totalCash"),
        (Ocf, "operatingCashflow"),
        (Fcf, "freeCashflow"),
        (BookValue, "bookValue"),
        (Eps, "trailingEps"),
        (Beta, "beta"),
        (EnterpriseValue, "enterpriseValue"),
        (EvEbitda, "enterpriseToEbitda"),
        (EvRevenue, "enterpriseToRevenue"),
    ];
    for (metric, key) in direct {
        snap.set_opt(metric, get(key), p);
    }

    let percent = [
        (Roe, "returnOnEquity"),
        (Roa, "returnOnAssets"),
        (GrossMargin, "grossMargins"),
        (OperatingMargin, "operatingMargins"),
        (ProfitMargin, "profitMargins"),
        (EarningsGrowthQoq, "earningsGrowth"),
        (RevenueGrowthQoq, "revenueGrowth"),
    ];
    for (metric, key) in percent {
        snap.set_opt(metric, get(key).map(normalize::ratio_percent), p);
    }

    snap.set_opt(DeRatio, get("debtToEquity").map(normalize::debt_to_equity), p);
    snap.set_opt(DividendYield, get("dividendYield").and_then(normalize::dividend_yield), p);
    snap.set_opt(InsiderPct, get("heldPercentInsiders").map(normalize::holding_percent), p);
    snap.set_opt(RevCagr3y, cagr(&primary.annual_revenue, CAGR_YEARS), p);
    snap.set_opt(PatCagr3y, cagr(&primary.annual_net_income, CAGR_YEARS), p);

    snap
}

/// Merges the primary and (optional) secondary fundamentals providers.
pub struct FundamentalsAggregator {
    primary: Arc<dyn PrimaryFundamentalsProvider>,
    secondary: Option<Arc<dyn SecondaryFundamentalsProvider>>,
}

impl FundamentalsAggregator {
    pub fn new(
        primary: Arc<dyn PrimaryFundamentalsProvider>,
        secondary: Option<Arc<dyn SecondaryFundamentalsProvider>>,
    ) -> Self {
        Self { primary, secondary }
    }

    /// Never fails: provider problems are recorded in the snapshot's source
    /// statuses and the affected fields stay absent.
    pub async fn aggregate(&self, symbol: &Symbol, current_price: Option<f64>) -> FundamentalSnapshot {
        let mut snapshot = match self.primary.fetch_fundamentals(symbol.as_str()).await {
            Ok(primary) => primary_snapshot(&primary),
            Err(e) => {
                tracing::warn!("Primary fundamentals unavailable for {}: {}", symbol, e);
                let mut snap = FundamentalSnapshot::default();
                snap.primary_status = SourceStatus::Failed(e.to_string());
                snap
            }
        };

        snapshot.secondary_status = match (&self.secondary, secondary_slug(symbol.as_str())) {
            (Some(secondary), Some(slug)) => {
                let page = secondary
                    .fetch_company_page(&slug)
                    .await
                    .and_then(|html| parse_company_page(&html));
                match page {
                    Ok(page) => {
                        let applied = apply_precedence(&mut snapshot, &page, &SECONDARY_PRECEDENCE);
                        tracing::debug!("Secondary page for {} overrode {} fields", slug, applied);
                        SourceStatus::Ok
                    }
                    Err(e) => {
                        tracing::warn!("Secondary fundamentals unavailable for {}: {}", slug, e);
                        SourceStatus::Failed(e.to_string())
                    }
                }
            }
            _ => SourceStatus::Skipped,
        };

        if snapshot.get(Metric::Pb).is_none() {
            if let (Some(price), Some(book)) = (current_price, snapshot.get(Metric::BookValue)) {
                if book > 0.0 {
                    snapshot.set(Metric::Pb, round_to(price / book, 2), Provenance::Derived);
                }
            }
        }

        tracing::info!(
            "Fundamentals for {}: {} fields from {}",
            symbol,
            snapshot.len(),
            snapshot.data_source_label()
        );
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::ProviderError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedPrimary(Result<PrimaryFundamentals, ProviderError>);

    #[async_trait]
    impl PrimaryFundamentalsProvider for FixedPrimary {
        async fn fetch_fundamentals(&self, _symbol: &str) -> Result<PrimaryFundamentals, ProviderError> {
            self.0.clone()
        }
    }

    struct FixedPage {
        html: Result<String, ProviderError>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SecondaryFundamentalsProvider for FixedPage {
        async fn fetch_company_page(&self, _slug: &str) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.html.clone()
        }
    }

    fn primary() -> PrimaryFundamentals {
        let values: HashMap<String, f64> = [
            ("trailingPE", 30.0),
            ("priceToBook", 9.0),
            ("returnOnEquity", 0.18),
            ("debtToEquity", 45.0),
            ("operatingMargins", 0.2),
            ("dividendYield", 0.011),
            ("heldPercentInsiders", 0.6),
            ("operatingCashflow", 2e9),
            ("bookValue", 100.0),
            ("marketCap", 5e11),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        PrimaryFundamentals {
            values,
            sector: Some("Technology".into()),
            industry: Some("Information Technology Services".into()),
            annual_revenue: vec![1331.0, 1100.0, 1000.0, 900.0],
            annual_net_income: vec![200.0, -10.0],
        }
    }

    const PAGE: &str = r#"
        <ul id="top-ratios">
          <li><span class="name">Stock P/E</span><span class="value">25</span></li>
          <li><span class="name">Current Price</span><span class="value">400</span></li>
          <li><span class="name">Book Value</span><span class="value">80</span></li>
          <li><span class="name">ROCE</span><span class="value">19</span></li>
        </ul>
        <div id="ratios"><table class="data-table">
          <tr><td>ROCE %</td><td>20%</td><td>22%</td></tr>
        </table></div>
        <div id="shareholding"><table class="data-table">
          <tr><td>Promoters</td><td>60%</td><td>58%</td></tr>
        </table></div>
        <div id="balance-sheet"><table class="data-table">
          <tr><td>Equity Capital</td><td>50</td></tr>
          <tr><td>Reserves</td><td>150</td></tr>
          <tr><td>Borrowings</td><td>20</td></tr>
        </table></div>
        <div id="cash-flow"><table class="data-table">
          <tr><td>Cash from Operating Activity</td><td>-120</td><td>300</td></tr>
        </table></div>
    "#;

    fn aggregator(
        primary: Result<PrimaryFundamentals, ProviderError>,
        page: Result<String, ProviderError>,
    ) -> (FundamentalsAggregator, Arc<FixedPage>) {
        let secondary = Arc::new(FixedPage { html: page, calls: AtomicUsize::new(0) });
        let agg = FundamentalsAggregator::new(
            Arc::new(FixedPrimary(primary)),
            Some(secondary.clone() as Arc<dyn SecondaryFundamentalsProvider>),
        );
        (agg, secondary)
    }

    #[test]
    fn test_secondary_slug() {
        assert_eq!(secondary_slug("tcs.ns"), Some("TCS".into()));
        assert_eq!(secondary_slug("HDFCBANK.BO"), Some("HDFCBANK".into()));
        assert_eq!(secondary_slug("AAPL"), Some("AAPL".into()));
        assert_eq!(secondary_slug("BRK.B"), None);
        assert_eq!(secondary_slug("^NSEI"), None);
    }

    #[test]
    fn test_cagr() {
        assert_eq!(cagr(&[1331.0, 1100.0, 1000.0, 900.0], 3), Some(13.9));
        // fewer years than requested uses what is there
        assert_eq!(cagr(&[121.0, 110.0, 100.0], 3), Some(10.0));
        assert_eq!(cagr(&[200.0, -10.0], 3), None);
        assert_eq!(cagr(&[200.0], 3), None);
    }

    #[test]
    fn test_primary_snapshot_normalizes() {
        let snap = primary_snapshot(&primary());
        assert_eq!(snap.get(Metric::Roe), Some(18.0));
        assert_eq!(snap.get(Metric::DeRatio), Some(0.45));
        assert_eq!(snap.get(Metric::OperatingMargin), Some(20.0));
        assert_eq!(snap.get(Metric::DividendYield), Some(1.1));
        assert_eq!(snap.get(Metric::InsiderPct), Some(60.0));
        assert_eq!(snap.get(Metric::RevCagr3y), Some(13.9));
        assert_eq!(snap.get(Metric::PatCagr3y), None);
        assert_eq!(snap.get(Metric::Roce), None);
    }

    #[test]
    fn test_precedence_table_independent_of_network() {
        let mut snap = primary_snapshot(&primary());
        let page = CompanyPageMetrics {
            pe: Some(0.0),
            roe: Some(0.0),
            market_cap_cr: Some(1000.0),
            de_ratio: Some(0.1),
            ..CompanyPageMetrics::default()
        };
        apply_precedence(&mut snap, &page, &SECONDARY_PRECEDENCE);

        // zero P/E does not override; zero ROE does
        assert_eq!(snap.get(Metric::Pe), Some(30.0));
        assert_eq!(snap.get(Metric::Roe), Some(0.0));
        assert_eq!(snap.provenance(Metric::Roe), Some(Provenance::Secondary));
        assert_eq!(snap.get(Metric::MarketCap), Some(1e10));
        assert_eq!(snap.provenance(Metric::DeRatio), Some(Provenance::Derived));
        // fields outside the table keep primary values
        assert_eq!(snap.provenance(Metric::DividendYield), Some(Provenance::Primary));
    }

    #[tokio::test]
    async fn test_aggregate_merges_secondary() {
        let (agg, secondary) = aggregator(Ok(primary()), Ok(PAGE.to_string()));
        let snap = agg.aggregate(&Symbol::new("INFY.NS"), None).await;

        assert_eq!(secondary.calls.load(Ordering::SeqCst), 1);
        assert_eq!(snap.secondary_status, SourceStatus::Ok);
        assert_eq!(snap.data_source_label(), "secondary + primary");
        assert_eq!(snap.get(Metric::Pe), Some(25.0));
        assert_eq!(snap.get(Metric::Pb), Some(5.0));
        assert_eq!(snap.provenance(Metric::Pb), Some(Provenance::Derived));
        // annual ratios row wins over the top-ratio ROCE
        assert_eq!(snap.get(Metric::Roce), Some(22.0));
        assert_eq!(snap.get(Metric::PromoterHolding), Some(58.0));
        assert_eq!(snap.get(Metric::InsiderPct), Some(58.0));
        assert_eq!(snap.get(Metric::DeRatio), Some(0.1));
        assert_eq!(snap.get(Metric::Ocf), Some(300.0 * 1e7));
        // not in the table
        assert_eq!(snap.get(Metric::DividendYield), Some(1.1));
        assert_eq!(snap.provenance(Metric::Roe), Some(Provenance::Primary));
    }

    #[tokio::test]
    async fn test_aggregate_degrades_when_secondary_unavailable() {
        let (agg, _) = aggregator(
            Ok(primary()),
            Err(ProviderError::Unavailable("HTTP 503".into())),
        );
        let snap = agg.aggregate(&Symbol::new("INFY.NS"), None).await;

        assert!(matches!(snap.secondary_status, SourceStatus::Failed(_)));
        assert_eq!(snap.primary_status, SourceStatus::Ok);
        assert_eq!(snap.get(Metric::Pe), Some(30.0));
        assert_eq!(snap.data_source_label(), "primary");
    }

    #[tokio::test]
    async fn test_ineligible_symbol_skips_secondary() {
        let (agg, secondary) = aggregator(Ok(primary()), Ok(PAGE.to_string()));
        let snap = agg.aggregate(&Symbol::new("BRK.B"), None).await;

        assert_eq!(secondary.calls.load(Ordering::SeqCst), 0);
        assert_eq!(snap.secondary_status, SourceStatus::Skipped);
    }

    #[tokio::test]
    async fn test_primary_failure_keeps_secondary_fields() {
        let (agg, _) = aggregator(Err(ProviderError::NotFound("X".into())), Ok(PAGE.to_string()));
        let snap = agg.aggregate(&Symbol::new("X"), Some(410.0)).await;

        assert!(matches!(snap.primary_status, SourceStatus::Failed(_)));
        assert_eq!(snap.get(Metric::Pe), Some(25.0));
        assert_eq!(snap.get(Metric::Roe), None);
    }

    #[tokio::test]
    async fn test_pb_derived_from_price_when_not_reported() {
        let mut p = primary();
        p.values.remove("priceToBook");
        let agg = FundamentalsAggregator::new(Arc::new(FixedPrimary(Ok(p))), None);
        let snap = agg.aggregate(&Symbol::new("AAPL"), Some(250.0)).await;

        assert_eq!(snap.get(Metric::Pb), Some(2.5));
        assert_eq!(snap.provenance(Metric::Pb), Some(Provenance::Derived));
        assert_eq!(snap.secondary_status, SourceStatus::Skipped);
    }
}
