//! Fundamental side of the gate pipeline: provider merging, sector
//! classification, the quality checklist (Gate 1), valuation lenses (Gate 2)
//! and red-flag detection.

pub mod aggregator;
pub mod checklist;
pub mod company_page;
pub mod normalize;
pub mod red_flags;
pub mod sector;
pub mod valuation;

pub use aggregator::{apply_precedence, secondary_slug, FundamentalsAggregator, PrecedenceRule, SECONDARY_PRECEDENCE};
pub use checklist::{fundamental_checklist, fundamental_gate, FUNDAMENTAL_CRITERIA};
pub use company_page::{parse_company_page, CompanyPageMetrics};
pub use red_flags::detect_red_flags;
pub use sector::classify;
pub use valuation::assess_valuation;
