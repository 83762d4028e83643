use analysis_core::SectorCategory;

const BANKING_KEYWORDS: [&str; 4] = ["bank", "banking", "banks—regional", "banks—diversified"];

const NBFC_KEYWORDS: [&str; 8] = [
    "credit services",
    "financial conglomerates",
    "mortgage finance",
    "housing finance",
    "infrastructure finance",
    "power finance",
    "financial data",
    "capital markets",
];

/// Classify from the provider's sector and industry labels (case-insensitive).
pub fn classify(sector: Option<&str>, industry: Option<&str>) -> SectorCategory {
    let industry = industry.unwrap_or_default().to_lowercase();
    let sector = sector.unwrap_or_default().to_lowercase();

    if BANKING_KEYWORDS.iter().any(|kw| industry.contains(kw)) {
        return SectorCategory::Banking;
    }
    if NBFC_KEYWORDS.iter().any(|kw| industry.contains(kw)) {
        return SectorCategory::Nbfc;
    }
    if sector.contains("financial") && (industry.contains("bank") || industry.contains("credit")) {
        return SectorCategory::Nbfc;
    }
    SectorCategory::General
}
