use crate::chart::YahooError;
use analysis_core::{PrimaryFundamentals, ProviderError};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Quote-summary modules requested for fundamentals.
pub const SUMMARY_MODULES: &str =
    "summaryDetail,defaultKeyStatistics,financialData,assetProfile,incomeStatementHistory";

/// Modules whose numeric fields are flattened into the metric map.
const NUMERIC_MODULES: [&str; 3] = ["summaryDetail", "defaultKeyStatistics", "financialData"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResponse {
    quote_summary: SummaryResult,
}

#[derive(Debug, Deserialize)]
struct SummaryResult {
    result: Option<Vec<Map<String, Value>>>,
    error: Option<YahooError>,
}

/// A field is either a bare number or a `{raw, fmt}` object.
fn numeric(value: &Value) -> Option<f64> {
    let raw = match value {
        Value::Number(n) => n.as_f64(),
        Value::Object(obj) => obj.get("raw").and_then(Value::as_f64),
        _ => None,
    };
    raw.filter(|v| v.is_finite())
}

fn text(module: Option<&Value>, key: &str) -> Option<String> {
    module?
        .get(key)?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Newest-first annual series of `key` from the income statement history.
fn annual_series(module: Option<&Value>, key: &str) -> Vec<f64> {
    module
        .and_then(|m| m.get("incomeStatementHistory"))
        .and_then(Value::as_array)
        .map(|statements| {
            statements
                .iter()
                .map_while(|s| s.get(key).and_then(numeric))
                .collect()
        })
        .unwrap_or_default()
}

pub fn parse_summary(symbol: &str, body: &str) -> Result<PrimaryFundamentals, ProviderError> {
    let response: SummaryResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(format!("summary for {}: {}", symbol, e)))?;

    if let Some(error) = response.quote_summary.error {
        return Err(error.into_provider_error(symbol));
    }

    let result = response
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| ProviderError::NotFound(symbol.to_string()))?;

    let mut out = PrimaryFundamentals::default();
    for name in NUMERIC_MODULES {
        let Some(Value::Object(module)) = result.get(name) else {
            continue;
        };
        for (key, value) in module {
            if let Some(v) = numeric(value) {
                out.values.entry(key.clone()).or_insert(v);
            }
        }
    }

    let profile = result.get("assetProfile");
    out.sector = text(profile, "sector");
    out.industry = text(profile, "industry");

    let income = result.get("incomeStatementHistory");
    out.annual_revenue = annual_series(income, "totalRevenue");
    out.annual_net_income = annual_series(income, "netIncome");

    tracing::debug!("Primary fundamentals for {}: {} fields", symbol, out.values.len());
    Ok(out)
}
