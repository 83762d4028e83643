use analysis_core::{Bar, InstrumentMeta, PriceHistory, ProviderError};
use chrono::DateTime;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    currency: Option<String>,
    exchange_name: Option<String>,
    long_name: Option<String>,
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Quote {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct YahooError {
    pub code: String,
    pub description: String,
}

impl YahooError {
    pub(crate) fn into_provider_error(self, symbol: &str) -> ProviderError {
        if self.code.eq_ignore_ascii_case("not found") {
            ProviderError::NotFound(symbol.to_string())
        } else {
            ProviderError::Unavailable(format!("{}: {}", self.code, self.description))
        }
    }
}

fn cell(column: &[Option<f64>], i: usize) -> Option<f64> {
    column.get(i).copied().flatten()
}

/// Decode a chart document into bars. Sessions with a missing price are dropped;
/// a missing volume counts as zero.
pub fn parse_chart(symbol: &str, body: &str) -> Result<PriceHistory, ProviderError> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(format!("chart for {}: {}", symbol, e)))?;

    if let Some(error) = response.chart.error {
        return Err(error.into_provider_error(symbol));
    }

    let data = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| ProviderError::NotFound(symbol.to_string()))?;

    let timestamps = data.timestamp.unwrap_or_default();
    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();

    let bars: Vec<Bar> = timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            Some(Bar {
                timestamp: DateTime::from_timestamp(ts, 0)?,
                open: cell(&quote.open, i)?,
                high: cell(&quote.high, i)?,
                low: cell(&quote.low, i)?,
                close: cell(&quote.close, i)?,
                volume: cell(&quote.volume, i).unwrap_or(0.0),
            })
        })
        .collect();

    let dropped = timestamps.len() - bars.len();
    if dropped > 0 {
        tracing::debug!("Dropped {} incomplete sessions for {}", dropped, symbol);
    }

    Ok(PriceHistory {
        bars,
        meta: InstrumentMeta {
            currency: data.meta.currency,
            exchange: data.meta.exchange_name,
            long_name: data.meta.long_name,
            regular_market_price: data.meta.regular_market_price,
        },
    })
}
