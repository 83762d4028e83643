//! Parser for the secondary provider's company profile page.
//!
//! The page has a fixed layout: a `#top-ratios` list and one section per
//! statement (`#profit-loss`, `#quarters`, `#shareholding`, `#cash-flow`,
//! `#balance-sheet`, `#ratios`), each holding `table.data-table` grids whose
//! first cell is the row label and whose later cells run oldest to newest.
//! Sections or rows that are missing or malformed are skipped individually.

use analysis_core::{round_to, ProviderError};
use scraper::{ElementRef, Html, Selector};

/// Values read from the company page. Crore amounts keep their `_cr` unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyPageMetrics {
    pub market_cap_cr: Option<f64>,
    pub pe: Option<f64>,
    pub book_value: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub roce: Option<f64>,
    pub roe: Option<f64>,
    pub current_price: Option<f64>,
    pub high_52w: Option<f64>,
    pub low_52w: Option<f64>,
    pub face_value: Option<f64>,

    pub rev_cagr_3y: Option<f64>,
    pub rev_cagr_5y: Option<f64>,
    pub pat_cagr_3y: Option<f64>,
    pub pat_cagr_5y: Option<f64>,
    pub roe_last_year: Option<f64>,

    pub opm: Option<f64>,
    pub net_profit_cr: Option<f64>,
    pub eps: Option<f64>,
    pub payout_ratio: Option<f64>,

    pub gnpa: Option<f64>,
    pub nnpa: Option<f64>,
    pub financing_margin: Option<f64>,

    pub promoter_holding: Option<f64>,
    pub fii_holding: Option<f64>,
    pub dii_holding: Option<f64>,

    pub ocf_cr: Option<f64>,

    pub borrowings_cr: Option<f64>,
    pub equity_capital_cr: Option<f64>,
    pub reserves_cr: Option<f64>,

    pub roce_annual: Option<f64>,
    pub roe_annual: Option<f64>,

    /// current price / book value
    pub pb: Option<f64>,
    /// borrowings / (equity capital + reserves)
    pub de_ratio: Option<f64>,
}

impl CompanyPageMetrics {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

struct Selectors {
    top_ratio_item: Selector,
    name: Selector,
    value: Selector,
    nowrap: Selector,
    row: Selector,
    td: Selector,
    cell: Selector,
    ranges_table: Selector,
    data_table: Selector,
}

impl Selectors {
    fn new() -> Option<Self> {
        Some(Self {
            top_ratio_item: Selector::parse("#top-ratios li").ok()?,
            name: Selector::parse("span.name").ok()?,
            value: Selector::parse("span.value").ok()?,
            nowrap: Selector::parse("span.nowrap").ok()?,
            row: Selector::parse("tr").ok()?,
            td: Selector::parse("td").ok()?,
            cell: Selector::parse("td, th").ok()?,
            ranges_table: Selector::parse("table.ranges-table").ok()?,
            data_table: Selector::parse("table.data-table").ok()?,
        })
    }
}

/// Parse a displayed number such as `₹ 1,01,378 Cr.` or `21.9 %`.
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned = text
        .trim()
        .replace('₹', "")
        .replace("Cr.", "")
        .replace('%', "")
        .replace('\n', "");
    let cleaned = cleaned.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn clean_label(raw: &str) -> String {
    raw.replace("\u{a0}+", "").replace('\u{a0}', "").trim().to_string()
}

fn nonzero(v: Option<f64>) -> Option<f64> {
    v.filter(|x| *x != 0.0)
}

/// Newest value of a row: the last cell, or the one before it when the last is blank.
fn latest_cell(cells: &[String]) -> Option<&str> {
    let last = cells.last()?;
    if !last.is_empty() {
        return Some(last);
    }
    cells.get(cells.len().checked_sub(2)?).map(String::as_str)
}

fn latest_number(cells: &[String]) -> Option<f64> {
    let value = latest_cell(cells).and_then(parse_number);
    if value.is_none() {
        tracing::debug!("Skipping unparseable row {:?}", cells.first());
    }
    value
}

fn section<'a>(doc: &'a Html, id: &str) -> Option<ElementRef<'a>> {
    let sel = Selector::parse(&format!("#{}", id)).ok()?;
    doc.select(&sel).next()
}

/// Label and cells of every row in the first data table of `section_el`.
fn first_table_rows(section_el: ElementRef<'_>, sel: &Selectors) -> Vec<(String, Vec<String>)> {
    let Some(table) = section_el.select(&sel.data_table).next() else {
        return Vec::new();
    };
    table
        .select(&sel.row)
        .filter_map(|tr| {
            let cells: Vec<String> = tr.select(&sel.cell).map(text_of).collect();
            let label = clean_label(cells.first()?);
            Some((label, cells))
        })
        .collect()
}

fn parse_top_ratios(doc: &Html, sel: &Selectors, out: &mut CompanyPageMetrics) {
    for li in doc.select(&sel.top_ratio_item) {
        let Some(name_el) = li.select(&sel.name).next() else { continue };
        let Some(val_el) = li.select(&sel.value).next().or_else(|| li.select(&sel.nowrap).next()) else {
            continue;
        };
        let name = text_of(name_el);
        let raw = text_of(val_el);
        let val = nonzero(parse_number(&raw));

        if name.contains("Market Cap") {
            out.market_cap_cr = val.or(out.market_cap_cr);
        } else if name == "Stock P/E" {
            out.pe = val.or(out.pe);
        } else if name == "Book Value" {
            out.book_value = val.or(out.book_value);
        } else if name.contains("Dividend Yield") {
            out.dividend_yield = val.or(out.dividend_yield);
        } else if name == "ROCE" {
            out.roce = val.or(out.roce);
        } else if name == "ROE" {
            out.roe = val.or(out.roe);
        } else if name.contains("Current Price") {
            out.current_price = val.or(out.current_price);
        } else if name.contains("High / Low") {
            let cleaned = raw.replace('₹', "").replace(',', "");
            let parts: Vec<&str> = cleaned.split('/').collect();
            if let [high, low] = parts.as_slice() {
                if let (Ok(h), Ok(l)) = (high.trim().parse::<f64>(), low.trim().parse::<f64>()) {
                    out.high_52w = Some(h);
                    out.low_52w = Some(l);
                }
            }
        } else if name == "Face Value" {
            out.face_value = val.or(out.face_value);
        }
    }
}

fn parse_profit_loss(doc: &Html, sel: &Selectors, out: &mut CompanyPageMetrics) {
    let Some(pl) = section(doc, "profit-loss") else { return };

    for table in pl.select(&sel.ranges_table) {
        let mut rows = table.select(&sel.row);
        let Some(header_row) = rows.next() else { continue };
        let header = text_of(header_row);

        for tr in rows {
            let cells: Vec<String> = tr.select(&sel.td).map(text_of).collect();
            let [period, value] = cells.as_slice() else { continue };
            let period = period.trim_end_matches(':');
            let value = parse_number(value.trim_end_matches('%'));

            if header.contains("Compounded Sales Growth") {
                if period.contains("3 Year") {
                    out.rev_cagr_3y = value;
                } else if period.contains("5 Year") {
                    out.rev_cagr_5y = value;
                }
            } else if header.contains("Compounded Profit Growth") {
                if period.contains("3 Year") {
                    out.pat_cagr_3y = value;
                } else if period.contains("5 Year") {
                    out.pat_cagr_5y = value;
                }
            } else if header.contains("Return on Equity") && period.contains("Last Year") {
                out.roe_last_year = value;
            }
        }
    }

    for (label, cells) in first_table_rows(pl, sel) {
        if cells.len() <= 2 {
            continue;
        }
        match label.as_str() {
            "OPM %" => out.opm = latest_number(&cells),
            "Net Profit" => out.net_profit_cr = latest_number(&cells),
            "EPS in Rs" => out.eps = latest_number(&cells),
            "Dividend Payout %" => out.payout_ratio = latest_number(&cells),
            _ => {}
        }
    }
}

fn parse_quarters(doc: &Html, sel: &Selectors, out: &mut CompanyPageMetrics) {
    let Some(q) = section(doc, "quarters") else { return };
    for (label, cells) in first_table_rows(q, sel) {
        if cells.len() <= 1 {
            continue;
        }
        match label.as_str() {
            "Gross NPA %" => out.gnpa = latest_number(&cells),
            "Net NPA %" => out.nnpa = latest_number(&cells),
            "Financing Margin %" => out.financing_margin = latest_number(&cells),
            _ => {}
        }
    }
}

fn parse_shareholding(doc: &Html, sel: &Selectors, out: &mut CompanyPageMetrics) {
    let Some(shp) = section(doc, "shareholding") else { return };
    for (label, cells) in first_table_rows(shp, sel) {
        if cells.len() <= 1 {
            continue;
        }
        // Latest quarter is always the last column here.
        let value = cells.last().and_then(|c| parse_number(c));
        match label.as_str() {
            "Promoters" => out.promoter_holding = value,
            "FIIs" => out.fii_holding = value,
            "DIIs" => out.dii_holding = value,
            _ => {}
        }
    }
}

fn parse_cash_flow(doc: &Html, sel: &Selectors, out: &mut CompanyPageMetrics) {
    let Some(cf) = section(doc, "cash-flow") else { return };
    for (label, cells) in first_table_rows(cf, sel) {
        if cells.len() > 1 && label.contains("Cash from Operating") {
            out.ocf_cr = latest_number(&cells);
        }
    }
}

fn parse_balance_sheet(doc: &Html, sel: &Selectors, out: &mut CompanyPageMetrics) {
    let Some(bs) = section(doc, "balance-sheet") else { return };
    for (label, cells) in first_table_rows(bs, sel) {
        if cells.len() <= 1 {
            continue;
        }
        match label.as_str() {
            "Borrowings" => out.borrowings_cr = latest_number(&cells),
            "Equity Capital" => out.equity_capital_cr = latest_number(&cells),
            "Reserves" => out.reserves_cr = latest_number(&cells),
            _ => {}
        }
    }

    let total_equity = out.equity_capital_cr.unwrap_or(0.0) + out.reserves_cr.unwrap_or(0.0);
    if let Some(borrowings) = out.borrowings_cr {
        if total_equity > 0.0 {
            out.de_ratio = Some(round_to(borrowings / total_equity, 2));
        }
    }
}

fn parse_ratios(doc: &Html, sel: &Selectors, out: &mut CompanyPageMetrics) {
    let Some(ratios) = section(doc, "ratios") else { return };
    for (label, cells) in first_table_rows(ratios, sel) {
        if cells.len() <= 1 {
            continue;
        }
        match label.as_str() {
            "ROCE %" => out.roce_annual = latest_number(&cells),
            "ROE %" => out.roe_annual = latest_number(&cells),
            _ => {}
        }
    }
}

/// Parse a company profile page. Fails only when nothing at all could be read.
pub fn parse_company_page(html: &str) -> Result<CompanyPageMetrics, ProviderError> {
    let sel = Selectors::new().ok_or_else(|| ProviderError::Parse("invalid selector".to_string()))?;
    let doc = Html::parse_document(html);
    let mut out = CompanyPageMetrics::default();

    parse_top_ratios(&doc, &sel, &mut out);
    parse_profit_loss(&doc, &sel, &mut out);
    parse_quarters(&doc, &sel, &mut out);
    parse_shareholding(&doc, &sel, &mut out);
    parse_cash_flow(&doc, &sel, &mut out);
    parse_balance_sheet(&doc, &sel, &mut out);
    parse_ratios(&doc, &sel, &mut out);

    if let (Some(price), Some(book)) = (out.current_price, out.book_value) {
        if book > 0.0 {
            out.pb = Some(round_to(price / book, 2));
        }
    }

    if out.is_empty() {
        return Err(ProviderError::Parse("no recognizable sections on company page".to_string()));
    }
    Ok(out)
}
