//! Raw response tables: value counts, descriptive statistics and per-item response tables.
//!
//! Nothing here recodes the data. Special codes are counted as they appear, except in
//! [`descriptive_stats`] which leaves out refused, don't know and not applicable.
use crate::{
    util::{pct, pct_cell},
    value::{DONT_KNOW, NOT_APPLICABLE, REFUSED},
    Survey, Value,
};
use qu::ick_use::*;
use serde::Serialize;
use statrs::statistics::{Data, Distribution, Max, Min, OrderStatistics};
use std::{cmp::Ordering, collections::BTreeMap};
use term_data_table::{Cell, Row, Table};

const MISSING_LABEL: &str = "Missing";

/// A fixed set of response codes and what they mean.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ResponseCodes {
    pub name: &'static str,
    pub codes: &'static [(i64, &'static str)],
}

pub static YES_NO: ResponseCodes = ResponseCodes {
    name: "yes/no",
    codes: &[
        (1, "Yes"),
        (2, "No"),
        (777, "Refused"),
        (999, "Not applicable"),
    ],
};

pub static MENTIONED: ResponseCodes = ResponseCodes {
    name: "mentioned",
    codes: &[(0, "Not mentioned"), (1, "Mentioned"), (999, "Not applicable")],
};

pub static LIKERT: ResponseCodes = ResponseCodes {
    name: "likert",
    codes: &[
        (0, "Strongly disagree"),
        (1, "Disagree"),
        (2, "Neither"),
        (3, "Agree"),
        (4, "Strongly agree"),
        (777, "Refused"),
        (999, "Not applicable"),
    ],
};

pub static PASS_FAIL: ResponseCodes = ResponseCodes {
    name: "pass/fail",
    codes: &[
        (1, "Pass"),
        (2, "Fail"),
        (777, "X / Refused"),
        (999, "Not applicable"),
    ],
};

pub static LUBBEN: ResponseCodes = ResponseCodes {
    name: "lubben",
    codes: &[
        (1, "None"),
        (2, "One"),
        (3, "Two"),
        (4, "Three or four"),
        (5, "Five to eight"),
        (6, "Nine or more"),
        (777, "Refused"),
        (999, "Not applicable"),
    ],
};

impl ResponseCodes {
    fn header(&self) -> impl Iterator<Item = String> + '_ {
        self.codes
            .iter()
            .map(|(code, label)| format!("{} ({})", label, code))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCount {
    pub response: String,
    pub count: usize,
    pub percent: Option<f64>,
}

/// How often each distinct value appears in a column, missing included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCounts {
    pub column: String,
    pub total: usize,
    pub rows: Vec<ValueCount>,
}

impl ValueCounts {
    pub fn term_table(&self) -> Table<'static> {
        let mut table = Table::new().with_row(
            Row::new()
                .with_cell(Cell::from("Response"))
                .with_cell(Cell::from("Count"))
                .with_cell(Cell::from("Percentage")),
        );
        if self.rows.is_empty() {
            return table.with_row(Row::new().with_cell(Cell::from("(No data)")));
        }
        for row in &self.rows {
            table.add_row(
                Row::new()
                    .with_cell(Cell::from(row.response.clone()))
                    .with_cell(Cell::from(row.count.to_string()))
                    .with_cell(Cell::from(pct_cell(row.percent))),
            );
        }
        table
    }
}

/// Numbers in numeric order, then text, then missing.
fn cmp_values(left: &Value, right: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Int(_) | Value::Float(_) => 0,
            Value::Text(_) => 1,
            Value::Missing => 2,
        }
    }
    match (left.as_f64(), right.as_f64(), left, right) {
        (Some(l), Some(r), Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            l.total_cmp(&r)
        }
        (_, _, Value::Text(l), Value::Text(r)) => l.cmp(r),
        _ => rank(left).cmp(&rank(right)),
    }
}

/// Every distinct value of `column` with its count. Percentages are over all records.
///
/// An absent column gives no rows.
pub fn value_counts(survey: &Survey, column: &str) -> ValueCounts {
    let mut seen: Vec<(Value, usize)> = vec![];
    if survey.has_column(column) {
        for value in survey.column(column) {
            match seen.iter_mut().find(|(v, _)| v == value) {
                Some((_, count)) => *count += 1,
                None => seen.push((value.clone(), 1)),
            }
        }
    } else {
        event!(Level::WARN, "column {} is not in the dataset", column);
    }
    seen.sort_by(|(l, _), (r, _)| cmp_values(l, r));
    ValueCounts {
        column: column.to_string(),
        total: survey.len(),
        rows: seen
            .into_iter()
            .map(|(value, count)| ValueCount {
                response: value.to_string(),
                count,
                percent: pct(count, survey.len()),
            })
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum ResponseKey {
    /// Position in the requested order.
    Ordered(usize, i64),
    Code(i64),
    Other(String),
    Missing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappedValueCount {
    pub response: String,
    pub code: Option<i64>,
    pub count: usize,
    pub percent: Option<f64>,
}

/// Value counts with each code given its label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappedValueCounts {
    pub column: String,
    pub total: usize,
    pub rows: Vec<MappedValueCount>,
}

impl MappedValueCounts {
    pub fn term_table(&self) -> Table<'static> {
        let mut table = Table::new().with_row(
            Row::new()
                .with_cell(Cell::from("Response"))
                .with_cell(Cell::from("Code"))
                .with_cell(Cell::from("Count"))
                .with_cell(Cell::from("Percentage")),
        );
        if self.rows.is_empty() {
            return table.with_row(Row::new().with_cell(Cell::from("(No data)")));
        }
        for row in &self.rows {
            table.add_row(
                Row::new()
                    .with_cell(Cell::from(row.response.clone()))
                    .with_cell(Cell::from(
                        row.code.map(|c| c.to_string()).unwrap_or_default(),
                    ))
                    .with_cell(Cell::from(row.count.to_string()))
                    .with_cell(Cell::from(pct_cell(row.percent))),
            );
        }
        table
    }
}

/// Value counts for a coded column, with labels.
///
/// Codes in `order` come first in that order, then any other integer codes numerically, then
/// anything that isn't an integer code. Missing is last. Codes without a label are shown as
/// `Other: <code>`.
pub fn mapped_value_counts(
    survey: &Survey,
    column: &str,
    labels: &[(i64, &str)],
    order: &[i64],
) -> MappedValueCounts {
    let mut counts: BTreeMap<ResponseKey, usize> = BTreeMap::new();
    if survey.has_column(column) {
        for value in survey.column(column) {
            let key = match (value, value.as_code()) {
                (Value::Missing, _) => ResponseKey::Missing,
                (_, Some(code)) => match order.iter().position(|c| *c == code) {
                    Some(idx) => ResponseKey::Ordered(idx, code),
                    None => ResponseKey::Code(code),
                },
                (other, None) => ResponseKey::Other(other.to_string()),
            };
            *counts.entry(key).or_default() += 1;
        }
    } else {
        event!(Level::WARN, "column {} is not in the dataset", column);
    }

    let label = |code: i64| match labels.iter().find(|(c, _)| *c == code) {
        Some((_, label)) => label.to_string(),
        None => format!("Other: {}", code),
    };
    let rows = counts
        .into_iter()
        .map(|(key, count)| {
            let (response, code) = match key {
                ResponseKey::Ordered(_, code) | ResponseKey::Code(code) => (label(code), Some(code)),
                ResponseKey::Other(text) => (format!("Other: {}", text), None),
                ResponseKey::Missing => (MISSING_LABEL.to_string(), None),
            };
            MappedValueCount {
                response,
                code,
                count,
                percent: pct(count, survey.len()),
            }
        })
        .collect();
    MappedValueCounts {
        column: column.to_string(),
        total: survey.len(),
        rows,
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation. `None` with fewer than 2 values.
    pub std_dev: Option<f64>,
    pub min: f64,
    pub p25: f64,
    pub p75: f64,
    pub max: f64,
}

/// Summary statistics for a numeric column, leaving out refused, don't know and not applicable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptiveStats {
    pub column: String,
    pub total: usize,
    pub valid: usize,
    pub missing: usize,
    /// `None` if there are no valid values.
    pub summary: Option<Summary>,
}

impl DescriptiveStats {
    pub fn term_table(&self) -> Table<'static> {
        fn num(value: Option<f64>) -> String {
            value.map(|v| format!("{:.2}", v)).unwrap_or_default()
        }
        let summary = self.summary.as_ref();
        let cells: [(&str, String); 10] = [
            ("Total N", self.total.to_string()),
            ("Valid N", self.valid.to_string()),
            ("Missing/Invalid N", self.missing.to_string()),
            ("Mean", num(summary.map(|s| s.mean))),
            ("Median", num(summary.map(|s| s.median))),
            ("Std", num(summary.and_then(|s| s.std_dev))),
            ("Min", num(summary.map(|s| s.min))),
            ("P25", num(summary.map(|s| s.p25))),
            ("P75", num(summary.map(|s| s.p75))),
            ("Max", num(summary.map(|s| s.max))),
        ];
        let mut header = Row::new();
        let mut row = Row::new();
        for (label, value) in cells {
            header = header.with_cell(Cell::from(label));
            row = row.with_cell(Cell::from(value));
        }
        Table::new().with_row(header).with_row(row)
    }
}

const INVALID_CODES: [i64; 3] = [REFUSED, DONT_KNOW, NOT_APPLICABLE];

/// The `q` quantile of sorted, non-empty `values`, interpolating linearly between the two
/// nearest ranks.
fn linear_quantile(values: &[f64], q: f64) -> f64 {
    let pos = (values.len() - 1) as f64 * q;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(values.len() - 1);
    values[lo] + (pos - lo as f64) * (values[hi] - values[lo])
}

pub fn descriptive_stats(survey: &Survey, column: &str) -> DescriptiveStats {
    let mut values: Vec<f64> = if survey.has_column(column) {
        survey
            .column(column)
            .filter_map(Value::as_f64)
            .filter(|v| !INVALID_CODES.iter().any(|code| *code as f64 == *v))
            .collect()
    } else {
        event!(Level::WARN, "column {} is not in the dataset", column);
        vec![]
    };
    let total = survey.len();
    let valid = values.len();
    values.sort_by(f64::total_cmp);
    let summary = if values.is_empty() {
        None
    } else {
        let p25 = linear_quantile(&values, 0.25);
        let p75 = linear_quantile(&values, 0.75);
        let mut data = Data::new(values);
        Some(Summary {
            mean: data.mean().unwrap_or(f64::NAN),
            median: OrderStatistics::median(&mut data),
            std_dev: data.std_dev().filter(|sd| sd.is_finite()),
            min: data.min(),
            p25,
            p75,
            max: data.max(),
        })
    };
    DescriptiveStats {
        column: column.to_string(),
        total,
        valid,
        missing: total - valid,
        summary,
    }
}

/// One row of an [`ItemResponseTable`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemResponses {
    pub item: String,
    /// Parallel to the table's response codes.
    pub counts: Vec<usize>,
    pub total: usize,
}

/// How each of a group of items was answered, one row per item and a final total row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemResponseTable {
    #[serde(skip)]
    codes: ResponseCodes,
    pub items: Vec<ItemResponses>,
    pub total: ItemResponses,
}

impl ItemResponseTable {
    /// `items` is `(column, label)` pairs. Values that aren't one of the response codes are not
    /// counted.
    pub fn build(survey: &Survey, items: &[(&str, &str)], codes: &ResponseCodes) -> Self {
        let items: Vec<ItemResponses> = items
            .iter()
            .map(|(column, label)| {
                let counts: Vec<usize> = codes
                    .codes
                    .iter()
                    .map(|(code, _)| {
                        survey
                            .column(column)
                            .filter(|v| v.as_code() == Some(*code))
                            .count()
                    })
                    .collect();
                ItemResponses {
                    item: label.to_string(),
                    total: counts.iter().sum(),
                    counts,
                }
            })
            .collect();
        let counts: Vec<usize> = (0..codes.codes.len())
            .map(|idx| items.iter().map(|item| item.counts[idx]).sum())
            .collect();
        let total = ItemResponses {
            item: "Total".into(),
            total: counts.iter().sum(),
            counts,
        };
        ItemResponseTable {
            codes: *codes,
            items,
            total,
        }
    }

    pub fn term_table(&self) -> Table<'static> {
        let mut header = Row::new().with_cell(Cell::from("Question"));
        for label in self.codes.header() {
            header = header.with_cell(Cell::from(label));
        }
        let mut table = Table::new().with_row(header.with_cell(Cell::from("Total")));
        for item in self.items.iter().chain(Some(&self.total)) {
            let mut row = Row::new().with_cell(Cell::from(item.item.clone()));
            for count in &item.counts {
                row = row.with_cell(Cell::from(count.to_string()));
            }
            table.add_row(row.with_cell(Cell::from(item.total.to_string())));
        }
        table
    }
}

/// The share of each response code across every cell of a group of columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseSummary {
    pub columns: Vec<String>,
    /// `(label, count, percent)` per response code.
    pub responses: Vec<(String, usize, Option<f64>)>,
    pub total: usize,
}

impl ResponseSummary {
    /// Percentages are over the cells holding one of the response codes.
    pub fn build(survey: &Survey, columns: &[&str], codes: &ResponseCodes) -> Self {
        let counts: Vec<usize> = codes
            .codes
            .iter()
            .map(|(code, _)| {
                columns
                    .iter()
                    .flat_map(|col| survey.column(col))
                    .filter(|v| v.as_code() == Some(*code))
                    .count()
            })
            .collect();
        let total = counts.iter().sum();
        ResponseSummary {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            responses: codes
                .header()
                .zip(counts)
                .map(|(label, count)| (label, count, pct(count, total)))
                .collect(),
            total,
        }
    }

    pub fn term_table(&self) -> Table<'static> {
        let mut table = Table::new().with_row(
            Row::new()
                .with_cell(Cell::from("Response"))
                .with_cell(Cell::from("Count"))
                .with_cell(Cell::from("Percentage")),
        );
        for (label, count, percent) in &self.responses {
            table.add_row(
                Row::new()
                    .with_cell(Cell::from(label.clone()))
                    .with_cell(Cell::from(count.to_string()))
                    .with_cell(Cell::from(pct_cell(*percent))),
            );
        }
        table
    }
}
