//! Classification and aggregation of needs-assessment survey data.
//!
//! Raw survey records are scored into complicating factors (CFs) and a global impression (GI),
//! binned by demographics and healthcare utilization, and cross-tabulated.
pub mod analysis;
pub mod cf;
pub mod config;
pub mod crosstab;
pub mod demographics;
pub mod gi;
pub mod impute;
mod range;
pub mod utilization;
mod util;
pub mod value;
pub mod value_counts;

pub use anyhow::{Context, Error};
use qu::ick_use::*;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    ops::Deref,
    path::Path,
    sync::Arc,
};

pub use crate::{
    analysis::Analysis,
    cf::{Cf, CfCategory, CfColumn, CfLevel},
    config::Config,
    crosstab::{Crosstab, Orientation},
    gi::Gi,
    range::{Range, RangeSet, RangeSetCountsWithMissing},
    util::{header, pct, pct_cell},
    value::Value,
};

pub type ArcStr = Arc<str>;
pub type Result<T = (), E = anyhow::Error> = std::result::Result<T, E>;

static MISSING: Value = Value::Missing;

/// One respondent's answers, keyed by question code (e.g. `"Q96"`, `"Q155_i"`).
///
/// Questions not present in the record read as missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    values: BTreeMap<ArcStr, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from integer-coded answers.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, i64)>) -> Self {
        pairs
            .into_iter()
            .fold(Self::new(), |rec, (code, value)| rec.with(code, value))
    }

    pub fn with(mut self, code: &str, value: impl Into<Value>) -> Self {
        self.set(code, value);
        self
    }

    pub fn set(&mut self, code: &str, value: impl Into<Value>) {
        self.values.insert(code.into(), value.into());
    }

    pub fn get(&self, code: &str) -> &Value {
        self.values.get(code).unwrap_or(&MISSING)
    }

    /// The answer to `code` as an integer, or `None` if it is missing or not a number.
    pub fn int(&self, code: &str) -> Option<i64> {
        self.get(code).as_int()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.values.contains_key(code)
    }

    pub fn codes(&self) -> impl Iterator<Item = &ArcStr> + '_ {
        self.values.keys()
    }
}

/// The survey dataset: an immutable, cheaply clonable list of records.
///
/// Derived data never gets written back here. Transformations such as imputation produce a new
/// `Survey`.
#[derive(Debug, Clone)]
pub struct Survey {
    els: Arc<Vec<Record>>,
    columns: Arc<Vec<ArcStr>>,
}

impl Survey {
    /// Load the dataset, choosing the reader from the file extension.
    ///
    /// `sheet` is only used for spreadsheets.
    pub fn load(path: impl AsRef<Path>, sheet: &str) -> Result<Self> {
        let path = path.as_ref();
        let survey = match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::load_csv(path)?,
            Some(ext) if ["xlsx", "xlsm", "xls", "ods"]
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known)) =>
            {
                Self::load_sheet(path, sheet)?
            }
            _ => bail!(
                "don't know how to read \"{}\" (expected .csv or .xlsx)",
                path.display()
            ),
        };
        event!(
            Level::INFO,
            "loaded {} records with {} columns from \"{}\"",
            survey.len(),
            survey.columns.len(),
            path.display()
        );
        Ok(survey)
    }

    pub fn load_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .with_context(|| format!("unable to open \"{}\"", path.display()))?;
        let columns = reader
            .headers()?
            .iter()
            .map(ArcStr::from)
            .collect::<Vec<_>>();
        let els = reader
            .into_deserialize()
            .collect::<Result<Vec<Record>, _>>()
            .with_context(|| format!("while loading \"{}\"", path.display()))?;
        Ok(Self::with_columns(els, columns))
    }

    /// Read one worksheet, using its first row as the column names.
    pub fn load_sheet(path: impl AsRef<Path>, sheet: &str) -> Result<Self> {
        use calamine::Reader;

        let path = path.as_ref();
        let mut workbook = calamine::open_workbook_auto(path)
            .with_context(|| format!("unable to open workbook \"{}\"", path.display()))?;
        let range = workbook
            .worksheet_range(sheet)
            .ok_or_else(|| format_err!("no sheet \"{}\" in \"{}\"", sheet, path.display()))?
            .with_context(|| format!("while reading sheet \"{}\"", sheet))?;

        let mut rows = range.rows();
        let columns: Vec<ArcStr> = match rows.next() {
            Some(header) => header
                .iter()
                .map(|cell| ArcStr::from(cell.to_string().trim()))
                .collect(),
            None => return Ok(Self::with_columns(vec![], vec![])),
        };
        let els = rows
            .map(|row| Record {
                values: columns
                    .iter()
                    .cloned()
                    .zip(row.iter().map(cell_value))
                    .collect(),
            })
            .collect();
        Ok(Self::with_columns(els, columns))
    }

    pub fn has_column(&self, code: &str) -> bool {
        self.columns.iter().any(|col| &**col == code)
    }

    /// Of the given question codes, those that the dataset doesn't have.
    pub fn missing_columns<'a>(&self, codes: &[&'a str]) -> Vec<&'a str> {
        codes
            .iter()
            .copied()
            .filter(|code| !self.has_column(code))
            .collect()
    }

    pub fn columns(&self) -> &[ArcStr] {
        &self.columns
    }

    /// All values of one question, in record order.
    pub fn column<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.els.iter().map(move |rec| rec.get(code))
    }

    pub fn iter(&self) -> impl Iterator<Item = Record> + '_ {
        self.els.iter().cloned()
    }

    pub fn iter_ref(&self) -> impl Iterator<Item = &Record> + '_ {
        self.els.iter()
    }

    pub fn filter(&self, f: impl Fn(&Record) -> bool) -> Self {
        self.replace_records(self.iter().filter(f).collect())
    }

    /// A new survey with the same columns as this one but different records.
    pub fn replace_records(&self, els: Vec<Record>) -> Self {
        Survey {
            els: Arc::new(els),
            columns: self.columns.clone(),
        }
    }

    fn with_columns(els: Vec<Record>, columns: Vec<ArcStr>) -> Self {
        Survey {
            els: Arc::new(els),
            columns: Arc::new(columns),
        }
    }
}

impl Deref for Survey {
    type Target = [Record];
    fn deref(&self) -> &Self::Target {
        &*self.els
    }
}

impl<'a> IntoIterator for &'a Survey {
    type IntoIter = <&'a [Record] as IntoIterator>::IntoIter;
    type Item = &'a Record;
    fn into_iter(self) -> Self::IntoIter {
        self.els.iter()
    }
}

impl FromIterator<Record> for Survey {
    /// The column list is the union of all questions seen in the records.
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = Record>,
    {
        let els: Vec<Record> = iter.into_iter().collect();
        let columns = els
            .iter()
            .flat_map(|rec| rec.codes().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        Self::with_columns(els, columns)
    }
}

fn cell_value(cell: &calamine::DataType) -> Value {
    use calamine::DataType;
    match cell {
        DataType::Int(v) => Value::Int(*v),
        DataType::Float(v) => Value::from(*v),
        DataType::String(s) => Value::parse(s),
        DataType::Bool(b) => Value::Int(*b as i64),
        DataType::Empty => Value::Missing,
        _ => Value::Missing,
    }
}
