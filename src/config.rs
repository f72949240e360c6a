//! Report configuration, read from a TOML file.
use crate::{Cf, Context, Result, Survey};
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// A `.csv` or `.xlsx` file.
    pub dataset: PathBuf,
    /// Only used for spreadsheets.
    pub sheet: String,
    /// Fixed denominator for overall percentages. Falls back to the number of records.
    pub total_sample_size: Option<usize>,
    /// Restrict reports to these factors.
    #[serde_as(as = "Option<Vec<DisplayFromStr>>")]
    pub factors: Option<Vec<Cf>>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            dataset: PathBuf::from("data/Yishun_Dataset.xlsx"),
            sheet: "Yishun_Dataset".into(),
            total_sample_size: None,
            factors: None,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("unable to read config \"{}\"", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("while parsing \"{}\"", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// `path` if given, otherwise the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_survey(&self) -> Result<Survey> {
        Survey::load(&self.dataset, &self.sheet)
    }

    /// The denominator for overall percentages over a dataset of `len` records.
    pub fn total_for(&self, len: usize) -> usize {
        self.total_sample_size.unwrap_or(len)
    }

    /// The factors to report on, all of them unless restricted.
    pub fn factors(&self) -> Vec<Cf> {
        match &self.factors {
            Some(factors) => factors.clone(),
            None => Cf::ALL.to_vec(),
        }
    }
}
