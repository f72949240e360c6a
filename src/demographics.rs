//! Demographic grouping: age band, gender and ethnicity.
use crate::{
    range::{Range, RangeSet, RangeSetCountsWithMissing},
    value::is_sentinel,
    Record, Survey,
};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::fmt;

pub const AGE: &str = "Q2";
pub const ETHNICITY: &str = "Q3";
pub const GENDER: &str = "Q4";

/// Age bands, in the same order as [`AgeBin::ALL`].
pub static AGE_BANDS: Lazy<RangeSet<i64>> = Lazy::new(|| {
    RangeSet::new(vec![
        (Range::new(0, Some(40)), "<40"),
        (Range::new(40, Some(66)), "40–65"),
        (Range::new(66, Some(86)), "65–85"),
        (Range::new(86, None), ">=85"),
    ])
});

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AgeBin {
    Under40,
    From40To65,
    From66To85,
    Over85,
}

impl AgeBin {
    pub const ALL: [AgeBin; 4] = [
        AgeBin::Under40,
        AgeBin::From40To65,
        AgeBin::From66To85,
        AgeBin::Over85,
    ];

    /// The band an age falls in. Special codes and negative ages have no band.
    pub fn from_age(age: i64) -> Option<Self> {
        if is_sentinel(age) {
            return None;
        }
        AGE_BANDS.position(&age).map(|idx| AgeBin::ALL[idx])
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeBin::Under40 => "<40",
            AgeBin::From40To65 => "40–65",
            AgeBin::From66To85 => "65–85",
            AgeBin::Over85 => ">=85",
        }
    }
}

impl fmt::Display for AgeBin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Gender::Male),
            2 => Some(Gender::Female),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Ethnicity {
    Chinese,
    Malay,
    Indian,
    Others,
}

impl Ethnicity {
    pub const ALL: [Ethnicity; 4] = [
        Ethnicity::Chinese,
        Ethnicity::Malay,
        Ethnicity::Indian,
        Ethnicity::Others,
    ];

    pub fn from_code(code: i64) -> Option<Self> {
        use Ethnicity::*;
        match code {
            1 => Some(Chinese),
            2 => Some(Malay),
            3 => Some(Indian),
            4 => Some(Others),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        use Ethnicity::*;
        match self {
            Chinese => "Chinese",
            Malay => "Malay",
            Indian => "Indian",
            Others => "Others",
        }
    }
}

impl fmt::Display for Ethnicity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The demographic groups one respondent belongs to. Any of them may be unknown.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Demographics {
    pub age: Option<AgeBin>,
    pub gender: Option<Gender>,
    pub ethnicity: Option<Ethnicity>,
}

impl Demographics {
    pub fn from_record(record: &Record) -> Self {
        Demographics {
            age: record.int(AGE).and_then(AgeBin::from_age),
            gender: record.int(GENDER).and_then(Gender::from_code),
            ethnicity: record.int(ETHNICITY).and_then(Ethnicity::from_code),
        }
    }
}

/// Respondents per age band, with a trailing bucket for unusable ages.
pub fn age_distribution(survey: &Survey) -> RangeSetCountsWithMissing<'static, i64> {
    AGE_BANDS.bucket_values_with_missing(
        survey
            .iter_ref()
            .map(|rec| rec.int(AGE).filter(|age| AgeBin::from_age(*age).is_some())),
    )
}
