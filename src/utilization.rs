//! Healthcare utilization: visit and admission counts, and how they break down by factor level
//! and by global impression.
use crate::{
    cf::{Cf, CfCategory, CfColumn, CfLevel},
    crosstab::{self, Crosstab, LongRow, Orientation},
    gi::Gi,
    util::{count_pct_cell, pct, with_n},
    value::is_sentinel,
    Survey, Value,
};
use qu::ick_use::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UtilQuestion {
    PrivateGp,
    Polyclinic,
    SpecialistOutpatient,
    Emergency,
    PublicAdmissions,
    PrivateAdmissions,
}

impl UtilQuestion {
    pub const ALL: [UtilQuestion; 6] = [
        UtilQuestion::PrivateGp,
        UtilQuestion::Polyclinic,
        UtilQuestion::SpecialistOutpatient,
        UtilQuestion::Emergency,
        UtilQuestion::PublicAdmissions,
        UtilQuestion::PrivateAdmissions,
    ];

    pub fn code(self) -> &'static str {
        use UtilQuestion::*;
        match self {
            PrivateGp => "Q78",
            Polyclinic => "Q85",
            SpecialistOutpatient => "Q91",
            Emergency => "Q93",
            PublicAdmissions => "Q96",
            PrivateAdmissions => "Q103",
        }
    }

    pub fn title(self) -> &'static str {
        use UtilQuestion::*;
        match self {
            PrivateGp => "Private General Practitioner (GP)",
            Polyclinic => "Polyclinic doctor visits",
            SpecialistOutpatient => "Specialist Outpatient Clinic (SOC) visits",
            Emergency => "Emergency Department (ED) visits",
            PublicAdmissions => "Public hospital admissions",
            PrivateAdmissions => "Private hospital admissions",
        }
    }

    /// The question as it was asked.
    pub fn text(self) -> &'static str {
        use UtilQuestion::*;
        match self {
            PrivateGp => {
                "In the past 12 months, how many times did you visit a General Practitioner (GP) \
                 in a private clinic / see a doctor at home?"
            }
            Polyclinic => {
                "In the past 12 months, how many times did you visit a doctor in a polyclinic?"
            }
            SpecialistOutpatient => {
                "In the past 12 months, how many times did you visit a doctor in a specialist \
                 outpatient clinic (SOC)?"
            }
            Emergency => {
                "In the past 12 months, how many times have you had Emergency Department (ED) \
                 visits?"
            }
            PublicAdmissions => {
                "In the past 12 months, how many times have you had public hospital admissions, \
                 including public community hospital admissions?"
            }
            PrivateAdmissions => {
                "In the past 12 months, how many times have you had private hospital admissions?"
            }
        }
    }
}

impl fmt::Display for UtilQuestion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.title())
    }
}

impl FromStr for UtilQuestion {
    type Err = Error;
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        UtilQuestion::ALL
            .into_iter()
            .find(|q| q.code().eq_ignore_ascii_case(input))
            .ok_or_else(|| format_err!("\"{}\" is not a utilization question", input))
    }
}

/// What a special code on a visit count means.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisitPolicy {
    /// Special codes, negative and non-numeric values are unknown. Unable to recall is not zero
    /// visits.
    SentinelsMissing,
    /// Anything that isn't a usable count is taken as no visits. Only for imputation-oriented
    /// tables.
    SentinelsZero,
}

impl VisitPolicy {
    pub fn visits(self, value: &Value) -> Option<i64> {
        let clean = value.as_int().filter(|v| *v >= 0 && !is_sentinel(*v));
        match self {
            VisitPolicy::SentinelsMissing => clean,
            VisitPolicy::SentinelsZero => Some(clean.unwrap_or(0)),
        }
    }

    /// Imputed factor columns are crossed with visit counts imputed the same way. Everything else
    /// keeps special codes out.
    pub fn for_column(column: CfColumn) -> Self {
        if column.imputed {
            VisitPolicy::SentinelsZero
        } else {
            VisitPolicy::SentinelsMissing
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            VisitPolicy::SentinelsMissing => "unable to recall/refused excluded",
            VisitPolicy::SentinelsZero => "unable to recall/refused counted as 0 visits",
        }
    }
}

/// Cleaned visit counts for one question, in record order.
///
/// If the dataset doesn't have the column every value is `None`, whatever the policy.
pub fn visits(survey: &Survey, question: UtilQuestion, policy: VisitPolicy) -> Vec<Option<i64>> {
    if !survey.has_column(question.code()) {
        event!(
            Level::WARN,
            "column {} is not in the dataset, no visit counts",
            question.code()
        );
        return vec![None; survey.len()];
    }
    survey
        .column(question.code())
        .map(|value| policy.visits(value))
        .collect()
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum CoarseBin {
    Zero,
    OneToTwo,
    ThreeToFive,
    SixPlus,
}

impl CoarseBin {
    pub const ALL: [CoarseBin; 4] = [
        CoarseBin::Zero,
        CoarseBin::OneToTwo,
        CoarseBin::ThreeToFive,
        CoarseBin::SixPlus,
    ];

    pub fn from_visits(visits: i64) -> Self {
        match visits {
            v if v <= 0 => CoarseBin::Zero,
            1..=2 => CoarseBin::OneToTwo,
            3..=5 => CoarseBin::ThreeToFive,
            _ => CoarseBin::SixPlus,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CoarseBin::Zero => "0 visits",
            CoarseBin::OneToTwo => "1–2 visits",
            CoarseBin::ThreeToFive => "3–5 visits",
            CoarseBin::SixPlus => "6+ visits",
        }
    }
}

impl fmt::Display for CoarseBin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One bin per count from 0 to 10, then 11 and over.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FineBin(u8);

impl FineBin {
    const LAST: u8 = 11;

    pub fn from_visits(visits: i64) -> Self {
        FineBin(visits.clamp(0, Self::LAST as i64) as u8)
    }

    pub fn all() -> Vec<FineBin> {
        (0..=Self::LAST).map(FineBin).collect()
    }
}

impl fmt::Display for FineBin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0 == Self::LAST {
            write!(f, "{}+", Self::LAST)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Factor categories against coarse visit bins for one question.
///
/// Bin percentages are within the category, over the records with a usable visit count. The total
/// column is the category's share of every scored record, so it matches the factor's distribution
/// and doesn't change from question to question.
#[derive(Debug, Clone)]
pub struct CfUtilBinned {
    policy: VisitPolicy,
    bins: Crosstab<CfCategory, CoarseBin>,
    /// Scored records per category, whatever their answer to the question.
    scored: Crosstab<CfCategory, &'static str>,
}

impl CfUtilBinned {
    pub fn build(
        column: CfColumn,
        levels: &[Option<CfLevel>],
        survey: &Survey,
        question: UtilQuestion,
        policy: VisitPolicy,
    ) -> Self {
        let cf = column.cf;
        let visits = visits(survey, question, policy);
        let bins = Crosstab::build(
            format!("{} × {}", column.title(), question),
            CfCategory::all(cf),
            CoarseBin::ALL.to_vec(),
            levels.iter().zip(visits).map(|(level, visits)| {
                (
                    CfCategory::from_level(cf, *level),
                    visits.map(CoarseBin::from_visits),
                )
            }),
        );
        CfUtilBinned {
            policy,
            bins,
            scored: crosstab::cf_distribution(cf, levels),
        }
    }

    pub fn bins(&self) -> &Crosstab<CfCategory, CoarseBin> {
        &self.bins
    }

    /// Every scored record.
    pub fn scored(&self) -> usize {
        self.scored.grand_total()
    }

    pub fn category_total(&self, row: usize) -> usize {
        self.scored.row_total(row)
    }

    /// The category's share of every scored record.
    pub fn total_share(&self, row: usize) -> Option<f64> {
        pct(self.category_total(row), self.scored())
    }

    pub fn heading(&self) -> String {
        format!(
            "{} (bins: {}, N={} with a usable count; {})",
            self.bins.title(),
            Orientation::RowPct,
            self.bins.grand_total(),
            self.policy.describe()
        )
    }

    /// The bins in long form, percentages within the category.
    pub fn to_long(&self) -> Vec<LongRow> {
        self.bins.to_long(Orientation::RowPct)
    }

    pub fn term_table(&self) -> term_data_table::Table<'static> {
        use term_data_table::{Cell, Row, Table};
        let mut header = Row::new()
            .with_cell(Cell::from("Category"))
            .with_cell(Cell::from(with_n("Total", self.scored())));
        for bin in CoarseBin::ALL {
            header = header.with_cell(Cell::from(bin.label()));
        }
        let mut table = Table::new().with_row(header);
        if self.scored() == 0 || self.bins.is_empty() {
            return table.with_row(Row::new().with_cell(Cell::from("(No data)")));
        }
        for (row, category) in self.bins.categories().iter().enumerate() {
            let mut cells = Row::new()
                .with_cell(Cell::from(category.to_string()))
                .with_cell(Cell::from(count_pct_cell(
                    self.category_total(row),
                    self.total_share(row),
                )));
            for col in 0..CoarseBin::ALL.len() {
                cells = cells.with_cell(Cell::from(count_pct_cell(
                    self.bins.count(row, col),
                    self.bins.percent(row, col, Orientation::RowPct),
                )));
            }
            table.add_row(cells);
        }
        table
    }
}

pub fn cf_util_binned(
    column: CfColumn,
    levels: &[Option<CfLevel>],
    survey: &Survey,
    question: UtilQuestion,
    policy: VisitPolicy,
) -> CfUtilBinned {
    CfUtilBinned::build(column, levels, survey, question, policy)
}

/// A long-form row of a factor by utilization table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UtilLongRow {
    pub question: &'static str,
    #[serde(flatten)]
    pub row: LongRow,
}

/// [`cf_util_binned`] for several questions, flattened. Percentages are within the category and
/// question.
pub fn cf_util_long(
    column: CfColumn,
    levels: &[Option<CfLevel>],
    survey: &Survey,
    questions: &[UtilQuestion],
    policy: VisitPolicy,
) -> Vec<UtilLongRow> {
    questions
        .iter()
        .flat_map(|question| {
            cf_util_binned(column, levels, survey, *question, policy)
                .to_long()
                .into_iter()
                .map(move |row| UtilLongRow {
                    question: question.code(),
                    row,
                })
        })
        .collect()
}

/// What a cell of [`CfUtilCrosstab`] counts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UtilMode {
    /// Respondents with a usable count.
    Valid,
    /// Respondents with at least one visit.
    AtLeastOne,
    /// Total visits.
    Sum,
}

impl UtilMode {
    pub fn describe(self) -> &'static str {
        match self {
            UtilMode::Valid => "respondents with a valid answer",
            UtilMode::AtLeastOne => "respondents with at least one visit",
            UtilMode::Sum => "total visits",
        }
    }
}

/// Factor categories against every utilization question, one number per cell.
#[derive(Debug, Clone, Serialize)]
pub struct CfUtilCrosstab {
    pub cf: Cf,
    pub mode: UtilMode,
    pub questions: Vec<UtilQuestion>,
    /// `cells[level][question]`
    pub cells: Vec<Vec<i64>>,
}

impl CfUtilCrosstab {
    pub fn build(
        cf: Cf,
        levels: &[Option<CfLevel>],
        survey: &Survey,
        questions: &[UtilQuestion],
        mode: UtilMode,
    ) -> Self {
        let mut cells = vec![vec![0; questions.len()]; cf.categories().len()];
        for (col, question) in questions.iter().enumerate() {
            let visits = visits(survey, *question, VisitPolicy::SentinelsMissing);
            for (level, visits) in levels.iter().zip(visits) {
                let row = match level.and_then(|l| cf.categories().iter().position(|c| *c == l)) {
                    Some(row) => row,
                    None => continue,
                };
                cells[row][col] += match mode {
                    UtilMode::Valid => visits.is_some() as i64,
                    UtilMode::AtLeastOne => (visits.unwrap_or(0) >= 1) as i64,
                    UtilMode::Sum => visits.unwrap_or(0),
                };
            }
        }
        CfUtilCrosstab {
            cf,
            mode,
            questions: questions.to_vec(),
            cells,
        }
    }

    pub fn heading(&self) -> String {
        format!(
            "Cross-tab: {} × Healthcare Utilization ({})",
            self.cf.title(),
            self.mode.describe()
        )
    }

    pub fn term_table(&self) -> term_data_table::Table<'static> {
        use term_data_table::{Cell, Row, Table};
        let mut header = Row::new().with_cell(Cell::from("Category"));
        for question in &self.questions {
            header = header.with_cell(Cell::from(question.to_string()));
        }
        let mut table = Table::new().with_row(header);
        for (category, cells) in CfCategory::all(self.cf).into_iter().zip(&self.cells) {
            let mut row = Row::new().with_cell(Cell::from(category.to_string()));
            for cell in cells {
                row = row.with_cell(Cell::from(cell.to_string()));
            }
            table.add_row(row);
        }
        table
    }
}

pub fn cf_util_crosstab(
    cf: Cf,
    levels: &[Option<CfLevel>],
    survey: &Survey,
    questions: &[UtilQuestion],
    mode: UtilMode,
) -> CfUtilCrosstab {
    CfUtilCrosstab::build(cf, levels, survey, questions, mode)
}

/// Respondents in or out of one GI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum GiMembership {
    In,
    NotIn,
}

impl fmt::Display for GiMembership {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            GiMembership::In => "In GI",
            GiMembership::NotIn => "Not in GI",
        })
    }
}

/// Fine visit bins for one question, split by whether the respondent was assigned `gi`.
///
/// Every bin and membership combination is present, at zero if need be.
pub fn gi_util_long(
    assigned: &[Gi],
    gi: Gi,
    survey: &Survey,
    question: UtilQuestion,
) -> Crosstab<FineBin, GiMembership> {
    let visits = visits(survey, question, VisitPolicy::SentinelsMissing);
    Crosstab::build(
        format!("{} vs {} (counts by utilisation bucket)", gi, question.code()),
        FineBin::all(),
        vec![GiMembership::In, GiMembership::NotIn],
        assigned.iter().zip(visits).map(|(assigned, visits)| {
            let membership = if *assigned == gi {
                GiMembership::In
            } else {
                GiMembership::NotIn
            };
            (visits.map(FineBin::from_visits), Some(membership))
        }),
    )
}

#[cfg(test)]
mod test {
    use super::{
        cf_util_binned, cf_util_long, gi_util_long, CfUtilCrosstab, CoarseBin, FineBin,
        GiMembership, UtilMode, UtilQuestion, VisitPolicy,
    };
    use crate::{
        cf::{Cf, CfCategory, CfColumn},
        crosstab::{self, Orientation},
        gi::Gi,
        Record, Survey, Value,
    };

    fn survey() -> Survey {
        vec![
            Record::from_pairs([("Q78", 0), ("Q85", 3)]),
            Record::from_pairs([("Q78", 2), ("Q85", 666)]),
            Record::from_pairs([("Q78", 777), ("Q85", 12)]),
            Record::from_pairs([("Q78", 7), ("Q85", 1)]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn policies() {
        let unable = Value::Int(666);
        assert_eq!(VisitPolicy::SentinelsMissing.visits(&unable), None);
        assert_eq!(VisitPolicy::SentinelsZero.visits(&unable), Some(0));
        assert_eq!(VisitPolicy::SentinelsMissing.visits(&Value::Int(-1)), None);
        assert_eq!(VisitPolicy::SentinelsZero.visits(&Value::Missing), Some(0));
        assert_eq!(VisitPolicy::SentinelsMissing.visits(&Value::Int(4)), Some(4));
    }

    #[test]
    fn bins() {
        assert_eq!(CoarseBin::from_visits(0), CoarseBin::Zero);
        assert_eq!(CoarseBin::from_visits(2), CoarseBin::OneToTwo);
        assert_eq!(CoarseBin::from_visits(3), CoarseBin::ThreeToFive);
        assert_eq!(CoarseBin::from_visits(6), CoarseBin::SixPlus);
        assert_eq!(FineBin::from_visits(10).to_string(), "10");
        assert_eq!(FineBin::from_visits(11).to_string(), "11+");
        assert_eq!(FineBin::from_visits(40), FineBin::from_visits(11));
        assert_eq!(FineBin::all().len(), 12);
    }

    #[test]
    fn binned_by_factor() {
        let levels = [Some(0), Some(0), Some(1), None];
        let column = CfColumn::raw(Cf::HospitalAdmissions);
        let missing = cf_util_binned(
            column,
            &levels,
            &survey(),
            UtilQuestion::PrivateGp,
            VisitPolicy::SentinelsMissing,
        );
        // the refusal and the unscored record drop out of the bins
        assert_eq!(missing.bins().grand_total(), 2);
        assert_eq!(missing.scored(), 3);
        let none = CfCategory::new(Cf::HospitalAdmissions, 0);
        assert_eq!(missing.bins().count_of(&none, &CoarseBin::Zero), 1);
        assert_eq!(missing.bins().count_of(&none, &CoarseBin::OneToTwo), 1);
        assert_eq!(missing.bins().percent(0, 0, Orientation::RowPct), Some(50.));
        // the refusal still counts towards its category's total
        assert_eq!(missing.category_total(1), 1);
        assert_eq!(missing.bins().row_total(1), 0);

        let zero = cf_util_binned(
            column,
            &levels,
            &survey(),
            UtilQuestion::PrivateGp,
            VisitPolicy::SentinelsZero,
        );
        assert_eq!(zero.bins().grand_total(), 3);
        let some = CfCategory::new(Cf::HospitalAdmissions, 1);
        assert_eq!(zero.bins().count_of(&some, &CoarseBin::Zero), 1);
    }

    #[test]
    fn total_column_is_the_same_for_every_question() {
        let data: Survey = vec![
            Record::from_pairs([("Q78", 0), ("Q85", 3)]),
            Record::from_pairs([("Q78", 777), ("Q85", 1)]),
        ]
        .into_iter()
        .collect();
        let levels = [Some(1), Some(0)];
        let column = CfColumn::raw(Cf::HospitalAdmissions);
        let gp = cf_util_binned(
            column,
            &levels,
            &data,
            UtilQuestion::PrivateGp,
            VisitPolicy::SentinelsMissing,
        );
        let poly = cf_util_binned(
            column,
            &levels,
            &data,
            UtilQuestion::Polyclinic,
            VisitPolicy::SentinelsMissing,
        );
        for row in 0..3 {
            assert_eq!(gp.total_share(row), poly.total_share(row));
        }
        assert_eq!(gp.total_share(0), Some(50.));
        assert_eq!(gp.total_share(1), Some(50.));
        assert_eq!(gp.total_share(2), Some(0.));
    }

    #[test]
    fn total_column_matches_the_distribution() {
        let levels = [Some(0), Some(0), Some(1), None];
        let distribution = crosstab::cf_distribution(Cf::HospitalAdmissions, &levels);
        for question in [UtilQuestion::PrivateGp, UtilQuestion::Polyclinic] {
            let binned = cf_util_binned(
                CfColumn::raw(Cf::HospitalAdmissions),
                &levels,
                &survey(),
                question,
                VisitPolicy::SentinelsMissing,
            );
            for row in 0..distribution.categories().len() {
                assert_eq!(binned.category_total(row), distribution.row_total(row));
                assert_eq!(
                    binned.total_share(row),
                    distribution.row_share(row, Orientation::ColPct)
                );
            }
        }
    }

    #[test]
    fn imputed_columns_impute_visits() {
        assert_eq!(
            VisitPolicy::for_column(CfColumn::imputed(Cf::NursingNeeds)),
            VisitPolicy::SentinelsZero
        );
        assert_eq!(
            VisitPolicy::for_column(CfColumn::raw(Cf::NursingNeeds)),
            VisitPolicy::SentinelsMissing
        );
        let column = CfColumn::imputed(Cf::NursingNeeds);
        let table = cf_util_binned(
            column,
            &[Some(0), Some(0), Some(0), Some(1)],
            &survey(),
            UtilQuestion::Polyclinic,
            VisitPolicy::for_column(column),
        );
        assert!(table.bins().title().contains("(imputed)"));
        // 666 counted as no visits
        assert_eq!(table.bins().grand_total(), 4);
        assert_eq!(
            table
                .bins()
                .count_of(&CfCategory::new(Cf::NursingNeeds, 0), &CoarseBin::Zero),
            1
        );
    }

    #[test]
    fn long_form_covers_every_question() {
        let levels = [Some(0), Some(1), Some(2), Some(2)];
        let rows = cf_util_long(
            CfColumn::raw(Cf::HospitalAdmissions),
            &levels,
            &survey(),
            &[UtilQuestion::PrivateGp, UtilQuestion::Polyclinic],
            VisitPolicy::SentinelsMissing,
        );
        // 3 categories × 4 bins × 2 questions
        assert_eq!(rows.len(), 24);
        assert!(rows.iter().all(|r| r.question == "Q78" || r.question == "Q85"));
    }

    #[test]
    fn crosstab_modes() {
        let levels = [Some(0), Some(0), Some(0), Some(1)];
        let questions = [UtilQuestion::PrivateGp, UtilQuestion::Polyclinic];
        let valid =
            CfUtilCrosstab::build(Cf::NursingNeeds, &levels, &survey(), &questions, UtilMode::Valid);
        assert_eq!(valid.cells[0], vec![2, 2]);
        let any =
            CfUtilCrosstab::build(Cf::NursingNeeds, &levels, &survey(), &questions, UtilMode::AtLeastOne);
        assert_eq!(any.cells[0], vec![1, 2]);
        let sum =
            CfUtilCrosstab::build(Cf::NursingNeeds, &levels, &survey(), &questions, UtilMode::Sum);
        assert_eq!(sum.cells[0], vec![2, 15]);
        assert_eq!(sum.cells[1], vec![7, 1]);
        assert_eq!(sum.cells[2], vec![0, 0]);
    }

    #[test]
    fn gi_membership_is_zero_filled() {
        let assigned = [Gi::V, Gi::I, Gi::V, Gi::Unclassified];
        let table = gi_util_long(&assigned, Gi::V, &survey(), UtilQuestion::Polyclinic);
        assert_eq!(table.to_long(Orientation::ColPct).len(), 24);
        assert_eq!(table.count_of(&FineBin::from_visits(3), &GiMembership::In), 1);
        assert_eq!(table.count_of(&FineBin::from_visits(12), &GiMembership::In), 1);
        assert_eq!(table.count_of(&FineBin::from_visits(1), &GiMembership::NotIn), 1);
        assert_eq!(table.excluded(), 1);
    }

    #[test]
    fn absent_column_has_no_counts() {
        let table = gi_util_long(&[Gi::I; 4], Gi::I, &survey(), UtilQuestion::Emergency);
        assert!(table.is_empty());
        assert_eq!("q93".parse::<UtilQuestion>().unwrap(), UtilQuestion::Emergency);
    }
}
