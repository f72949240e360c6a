//! Cross-tabulation of a labelled column against a grouping column.
//!
//! A [`Crosstab`] holds counts only. Percentages are worked out on request for an
//! [`Orientation`], so the same table can be shown row-wise, column-wise, or against a fixed
//! overall total, and the denominator in use is always named in the heading.
use crate::{
    cf::{Cf, CfCategory, CfLevel},
    demographics::{AgeBin, Demographics, Ethnicity, Gender},
    gi::Gi,
    util::{count_pct_cell, pct, with_n},
};
use serde::Serialize;
use std::fmt;

/// Which denominator a percentage is taken over.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum Orientation {
    /// Within each category: a row sums to 100%.
    RowPct,
    /// Within each group: a column sums to 100%.
    ColPct,
    /// Over a fixed sample size, the same for every cell.
    OverallPct { total: usize },
}

impl Orientation {
    pub fn describe(&self) -> String {
        match self {
            Orientation::RowPct => "row %, within category".into(),
            Orientation::ColPct => "column %, within group".into(),
            Orientation::OverallPct { total } => format!("% of overall sample, N={}", total),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// One cell of a crosstab in long form, ready for a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongRow {
    pub category: String,
    pub group: String,
    pub count: usize,
    pub percent: Option<f64>,
}

/// Counts of `C` (rows) against `G` (columns), in an explicit order for both.
///
/// Every category and group in the order gets a row or column even if nothing falls in it.
/// Pairs where either side is missing, or not in the order, are counted as excluded and appear in
/// no denominator.
#[derive(Debug, Clone)]
pub struct Crosstab<C, G> {
    title: String,
    categories: Vec<C>,
    groups: Vec<G>,
    /// Row-major.
    counts: Vec<usize>,
    excluded: usize,
}

impl<C, G> Crosstab<C, G>
where
    C: PartialEq + fmt::Display,
    G: PartialEq + fmt::Display,
{
    pub fn build<I>(title: impl Into<String>, categories: Vec<C>, groups: Vec<G>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (Option<C>, Option<G>)>,
    {
        let mut counts = vec![0; categories.len() * groups.len()];
        let mut excluded = 0;
        for (category, group) in pairs {
            let row = category.and_then(|c| categories.iter().position(|el| *el == c));
            let col = group.and_then(|g| groups.iter().position(|el| *el == g));
            match (row, col) {
                (Some(row), Some(col)) => counts[row * groups.len() + col] += 1,
                _ => excluded += 1,
            }
        }
        Crosstab {
            title: title.into(),
            categories,
            groups,
            counts,
            excluded,
        }
    }

    /// Build from two parallel columns.
    pub fn from_columns(
        title: impl Into<String>,
        categories: Vec<C>,
        groups: Vec<G>,
        category_col: &[Option<C>],
        group_col: &[Option<G>],
    ) -> Self
    where
        C: Clone,
        G: Clone,
    {
        Self::build(
            title,
            categories,
            groups,
            category_col.iter().cloned().zip(group_col.iter().cloned()),
        )
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// The title with the denominator spelled out.
    pub fn heading(&self, orientation: Orientation) -> String {
        format!("{} ({})", self.title, orientation)
    }

    pub fn categories(&self) -> &[C] {
        &self.categories
    }

    pub fn groups(&self) -> &[G] {
        &self.groups
    }

    pub fn count(&self, row: usize, col: usize) -> usize {
        self.counts[row * self.groups.len() + col]
    }

    pub fn count_of(&self, category: &C, group: &G) -> usize {
        let row = self.categories.iter().position(|el| el == category);
        let col = self.groups.iter().position(|el| el == group);
        match (row, col) {
            (Some(row), Some(col)) => self.count(row, col),
            _ => 0,
        }
    }

    pub fn row_total(&self, row: usize) -> usize {
        (0..self.groups.len()).map(|col| self.count(row, col)).sum()
    }

    pub fn col_total(&self, col: usize) -> usize {
        (0..self.categories.len())
            .map(|row| self.count(row, col))
            .sum()
    }

    pub fn grand_total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Pairs that fell outside the table.
    pub fn excluded(&self) -> usize {
        self.excluded
    }

    pub fn is_empty(&self) -> bool {
        self.grand_total() == 0
    }

    pub fn percent(&self, row: usize, col: usize, orientation: Orientation) -> Option<f64> {
        let count = self.count(row, col);
        match orientation {
            Orientation::RowPct => pct(count, self.row_total(row)),
            Orientation::ColPct => pct(count, self.col_total(col)),
            Orientation::OverallPct { total } => pct(count, total),
        }
    }

    /// The share of the whole table a category takes, for a "Total" column.
    pub fn row_share(&self, row: usize, orientation: Orientation) -> Option<f64> {
        pct(self.row_total(row), self.share_denominator(orientation))
    }

    fn share_denominator(&self, orientation: Orientation) -> usize {
        match orientation {
            Orientation::OverallPct { total } => total,
            _ => self.grand_total(),
        }
    }

    /// All percentages, row-major.
    pub fn percent_table(&self, orientation: Orientation) -> Vec<Vec<Option<f64>>> {
        (0..self.categories.len())
            .map(|row| {
                (0..self.groups.len())
                    .map(|col| self.percent(row, col, orientation))
                    .collect()
            })
            .collect()
    }

    /// Reorder rows by their total, largest first. Ties keep their order.
    pub fn sorted_by_total(self) -> Self {
        let mut order: Vec<usize> = (0..self.categories.len()).collect();
        order.sort_by_key(|row| std::cmp::Reverse(self.row_total(*row)));
        let width = self.groups.len();
        let counts = order
            .iter()
            .flat_map(|row| self.counts[row * width..(row + 1) * width].iter().copied())
            .collect();
        let mut categories: Vec<Option<C>> = self.categories.into_iter().map(Some).collect();
        let categories = order
            .iter()
            .filter_map(|row| categories[*row].take())
            .collect();
        Crosstab {
            title: self.title,
            categories,
            groups: self.groups,
            counts,
            excluded: self.excluded,
        }
    }

    /// Every cell in long form, zero counts included.
    pub fn to_long(&self, orientation: Orientation) -> Vec<LongRow> {
        let mut out = Vec::with_capacity(self.counts.len());
        for (row, category) in self.categories.iter().enumerate() {
            for (col, group) in self.groups.iter().enumerate() {
                out.push(LongRow {
                    category: category.to_string(),
                    group: group.to_string(),
                    count: self.count(row, col),
                    percent: self.percent(row, col, orientation),
                });
            }
        }
        out
    }

    /// Counts with percentages, plus a total column.
    pub fn term_table(&self, orientation: Orientation) -> term_data_table::Table<'static> {
        use term_data_table::{Cell, Row, Table};
        let mut header = Row::new().with_cell(Cell::from("Category"));
        for (col, group) in self.groups.iter().enumerate() {
            header = header.with_cell(Cell::from(match orientation {
                Orientation::ColPct => with_n(group, self.col_total(col)),
                _ => group.to_string(),
            }));
        }
        header = header.with_cell(Cell::from(with_n(
            "Total",
            self.share_denominator(orientation),
        )));
        let mut table = Table::new().with_row(header);
        if self.is_empty() {
            return table.with_row(Row::new().with_cell(Cell::from("(No data)")));
        }
        for (row, category) in self.categories.iter().enumerate() {
            let mut cells = Row::new().with_cell(Cell::from(category.to_string()));
            for col in 0..self.groups.len() {
                cells = cells.with_cell(Cell::from(count_pct_cell(
                    self.count(row, col),
                    self.percent(row, col, orientation),
                )));
            }
            table.add_row(cells.with_cell(Cell::from(count_pct_cell(
                self.row_total(row),
                self.row_share(row, orientation),
            ))));
        }
        table
    }

    /// Raw counts and a total column, no percentages.
    pub fn counts_term_table(&self) -> term_data_table::Table<'static> {
        use term_data_table::{Cell, Row, Table};
        let mut header = Row::new().with_cell(Cell::from("Category"));
        for group in &self.groups {
            header = header.with_cell(Cell::from(group.to_string()));
        }
        let mut table = Table::new().with_row(header.with_cell(Cell::from("Total")));
        if self.is_empty() {
            return table.with_row(Row::new().with_cell(Cell::from("(No data)")));
        }
        for (row, category) in self.categories.iter().enumerate() {
            let mut cells = Row::new().with_cell(Cell::from(category.to_string()));
            for col in 0..self.groups.len() {
                cells = cells.with_cell(Cell::from(self.count(row, col).to_string()));
            }
            table.add_row(cells.with_cell(Cell::from(self.row_total(row).to_string())));
        }
        table
    }
}

/// A factor's distribution: one column of counts over the scored records.
pub fn cf_distribution(cf: Cf, levels: &[Option<CfLevel>]) -> Crosstab<CfCategory, &'static str> {
    Crosstab::build(
        cf.title(),
        CfCategory::all(cf),
        vec!["Respondents"],
        levels
            .iter()
            .map(|level| (CfCategory::from_level(cf, *level), Some("Respondents"))),
    )
}

/// A column of the demographic matrix.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum DemographicGroup {
    Age(AgeBin),
    Gender(Gender),
    Ethnicity(Ethnicity),
}

impl DemographicGroup {
    /// Age bands, then genders, then ethnicities.
    pub fn all() -> Vec<DemographicGroup> {
        AgeBin::ALL
            .into_iter()
            .map(DemographicGroup::Age)
            .chain(Gender::ALL.into_iter().map(DemographicGroup::Gender))
            .chain(Ethnicity::ALL.into_iter().map(DemographicGroup::Ethnicity))
            .collect()
    }

    /// The groups a respondent belongs to, one per dimension at most.
    pub fn of(demographics: &Demographics) -> impl Iterator<Item = DemographicGroup> {
        demographics
            .age
            .map(DemographicGroup::Age)
            .into_iter()
            .chain(demographics.gender.map(DemographicGroup::Gender))
            .chain(demographics.ethnicity.map(DemographicGroup::Ethnicity))
    }
}

impl fmt::Display for DemographicGroup {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DemographicGroup::Age(age) => write!(f, "{}", age),
            DemographicGroup::Gender(gender) => write!(f, "{}", gender),
            DemographicGroup::Ethnicity(ethnicity) => write!(f, "{}", ethnicity),
        }
    }
}

/// Factor categories against every demographic group, as column percentages.
///
/// Records the factor couldn't score are dropped from every column.
#[derive(Debug, Clone)]
pub struct DemographicMatrix {
    by_group: Crosstab<CfCategory, DemographicGroup>,
    overall: Crosstab<CfCategory, &'static str>,
}

impl DemographicMatrix {
    pub fn build(cf: Cf, levels: &[Option<CfLevel>], demographics: &[Demographics]) -> Self {
        let pairs = levels
            .iter()
            .zip(demographics)
            .filter_map(|(level, demo)| CfCategory::from_level(cf, *level).map(|cat| (cat, demo)))
            .flat_map(|(cat, demo)| {
                DemographicGroup::of(demo).map(move |group| (Some(cat), Some(group)))
            });
        DemographicMatrix {
            by_group: Crosstab::build(
                format!("{} by demographics", cf.title()),
                CfCategory::all(cf),
                DemographicGroup::all(),
                pairs,
            ),
            overall: cf_distribution(cf, levels),
        }
    }

    pub fn title(&self) -> &str {
        self.by_group.title()
    }

    pub fn heading(&self) -> String {
        self.by_group.heading(Orientation::ColPct)
    }

    /// Number of scored records.
    pub fn scored(&self) -> usize {
        self.overall.grand_total()
    }

    pub fn by_group(&self) -> &Crosstab<CfCategory, DemographicGroup> {
        &self.by_group
    }

    /// Column percentage of a category within the whole scored sample.
    pub fn total_percent(&self, row: usize) -> Option<f64> {
        self.overall.percent(row, 0, Orientation::ColPct)
    }

    pub fn percent(&self, row: usize, col: usize) -> Option<f64> {
        self.by_group.percent(row, col, Orientation::ColPct)
    }

    pub fn term_table(&self) -> term_data_table::Table<'static> {
        use term_data_table::{Cell, Row, Table};
        let mut header = Row::new()
            .with_cell(Cell::from("Category"))
            .with_cell(Cell::from(with_n("Total", self.scored())));
        for (col, group) in self.by_group.groups().iter().enumerate() {
            header = header.with_cell(Cell::from(with_n(group, self.by_group.col_total(col))));
        }
        let mut table = Table::new().with_row(header);
        if self.scored() == 0 {
            return table.with_row(Row::new().with_cell(Cell::from("(No data)")));
        }
        for (row, category) in self.by_group.categories().iter().enumerate() {
            let mut cells = Row::new()
                .with_cell(Cell::from(category.to_string()))
                .with_cell(Cell::from(count_pct_cell(
                    self.overall.count(row, 0),
                    self.total_percent(row),
                )));
            for col in 0..self.by_group.groups().len() {
                cells = cells.with_cell(Cell::from(count_pct_cell(
                    self.by_group.count(row, col),
                    self.percent(row, col),
                )));
            }
            table.add_row(cells);
        }
        table
    }
}

/// Factor categories against the assigned GI, Unclassified included, largest row first.
pub fn gi_cf_crosstab(
    cf: Cf,
    levels: &[Option<CfLevel>],
    gi: &[Gi],
) -> Crosstab<CfCategory, Gi> {
    Crosstab::build(
        format!("{} by global impression", cf.title()),
        CfCategory::all(cf),
        Gi::ORDER.to_vec(),
        levels
            .iter()
            .zip(gi)
            .map(|(level, gi)| (CfCategory::from_level(cf, *level), Some(*gi))),
    )
    .sorted_by_total()
}

/// How many of a set of factors a record has at level 1 or above.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct CfCount(pub usize);

impl fmt::Display for CfCount {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            1 => f.write_str("1 CF"),
            n => write!(f, "{} CFs", n),
        }
    }
}

/// Count the factors present for one record. `None` if any of them is unscored.
pub fn cf_count(levels: &[Option<CfLevel>]) -> Option<CfCount> {
    let mut count = 0;
    for level in levels {
        if (*level)? >= 1 {
            count += 1;
        }
    }
    Some(CfCount(count))
}

/// Distribution of the factor count within each group.
///
/// `levels` holds one column per chosen factor, each parallel to `groups`.
pub fn cf_count_by_group<G>(
    title: impl Into<String>,
    levels: &[&[Option<CfLevel>]],
    groups: &[Option<G>],
    group_order: Vec<G>,
) -> Crosstab<CfCount, G>
where
    G: Clone + PartialEq + fmt::Display,
{
    let counts = (0..groups.len()).map(|idx| {
        let record: Vec<Option<CfLevel>> = levels
            .iter()
            .map(|col| col.get(idx).copied().flatten())
            .collect();
        cf_count(&record)
    });
    Crosstab::build(
        title,
        (0..=levels.len()).map(CfCount).collect(),
        group_order,
        counts.zip(groups.iter().cloned()),
    )
}

#[cfg(test)]
mod test {
    use super::{
        cf_count, cf_count_by_group, gi_cf_crosstab, CfCount, Crosstab, DemographicGroup,
        DemographicMatrix, Orientation,
    };
    use crate::{
        cf::{Cf, CfCategory},
        demographics::{AgeBin, Demographics, Gender},
        gi::Gi,
        Record, Survey,
    };

    fn sample() -> Crosstab<&'static str, &'static str> {
        Crosstab::build(
            "sample",
            vec!["a", "b", "c"],
            vec!["x", "y", "z"],
            vec![
                (Some("a"), Some("x")),
                (Some("a"), Some("y")),
                (Some("a"), Some("y")),
                (Some("b"), Some("x")),
                (Some("b"), None),
                (None, Some("z")),
                (Some("q"), Some("x")),
            ],
        )
    }

    #[test]
    fn row_percentages_sum_to_100() {
        let table = sample();
        for row in 0..2 {
            let sum: f64 = (0..3)
                .filter_map(|col| table.percent(row, col, Orientation::RowPct))
                .sum();
            assert!((sum - 100.).abs() < 0.1, "row {} sums to {}", row, sum);
        }
        // empty row has no denominator
        assert_eq!(table.percent(2, 0, Orientation::RowPct), None);
    }

    #[test]
    fn column_and_overall_percentages() {
        let table = sample();
        assert_eq!(table.percent(0, 0, Orientation::ColPct), Some(50.));
        assert_eq!(
            table.percent(0, 1, Orientation::OverallPct { total: 8 }),
            Some(25.)
        );
        assert_eq!(table.row_share(0, Orientation::OverallPct { total: 6 }), Some(50.));
        assert_eq!(table.row_share(1, Orientation::RowPct), Some(25.));
    }

    #[test]
    fn counts_match_the_pairs() {
        let table = sample();
        assert_eq!(table.row_total(0), 3);
        assert_eq!(table.row_total(1), 1);
        assert_eq!(table.col_total(0), 2);
        assert_eq!(table.grand_total(), 4);
        assert_eq!(table.excluded(), 3);
        assert_eq!(table.count_of(&"a", &"y"), 2);
    }

    #[test]
    fn unseen_categories_and_groups_are_kept() {
        let table = sample();
        assert_eq!(table.categories(), &["a", "b", "c"]);
        assert_eq!(table.col_total(2), 0);
        let long = table.to_long(Orientation::ColPct);
        assert_eq!(long.len(), 9);
        assert_eq!(long[8].count, 0);
        assert_eq!(long[8].percent, None);
    }

    #[test]
    fn sort_by_total() {
        let table = Crosstab::build(
            "t",
            vec![0, 1, 2],
            vec!["g"],
            vec![
                (Some(1), Some("g")),
                (Some(1), Some("g")),
                (Some(2), Some("g")),
            ],
        )
        .sorted_by_total();
        assert_eq!(table.categories(), &[1, 2, 0]);
        assert_eq!(table.count(0, 0), 2);
        assert_eq!(table.count(2, 0), 0);
    }

    #[test]
    fn gi_table_keeps_unclassified() {
        let levels = [Some(0), Some(2), None, Some(2)];
        let gi = [Gi::Unclassified, Gi::V, Gi::I, Gi::III];
        let table = gi_cf_crosstab(Cf::HospitalAdmissions, &levels, &gi);
        assert_eq!(table.groups().len(), 6);
        assert_eq!(table.categories()[0], CfCategory::new(Cf::HospitalAdmissions, 2));
        assert_eq!(
            table.count_of(&CfCategory::new(Cf::HospitalAdmissions, 0), &Gi::Unclassified),
            1
        );
        assert_eq!(table.excluded(), 1);
    }

    #[test]
    fn demographic_matrix_is_column_normalised() {
        let levels = [Some(0), Some(1), Some(1), None];
        let demographics = [
            Demographics {
                age: Some(AgeBin::Under40),
                gender: Some(Gender::Male),
                ethnicity: None,
            },
            Demographics {
                age: Some(AgeBin::Under40),
                gender: Some(Gender::Female),
                ethnicity: None,
            },
            Demographics {
                age: Some(AgeBin::Over85),
                gender: None,
                ethnicity: None,
            },
            Demographics {
                age: Some(AgeBin::Under40),
                gender: Some(Gender::Male),
                ethnicity: None,
            },
        ];
        let matrix = DemographicMatrix::build(Cf::NursingNeeds, &levels, &demographics);
        assert_eq!(matrix.scored(), 3);
        let under_40 = matrix
            .by_group()
            .groups()
            .iter()
            .position(|g| *g == DemographicGroup::Age(AgeBin::Under40))
            .unwrap();
        assert_eq!(matrix.by_group().col_total(under_40), 2);
        assert_eq!(matrix.percent(0, under_40), Some(50.));
        assert_eq!(matrix.percent(1, under_40), Some(50.));
        assert_eq!(matrix.total_percent(1).map(|p| p.round()), Some(67.));
    }

    #[test]
    fn factor_counts() {
        assert_eq!(cf_count(&[Some(0), Some(2), Some(1)]), Some(CfCount(2)));
        assert_eq!(cf_count(&[Some(0), None]), None);
        assert_eq!(CfCount(0).to_string(), "0 CFs");
        assert_eq!(CfCount(1).to_string(), "1 CF");

        let hospital: &[Option<u8>] = &[Some(0), Some(1), Some(2)];
        let groups = [Some(Gender::Male), Some(Gender::Male), None];
        let table = cf_count_by_group(
            "Hospital admissions by gender",
            &[hospital],
            &groups,
            Gender::ALL.to_vec(),
        );
        assert_eq!(table.categories(), &[CfCount(0), CfCount(1)]);
        assert_eq!(table.count_of(&CfCount(0), &Gender::Male), 1);
        assert_eq!(table.count_of(&CfCount(1), &Gender::Male), 1);
        assert_eq!(table.excluded(), 1);
    }

    #[test]
    fn three_respondent_scenario() {
        let adl_iadl = crate::cf::ADL
            .iter()
            .chain(crate::cf::IADL.iter())
            .map(|q| (*q, 2));
        let a = Record::from_pairs(adl_iadl).with("Q96", 0).with("Q2", 50);
        let b = Record::from_pairs([("Q96", 777)]);
        let c = Record::from_pairs([
            ("Q107_1", 1),
            ("Q107_2", 1),
            ("Q107_3", 0),
            ("Q107_4", 0),
            ("Q96", 1),
            ("Q2", 70),
        ]);
        let survey: Survey = vec![a, b, c].into_iter().collect();

        assert_eq!(Cf::FunctionalAssessment.classify(&survey[0]), Some(0));
        assert_eq!(Cf::NursingNeeds.classify(&survey[2]), Some(2));
        let hospital = Cf::HospitalAdmissions.classify_all(&survey);
        assert_eq!(hospital, vec![Some(0), None, Some(1)]);

        let distribution = super::cf_distribution(Cf::HospitalAdmissions, &hospital);
        assert_eq!(survey.len(), 3);
        assert_eq!(distribution.grand_total(), 2);

        let ages: Vec<Option<AgeBin>> = survey
            .iter_ref()
            .map(|rec| Demographics::from_record(rec).age)
            .collect();
        let categories: Vec<Option<CfCategory>> = hospital
            .iter()
            .map(|level| CfCategory::from_level(Cf::HospitalAdmissions, *level))
            .collect();
        let table = Crosstab::from_columns(
            "Hospital admissions by age",
            CfCategory::all(Cf::HospitalAdmissions),
            AgeBin::ALL.to_vec(),
            &categories,
            &ages,
        );
        assert_eq!(table.excluded(), 1);
        let none = CfCategory::new(Cf::HospitalAdmissions, 0);
        let row = table.categories().iter().position(|c| *c == none).unwrap();
        let col = AgeBin::ALL
            .iter()
            .position(|a| *a == AgeBin::From40To65)
            .unwrap();
        assert_eq!(table.percent(row, col, Orientation::RowPct), Some(100.));
    }
}
