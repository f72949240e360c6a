//! The scored survey: every derived column worked out once, up front.
//!
//! Derived columns are parallel to the survey's records and are never written back into it. All
//! of the report builders read from here.
use crate::{
    cf::{Cf, CfCategory, CfColumn, CfLevel},
    crosstab::{self, CfCount, Crosstab, DemographicMatrix, Orientation},
    demographics::{AgeBin, Demographics},
    gi::{self, Gi, GiDistribution, GiFlags, StepSummary},
    utilization::{
        self, CfUtilBinned, CfUtilCrosstab, FineBin, GiMembership, UtilLongRow, UtilMode,
        UtilQuestion, VisitPolicy,
    },
    Survey,
};
use itertools::Itertools;
use qu::ick_use::*;
use std::{collections::BTreeMap, sync::Arc};

pub type Levels = Arc<Vec<Option<CfLevel>>>;

#[derive(Debug, Clone)]
pub struct Analysis {
    survey: Survey,
    total: usize,
    cfs: BTreeMap<CfColumn, Levels>,
    gi_flags: Arc<Vec<GiFlags>>,
    gi: Arc<Vec<Gi>>,
    gi_stepwise: Arc<Vec<Gi>>,
    steps: Arc<Vec<StepSummary>>,
    demographics: Arc<Vec<Demographics>>,
}

impl Analysis {
    /// Score everything. `total` is the fixed overall denominator, or the number of records if
    /// `None`.
    pub fn new(survey: Survey, total: Option<usize>) -> Self {
        let mut cfs = BTreeMap::new();
        for cf in Cf::ALL {
            cfs.insert(CfColumn::raw(cf), Arc::new(cf.classify_all(&survey)));
            if let Some(imputed) = cf.classify_imputed(&survey) {
                cfs.insert(CfColumn::imputed(cf), Arc::new(imputed));
            }
        }

        let gi_flags: Vec<GiFlags> = survey.iter_ref().map(GiFlags::from_record).collect();
        let gi: Vec<Gi> = gi_flags.iter().map(GiFlags::most_severe).collect();
        let (gi_stepwise, steps) = gi::assign_stepwise(&gi_flags);
        let demographics = survey.iter_ref().map(Demographics::from_record).collect();

        let total = total.unwrap_or(survey.len());
        event!(
            Level::INFO,
            "scored {} records into {} derived columns (overall N={})",
            survey.len(),
            cfs.len(),
            total
        );
        Analysis {
            survey,
            total,
            cfs,
            gi_flags: Arc::new(gi_flags),
            gi: Arc::new(gi),
            gi_stepwise: Arc::new(gi_stepwise),
            steps: Arc::new(steps),
            demographics: Arc::new(demographics),
        }
    }

    pub fn survey(&self) -> &Survey {
        &self.survey
    }

    /// The overall denominator.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn columns(&self) -> impl Iterator<Item = CfColumn> + '_ {
        self.cfs.keys().copied()
    }

    pub fn column(&self, column: CfColumn) -> Option<&[Option<CfLevel>]> {
        self.cfs.get(&column).map(|levels| levels.as_slice())
    }

    /// The factor as scored from the raw answers.
    pub fn levels(&self, cf: Cf) -> &[Option<CfLevel>] {
        self.column(CfColumn::raw(cf)).unwrap_or(&[])
    }

    /// The factor scored after its imputation, if it has one.
    pub fn imputed_levels(&self, cf: Cf) -> Option<&[Option<CfLevel>]> {
        self.column(CfColumn::imputed(cf))
    }

    pub fn gi_flags(&self) -> &[GiFlags] {
        &self.gi_flags
    }

    /// GI by severity precedence.
    pub fn gi(&self) -> &[Gi] {
        &self.gi
    }

    /// GI by stepwise escalation.
    pub fn gi_stepwise(&self) -> &[Gi] {
        &self.gi_stepwise
    }

    pub fn steps(&self) -> &[StepSummary] {
        &self.steps
    }

    pub fn demographics(&self) -> &[Demographics] {
        &self.demographics
    }

    pub fn overall(&self) -> Orientation {
        Orientation::OverallPct { total: self.total }
    }

    pub fn cf_distribution(&self, column: CfColumn) -> Crosstab<CfCategory, &'static str> {
        let levels = self.column(column).unwrap_or(&[]);
        crosstab::cf_distribution(column.cf, levels)
    }

    pub fn demographic_matrix(&self, cf: Cf) -> DemographicMatrix {
        DemographicMatrix::build(cf, self.levels(cf), &self.demographics)
    }

    pub fn cf_by_age(&self, cf: Cf) -> Crosstab<CfCategory, AgeBin> {
        Crosstab::build(
            format!("{} by age", cf.title()),
            CfCategory::all(cf),
            AgeBin::ALL.to_vec(),
            self.levels(cf)
                .iter()
                .zip(self.demographics.iter())
                .map(|(level, demo)| (CfCategory::from_level(cf, *level), demo.age)),
        )
    }

    pub fn gi_cf_crosstab(&self, cf: Cf) -> Crosstab<CfCategory, Gi> {
        crosstab::gi_cf_crosstab(cf, self.levels(cf), &self.gi)
    }

    pub fn gi_distribution(&self) -> GiDistribution {
        GiDistribution::new(&self.gi)
    }

    pub fn gi_stepwise_distribution(&self) -> GiDistribution {
        GiDistribution::new(&self.gi_stepwise)
    }

    /// How many of `factors` each respondent has, by age band.
    pub fn cf_count_by_age(&self, factors: &[Cf]) -> Crosstab<CfCount, AgeBin> {
        let levels: Vec<&[Option<CfLevel>]> = factors.iter().map(|cf| self.levels(*cf)).collect();
        let ages: Vec<Option<AgeBin>> = self.demographics.iter().map(|demo| demo.age).collect();
        crosstab::cf_count_by_group(
            format!(
                "Number of complicating factors ({}) by age",
                factors.iter().map(|cf| cf.letter()).join(", ")
            ),
            &levels,
            &ages,
            AgeBin::ALL.to_vec(),
        )
    }

    /// Factor categories by coarse visit bins for one question. `column` may be an imputed
    /// factor, in which case it's empty if the factor has no imputation.
    pub fn cf_util_binned(
        &self,
        column: CfColumn,
        question: UtilQuestion,
        policy: VisitPolicy,
    ) -> CfUtilBinned {
        let levels = self.column(column).unwrap_or(&[]);
        utilization::cf_util_binned(column, levels, &self.survey, question, policy)
    }

    pub fn cf_util_long(&self, column: CfColumn, policy: VisitPolicy) -> Vec<UtilLongRow> {
        let levels = self.column(column).unwrap_or(&[]);
        utilization::cf_util_long(column, levels, &self.survey, &UtilQuestion::ALL, policy)
    }

    pub fn cf_util_crosstab(&self, cf: Cf, mode: UtilMode) -> CfUtilCrosstab {
        utilization::cf_util_crosstab(cf, self.levels(cf), &self.survey, &UtilQuestion::ALL, mode)
    }

    pub fn gi_util_long(&self, gi: Gi, question: UtilQuestion) -> Crosstab<FineBin, GiMembership> {
        utilization::gi_util_long(&self.gi, gi, &self.survey, question)
    }
}

#[cfg(test)]
mod test {
    use super::Analysis;
    use crate::{
        cf::{Cf, CfCategory, CfColumn},
        crosstab::CfCount,
        demographics::AgeBin,
        gi::Gi,
        utilization::{CoarseBin, UtilMode, UtilQuestion, VisitPolicy},
        Record, Survey,
    };

    fn survey() -> Survey {
        vec![
            Record::from_pairs([("Q2", 50), ("Q96", 0), ("Q107_1", 999)]),
            Record::from_pairs([("Q2", 70), ("Q96", 777), ("Q107_1", 1), ("Q107_2", 1)]),
            Record::from_pairs([("Q2", 90), ("Q96", 4), ("Q107_1", 0), ("Q107_2", 1)]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn columns_are_scored_once() {
        let analysis = Analysis::new(survey(), None);
        assert_eq!(analysis.total(), 3);
        assert_eq!(analysis.levels(Cf::HospitalAdmissions), &[Some(0), None, Some(2)]);
        assert_eq!(analysis.levels(Cf::NursingNeeds), &[None, Some(2), Some(1)]);
        assert_eq!(
            analysis.imputed_levels(Cf::NursingNeeds),
            Some(&[Some(0), Some(2), Some(1)][..])
        );
        assert_eq!(analysis.imputed_levels(Cf::HospitalAdmissions), None);
        // 12 raw and 5 imputed
        assert_eq!(analysis.columns().count(), 17);
        assert_eq!(analysis.gi().len(), 3);
        assert_eq!(analysis.gi_stepwise().len(), 3);
        assert_eq!(analysis.steps().len(), 4);
        // nothing was written back
        assert!(!analysis.survey().has_column("Nursing_Needs"));
    }

    #[test]
    fn overall_total_comes_from_config() {
        let analysis = Analysis::new(survey(), Some(10));
        let table = analysis.cf_distribution(CfColumn::raw(Cf::HospitalAdmissions));
        assert_eq!(table.grand_total(), 2);
        assert_eq!(table.percent(0, 0, analysis.overall()), Some(10.));
        assert_eq!(table.row_share(0, analysis.overall()), Some(10.));
    }

    #[test]
    fn utilization_by_imputed_factor() {
        let analysis = Analysis::new(survey(), None);
        let column = CfColumn::imputed(Cf::NursingNeeds);
        let table = analysis.cf_util_binned(
            column,
            UtilQuestion::PublicAdmissions,
            VisitPolicy::for_column(column),
        );
        // the 999 on Q107_1 is imputed, and so is the 777 on Q96
        assert_eq!(table.scored(), 3);
        assert_eq!(table.bins().grand_total(), 3);
        assert_eq!(
            table
                .bins()
                .count_of(&CfCategory::new(Cf::NursingNeeds, 2), &CoarseBin::Zero),
            1
        );

        let none = analysis.cf_util_binned(
            CfColumn::imputed(Cf::HospitalAdmissions),
            UtilQuestion::PublicAdmissions,
            VisitPolicy::SentinelsZero,
        );
        assert_eq!(none.scored(), 0);
    }

    #[test]
    fn reports() {
        let analysis = Analysis::new(survey(), None);

        let by_age = analysis.cf_by_age(Cf::HospitalAdmissions);
        assert_eq!(
            by_age.count_of(&CfCategory::new(Cf::HospitalAdmissions, 2), &AgeBin::Over85),
            1
        );
        assert_eq!(by_age.excluded(), 1);

        let counts = analysis.cf_count_by_age(&[Cf::HospitalAdmissions, Cf::NursingNeeds]);
        assert_eq!(counts.count_of(&CfCount(2), &AgeBin::Over85), 1);
        assert_eq!(counts.grand_total(), 1);

        let gi = analysis.gi_distribution();
        assert_eq!(gi.total(), 3);
        assert_eq!(Gi::ORDER.into_iter().map(|g| gi.count(g)).sum::<usize>(), 3);

        let binned = analysis.cf_util_binned(
            CfColumn::raw(Cf::NursingNeeds),
            UtilQuestion::PublicAdmissions,
            VisitPolicy::SentinelsMissing,
        );
        assert_eq!(binned.bins().grand_total(), 1);
        assert_eq!(binned.scored(), 2);
        let sums = analysis.cf_util_crosstab(Cf::HospitalAdmissions, UtilMode::Sum);
        assert_eq!(sums.cells[2][4], 4);
        let imputed = CfColumn::imputed(Cf::FinancialChallenges);
        let long = analysis.cf_util_long(imputed, VisitPolicy::for_column(imputed));
        assert_eq!(long.len(), 48);
        assert!(analysis.gi_util_long(Gi::I, UtilQuestion::Emergency).is_empty());
    }
}
