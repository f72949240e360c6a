//! Named imputation passes: replace specific special codes in specific columns before a factor is
//! scored again.
//!
//! The survey passed in is never changed. Every pass produces a new `Survey`.
use crate::{Record, Survey, Value};
use qu::ick_use::*;

/// Replace exact integer codes in one column.
#[derive(Debug, Copy, Clone)]
pub struct ImputeStep {
    pub column: &'static str,
    /// `(from, to)` pairs.
    pub mapping: &'static [(i64, i64)],
}

/// A sequence of steps that together make up a factor's imputation.
#[derive(Debug, Copy, Clone)]
pub struct Imputation {
    pub steps: &'static [ImputeStep],
}

impl Imputation {
    pub fn apply(&self, survey: &Survey) -> Survey {
        self.steps
            .iter()
            .fold(survey.clone(), |survey, step| {
                impute(&survey, step.column, step.mapping)
            })
    }

    /// The columns this imputation touches.
    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.steps.iter().map(|step| step.column)
    }
}

const NOT_APPLICABLE_TO_ZERO: &[(i64, i64)] = &[(999, 0)];
const REFUSED_OR_NA_TO_ZERO: &[(i64, i64)] = &[(777, 0), (999, 0)];
const NA_OR_REFUSED_TO_NO: &[(i64, i64)] = &[(3, 2), (777, 2)];
const ANY_SPECIAL_TO_ZERO: &[(i64, i64)] = &[(777, 0), (888, 0), (999, 0)];

const fn step(column: &'static str, mapping: &'static [(i64, i64)]) -> ImputeStep {
    ImputeStep { column, mapping }
}

/// Task not applicable counts as not needed.
pub static NURSING: Imputation = Imputation {
    steps: &[
        step("Q107_1", NOT_APPLICABLE_TO_ZERO),
        step("Q107_2", NOT_APPLICABLE_TO_ZERO),
        step("Q107_3", NOT_APPLICABLE_TO_ZERO),
        step("Q107_4", NOT_APPLICABLE_TO_ZERO),
    ],
};

pub static REHAB: Imputation = Imputation {
    steps: &[
        step("Q107_5", NOT_APPLICABLE_TO_ZERO),
        step("Q107_6", NOT_APPLICABLE_TO_ZERO),
        step("Q107_7", NOT_APPLICABLE_TO_ZERO),
    ],
};

/// Refused or not applicable counts as taking no medication.
pub static POLYPHARMACY: Imputation = Imputation {
    steps: &[step("Q132", REFUSED_OR_NA_TO_ZERO)],
};

/// A hospital visit that was not applicable or refused counts as "no" on Q110.
pub static FINANCIAL: Imputation = Imputation {
    steps: &[step("Q110", NA_OR_REFUSED_TO_NO)],
};

/// Special codes on the site-of-care visit counts count as no visits.
pub static ORGANIZATION_OF_CARE: Imputation = Imputation {
    steps: &[
        step("Q80", ANY_SPECIAL_TO_ZERO),
        step("Q85", ANY_SPECIAL_TO_ZERO),
        step("Q91", ANY_SPECIAL_TO_ZERO),
    ],
};

/// A copy of `survey` with the codes in `mapping` replaced in `column`.
///
/// Only values that are exactly one of the `from` codes change. If the column doesn't exist the
/// survey is returned as it is.
pub fn impute(survey: &Survey, column: &str, mapping: &[(i64, i64)]) -> Survey {
    if !survey.has_column(column) {
        event!(
            Level::DEBUG,
            "column {} not in dataset, nothing to impute",
            column
        );
        return survey.clone();
    }

    let mut replaced = 0;
    let records = survey
        .iter_ref()
        .map(|rec| {
            let to = rec
                .get(column)
                .as_code()
                .and_then(|code| mapping.iter().find(|(from, _)| *from == code))
                .map(|(_, to)| *to);
            match to {
                Some(to) => {
                    replaced += 1;
                    rec.clone().with(column, Value::Int(to))
                }
                None => rec.clone(),
            }
        })
        .collect::<Vec<Record>>();
    event!(
        Level::DEBUG,
        "imputed {} value(s) in column {}",
        replaced,
        column
    );
    survey.replace_records(records)
}

/// Apply a named imputation plan.
pub fn impute_survey(survey: &Survey, plan: &Imputation) -> Survey {
    plan.apply(survey)
}

#[cfg(test)]
mod test {
    use super::{impute, impute_survey, FINANCIAL, NURSING, ORGANIZATION_OF_CARE};
    use crate::{Cf, Record, Survey, Value};

    fn survey() -> Survey {
        vec![
            Record::from_pairs([("Q110", 3), ("Q107_1", 999), ("Q107_2", 1)]),
            Record::from_pairs([("Q110", 777), ("Q107_1", 0)]),
            Record::from_pairs([("Q110", 1), ("Q107_1", 999), ("Q107_2", 999)]),
            Record::from_pairs([("Q110", 888)]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn only_listed_codes_change() {
        let original = survey();
        let imputed = impute(&original, "Q110", &[(3, 2), (777, 2)]);
        assert_eq!(
            imputed.column("Q110").map(Value::as_int).collect::<Vec<_>>(),
            vec![Some(2), Some(2), Some(1), Some(888)]
        );
        // the input is untouched
        assert_eq!(
            original.column("Q110").map(Value::as_int).collect::<Vec<_>>(),
            vec![Some(3), Some(777), Some(1), Some(888)]
        );
    }

    #[test]
    fn idempotent() {
        let once = impute_survey(&survey(), &FINANCIAL);
        let twice = impute_survey(&once, &FINANCIAL);
        assert_eq!(&*once, &*twice);
        assert_eq!(
            Cf::FinancialChallenges.classify_all(&once),
            Cf::FinancialChallenges.classify_all(&twice)
        );
    }

    #[test]
    fn imputed_nursing_rescores() {
        let data = survey();
        assert_eq!(
            Cf::NursingNeeds.classify_all(&data),
            vec![Some(1), Some(0), None, None]
        );
        assert_eq!(
            Cf::NursingNeeds.classify_all(&impute_survey(&data, &NURSING)),
            vec![Some(1), Some(0), Some(0), None]
        );
    }

    #[test]
    fn missing_column_is_a_no_op() {
        let data = survey();
        let imputed = impute_survey(&data, &ORGANIZATION_OF_CARE);
        assert_eq!(&*data, &*imputed);
        assert_eq!(ORGANIZATION_OF_CARE.columns().count(), 3);
    }

    #[test]
    fn fractional_values_are_left_alone() {
        let data: Survey = vec![Record::new().with("Q110", 3.5)].into_iter().collect();
        let imputed = impute(&data, "Q110", &[(3, 2)]);
        assert_eq!(imputed[0].get("Q110"), &Value::Float(3.5));
    }
}
