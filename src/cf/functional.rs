//! Functional assessment from activities of daily living (ADL) and instrumental activities of
//! daily living (IADL). Each item asks whether the respondent needs help: 1 is yes, 2 is no.
use super::CfLevel;
use crate::Record;

pub const ADL: [&str; 6] = [
    "Q155_i", "Q155_ii", "Q155_iii", "Q155_iv", "Q155_v", "Q155_vi",
];

pub const ADL_LABELS: [&str; 6] = [
    "Bathing",
    "Dressing",
    "Transferring",
    "Using the toilet",
    "Continence",
    "Eating",
];

pub const IADL: [&str; 7] = [
    "Q167_i", "Q167_ii", "Q167_iii", "Q167_iv", "Q167_v", "Q167_vi", "Q167_vii",
];

pub const IADL_LABELS: [&str; 7] = [
    "Handling personal finances",
    "Meal preparation",
    "Shopping",
    "Travelling",
    "Doing housework",
    "Using the telephone",
    "Taking Medications",
];

pub(super) const QUESTIONS: [&str; 13] = [
    "Q155_i", "Q155_ii", "Q155_iii", "Q155_iv", "Q155_v", "Q155_vi", "Q167_i", "Q167_ii",
    "Q167_iii", "Q167_iv", "Q167_v", "Q167_vi", "Q167_vii",
];

const YES: i64 = 1;
const NO: i64 = 2;

/// - 0 when every ADL and every IADL item is "no"
/// - 1 when every ADL item is "no" and at least one IADL item is "yes"
/// - 2 when any ADL item is "yes", or any IADL item is "yes" while the ADL block is incomplete
///
/// Anything else (including partial answers with no "yes") is unscored.
pub fn classify(record: &Record) -> Option<CfLevel> {
    let adl: Vec<Option<i64>> = ADL.iter().map(|q| record.int(q)).collect();
    let iadl: Vec<Option<i64>> = IADL.iter().map(|q| record.int(q)).collect();

    let all_no = |items: &[Option<i64>]| items.iter().all(|v| *v == Some(NO));
    let any_yes = |items: &[Option<i64>]| items.iter().any(|v| *v == Some(YES));

    if all_no(&adl) && all_no(&iadl) {
        Some(0)
    } else if all_no(&adl) && any_yes(&iadl) {
        Some(1)
    } else if any_yes(&adl) || any_yes(&iadl) {
        Some(2)
    } else {
        None
    }
}
