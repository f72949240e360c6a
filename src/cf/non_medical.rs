//! Non-medical resource needs, from a checklist of stressful life events in the last year.
//!
//! Items Q185_1 to Q185_12 are 0 (not mentioned) or 1 (mentioned). Q185_13 is checked when none
//! of the events applied.
use super::CfLevel;
use crate::{value::is_sentinel, Record};

pub const ITEMS: [&str; 12] = [
    "Q185_1", "Q185_2", "Q185_3", "Q185_4", "Q185_5", "Q185_6", "Q185_7", "Q185_8", "Q185_9",
    "Q185_10", "Q185_11", "Q185_12",
];

const NOT_APPLICABLE_FLAG: &str = "Q185_13";

/// Events that count as major ongoing problems.
pub const HIGH_SEVERITY: [&str; 3] = ["Q185_4", "Q185_7", "Q185_8"];

pub(super) const QUESTIONS: [&str; 13] = [
    "Q185_1", "Q185_2", "Q185_3", "Q185_4", "Q185_5", "Q185_6", "Q185_7", "Q185_8", "Q185_9",
    "Q185_10", "Q185_11", "Q185_12", NOT_APPLICABLE_FLAG,
];

/// Labels for Q185_1 to Q185_13.
pub const ITEM_LABELS: [&str; 13] = [
    "Spouse/partner passing away",
    "Spouse/partner have life threatening illness or accident",
    "A family or close friend passing away/diagnosed with life threatening illness or accident",
    "Had major problems with money",
    "Divorced or breakup",
    "Major conflict with parents, spouse, children or grandchildren",
    "Major accidents/disasters/muggings/unwanted sexual experiences/robberies",
    "Physically abused or threatened",
    "Verbally abused",
    "Pet died",
    "Family member/close friend lost job/retired",
    "Others",
    "Not applicable",
];

const MENTIONED: i64 = 1;

pub fn classify(record: &Record) -> Option<CfLevel> {
    let usable = ITEMS
        .iter()
        .filter_map(|q| record.int(q))
        .filter(|v| !is_sentinel(*v))
        .collect::<Vec<_>>();
    if usable.is_empty() {
        return None;
    }

    let not_applicable = record.int(NOT_APPLICABLE_FLAG) == Some(MENTIONED);
    if not_applicable && usable.iter().all(|v| *v == 0) {
        Some(0)
    } else if HIGH_SEVERITY
        .iter()
        .any(|q| record.int(q) == Some(MENTIONED))
    {
        Some(2)
    } else {
        Some(1)
    }
}
