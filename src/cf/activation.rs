//! Activation in own care, from seven Likert items scored 0 (low) to 4 (high).
use super::CfLevel;
use crate::Record;

pub(super) const QUESTIONS: [&str; 7] = ["Q64", "Q65", "Q66", "Q67", "Q68", "Q69", "Q70"];

/// Mean over the valid (0 to 4) items: above 3.5 is 0, from 2.5 to 3.5 is 1, below 2.5 is 2.
pub fn classify(record: &Record) -> Option<CfLevel> {
    let valid = QUESTIONS
        .iter()
        .filter_map(|q| record.int(q))
        .filter(|v| (0..=4).contains(v))
        .collect::<Vec<_>>();
    if valid.is_empty() {
        return None;
    }
    let mean = valid.iter().sum::<i64>() as f64 / valid.len() as f64;
    Some(if mean > 3.5 {
        0
    } else if mean >= 2.5 {
        1
    } else {
        2
    })
}
