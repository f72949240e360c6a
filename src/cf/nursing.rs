//! Skilled task needs: nursing tasks and rehabilitation therapies.
//!
//! Each task is a checklist item, 0 "not mentioned" or 1 "mentioned". The level is the number of
//! tasks mentioned, capped at 2.
use super::CfLevel;
use crate::Record;

pub const NURSING: [&str; 4] = ["Q107_1", "Q107_2", "Q107_3", "Q107_4"];

pub const NURSING_LABELS: [&str; 4] = [
    "Wound dressing",
    "Injections",
    "Change of feeding tube",
    "Change of urinary catheter",
];

pub const REHAB: [&str; 3] = ["Q107_5", "Q107_6", "Q107_7"];

pub const REHAB_LABELS: [&str; 3] = [
    "Physiotherapy",
    "Speech therapy",
    "Occupational therapy",
];

pub fn classify_nursing(record: &Record) -> Option<CfLevel> {
    count_tasks(record, &NURSING)
}

pub fn classify_rehab(record: &Record) -> Option<CfLevel> {
    count_tasks(record, &REHAB)
}

fn count_tasks(record: &Record, tasks: &[&str]) -> Option<CfLevel> {
    let valid = tasks
        .iter()
        .filter_map(|q| record.int(q))
        .filter(|v| matches!(v, 0 | 1))
        .collect::<Vec<_>>();
    if valid.is_empty() {
        return None;
    }
    Some(match valid.iter().filter(|v| **v == 1).count() {
        0 => 0,
        1 => 1,
        _ => 2,
    })
}
