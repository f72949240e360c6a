//! Specialist medical service needs, read off the global impression.
use super::CfLevel;
use crate::{gi, Gi, Record};

pub fn from_gi(gi: Gi) -> CfLevel {
    match gi {
        Gi::III | Gi::IV => 1,
        Gi::V => 2,
        Gi::I | Gi::II | Gi::Unclassified => 0,
    }
}

/// Unscored when none of the global impression inputs has a usable answer.
pub fn classify(record: &Record) -> Option<CfLevel> {
    if !gi::has_usable_input(record) {
        return None;
    }
    Some(from_gi(gi::assign_gi(record)))
}
