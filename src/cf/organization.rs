//! Organization of care: how many doctors and sites of care the respondent sees, from visit
//! counts at a GP (Q80), a polyclinic (Q85) and a specialist outpatient clinic (Q91).
use super::CfLevel;
use crate::{value::is_sentinel, Record};

pub const SITES: [&str; 3] = ["Q80", "Q85", "Q91"];

pub const SITE_LABELS: [&str; 3] = ["GP", "Polyclinic", "Specialist Outpatient Clinic"];

pub fn classify(record: &Record) -> Option<CfLevel> {
    let mut seen = [false; 3];
    for (site, q) in seen.iter_mut().zip(SITES) {
        let visits = record.int(q).filter(|v| *v >= 0 && !is_sentinel(*v))?;
        *site = visits >= 1;
    }
    Some(match seen {
        [false, false, false] | [true, false, false] | [false, false, true] => 0,
        [false, true, false] => 1,
        _ => 2,
    })
}
