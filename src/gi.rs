//! Global impressions (GIs).
//!
//! Five overlapping predicates, GI I (healthy) to GI V (limited reserve with serious
//! exacerbations), are evaluated independently for each record. A reducer then picks a single
//! label per record. [`assign_gi`] resolves overlaps by severity and is the assignment every other
//! report uses; [`assign_stepwise`] is the escalation variant, kept for its step summary.
use crate::{
    util::{count_pct_cell, pct},
    value::{is_sentinel, REFUSED, NOT_APPLICABLE},
    Record, Survey,
};
use itertools::{chain, Itertools};
use once_cell::sync::Lazy;
use qu::ick_use::*;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};

/// Non-life-threatening chronic conditions.
pub const NON_LIFE_THREATENING: [&str; 12] = [
    "Q130_G", "Q130_J", "Q130_K", "Q130_L", "Q130_O", "Q130_P", "Q130_Q", "Q130_S", "Q130_T",
    "Q130_U", "Q130_V", "Q130_W",
];

/// Potentially life-threatening chronic conditions.
pub const LIFE_THREATENING: [&str; 9] = [
    "Q130_A", "Q130_B", "Q130_C", "Q130_D", "Q130_E", "Q130_F", "Q130_H", "Q130_I", "Q130_M",
];

/// Ever told of high blood pressure, diabetes, high cholesterol, dementia, and any other chronic
/// condition. 2 is "no".
pub const HEALTHY_SCREEN: [&str; 5] = ["Q124", "Q126", "Q128", "Q129", "Q130"];

const BLOOD_PRESSURE: &str = "Q124";
const DEMENTIA: &str = "Q129";
/// Limited by a health problem in usual activities: 1 a lot, 2 a little, 3 not at all.
const ACTIVITY_LIMITATION: &str = "Q142";
/// Interview respondent: 2 when answered by proxy.
const PROXY: &str = "S0";
const PUBLIC_ADMISSIONS: &str = "Q96";
const PRIVATE_ADMISSIONS: &str = "Q103";

/// Every column any GI predicate reads.
pub static INPUT_COLUMNS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    chain!(
        HEALTHY_SCREEN,
        NON_LIFE_THREATENING,
        LIFE_THREATENING,
        [ACTIVITY_LIMITATION, PROXY, PUBLIC_ADMISSIONS, PRIVATE_ADMISSIONS],
        crate::cf::COGNITION_ITEMS
    )
    .collect()
});

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Gi {
    I,
    II,
    III,
    IV,
    V,
    Unclassified,
}

impl Gi {
    /// Display order.
    pub const ORDER: [Gi; 6] = [Gi::I, Gi::II, Gi::III, Gi::IV, Gi::V, Gi::Unclassified];

    /// The five real categories, most severe first.
    const BY_SEVERITY: [Gi; 5] = [Gi::V, Gi::IV, Gi::III, Gi::II, Gi::I];

    pub fn label(self) -> &'static str {
        use Gi::*;
        match self {
            I => "GI I",
            II => "GI II",
            III => "GI III",
            IV => "GI IV",
            V => "GI V",
            Unclassified => "Unclassified",
        }
    }

    pub fn description(self) -> &'static str {
        use Gi::*;
        match self {
            I => "Healthy",
            II => "Chronic conditions, asymptomatic",
            III => {
                "Chronic conditions, stable but moderately/seriously symptomatic or silently severe"
            }
            IV => "Long course of decline",
            V => "Limited reserve & serious exacerbations",
            Unclassified => "Meets none of the GI definitions",
        }
    }
}

impl fmt::Display for Gi {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Gi {
    type Err = Error;
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let numeral = input
            .strip_prefix("GI")
            .or_else(|| input.strip_prefix("gi"))
            .unwrap_or(input)
            .trim();
        Gi::ORDER
            .into_iter()
            .find(|gi| {
                gi.label().eq_ignore_ascii_case(input)
                    || gi
                        .label()
                        .strip_prefix("GI ")
                        .map_or(false, |n| n.eq_ignore_ascii_case(numeral))
            })
            .ok_or_else(|| format_err!("\"{}\" is not a global impression", input))
    }
}

/// The five GI predicates for one record. They can overlap.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GiFlags {
    pub i: bool,
    pub ii: bool,
    pub iii: bool,
    pub iv: bool,
    pub v: bool,
}

impl GiFlags {
    pub fn from_record(record: &Record) -> Self {
        let iv = gi_iv(record);
        GiFlags {
            i: healthy(record) && !iv,
            ii: gi_ii(record),
            iii: gi_iii(record),
            iv,
            v: gi_v(record),
        }
    }

    pub fn get(&self, gi: Gi) -> bool {
        match gi {
            Gi::I => self.i,
            Gi::II => self.ii,
            Gi::III => self.iii,
            Gi::IV => self.iv,
            Gi::V => self.v,
            Gi::Unclassified => !self.any(),
        }
    }

    pub fn any(&self) -> bool {
        self.i || self.ii || self.iii || self.iv || self.v
    }

    /// Severity precedence: V > IV > III > II > I > Unclassified.
    pub fn most_severe(&self) -> Gi {
        Gi::BY_SEVERITY
            .into_iter()
            .find(|gi| self.get(*gi))
            .unwrap_or(Gi::Unclassified)
    }
}

/// The canonical single GI label for a record.
pub fn assign_gi(record: &Record) -> Gi {
    GiFlags::from_record(record).most_severe()
}

/// Whether any GI input column has an answer other than a special code.
pub fn has_usable_input(record: &Record) -> bool {
    INPUT_COLUMNS
        .iter()
        .filter_map(|q| record.int(q))
        .any(|v| !is_sentinel(v))
}

fn is_yes(record: &Record, code: &str) -> bool {
    record.int(code) == Some(1)
}

fn any_yes(record: &Record, codes: &[&str]) -> bool {
    codes.iter().any(|q| is_yes(record, q))
}

fn elevated_bp(record: &Record) -> bool {
    matches!(record.int(BLOOD_PRESSURE), Some(1 | 3))
}

fn healthy(record: &Record) -> bool {
    HEALTHY_SCREEN.iter().all(|q| record.int(q) == Some(2))
}

fn gi_ii(record: &Record) -> bool {
    any_yes(record, &NON_LIFE_THREATENING)
        || elevated_bp(record)
        || record.int(ACTIVITY_LIMITATION) == Some(3)
}

fn gi_iii(record: &Record) -> bool {
    let limitation = record.int(ACTIVITY_LIMITATION);
    let chronic = any_yes(record, &NON_LIFE_THREATENING) || elevated_bp(record);
    (chronic && limitation == Some(1))
        || (any_yes(record, &LIFE_THREATENING) && limitation == Some(3))
}

/// At least two of: dementia reported by proxy, limited in usual activities, and an abbreviated
/// mental test score below 5.
fn gi_iv(record: &Record) -> bool {
    let proxy_dementia = record.int(PROXY) == Some(2) && is_yes(record, DEMENTIA);
    let limited = matches!(record.int(ACTIVITY_LIMITATION), Some(v) if v <= 2);

    let cognition = crate::cf::COGNITION_ITEMS
        .iter()
        .filter_map(|q| match record.int(q)? {
            1 => Some(1),
            2 | REFUSED | NOT_APPLICABLE => Some(0),
            _ => None,
        })
        .collect::<Vec<u32>>();
    let impaired = !cognition.is_empty() && cognition.iter().sum::<u32>() < 5;

    [proxy_dementia, limited, impaired]
        .iter()
        .filter(|c| **c)
        .count()
        >= 2
}

/// Two or more admissions (public or private) and a life-threatening condition. Special codes
/// count as no admissions.
fn gi_v(record: &Record) -> bool {
    let admissions = |q: &str| {
        record
            .int(q)
            .filter(|v| !is_sentinel(*v))
            .unwrap_or(0)
    };
    (admissions(PUBLIC_ADMISSIONS) >= 2 || admissions(PRIVATE_ADMISSIONS) >= 2)
        && any_yes(record, &LIFE_THREATENING)
}

/// One promotion step of the escalation reducer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepSummary {
    pub step: String,
    /// Records in the source buckets or the target after the step.
    pub eligible: usize,
    pub promoted: usize,
    pub total_in_target: usize,
}

/// Stepwise escalation: seed everyone meeting GI I, then promote those already labelled with a
/// milder GI who also meet the next one.
///
/// Unlike [`assign_gi`], a record only reaches a GI if it climbed there from GI I.
pub fn assign_stepwise(flags: &[GiFlags]) -> (Vec<Gi>, Vec<StepSummary>) {
    let mut labels: Vec<Gi> = flags
        .iter()
        .map(|f| if f.i { Gi::I } else { Gi::Unclassified })
        .collect();

    let steps = [Gi::II, Gi::III, Gi::IV, Gi::V]
        .into_iter()
        .enumerate()
        .map(|(idx, target)| {
            let from = &Gi::ORDER[..=idx];
            let mut promoted = 0;
            for (label, record_flags) in labels.iter_mut().zip(flags) {
                if from.contains(label) && record_flags.get(target) {
                    *label = target;
                    promoted += 1;
                }
            }
            let in_target = labels.iter().filter(|l| **l == target).count();
            StepSummary {
                step: format!(
                    "{} → {}",
                    from.iter().map(|gi| gi.label()).join("/"),
                    target.label()
                ),
                eligible: labels
                    .iter()
                    .filter(|l| from.contains(l) || **l == target)
                    .count(),
                promoted,
                total_in_target: in_target,
            }
        })
        .collect();

    (labels, steps)
}

/// Assign every record in the survey with the escalation reducer.
pub fn assign_gi_stepwise(survey: &Survey) -> (Vec<Gi>, Vec<StepSummary>) {
    let flags = survey
        .iter_ref()
        .map(GiFlags::from_record)
        .collect::<Vec<_>>();
    assign_stepwise(&flags)
}

/// Table of the escalation steps.
pub fn steps_term_table(steps: &[StepSummary]) -> term_data_table::Table<'_> {
    use term_data_table::{Cell, Row, Table};
    let mut table = Table::new().with_row(
        Row::new()
            .with_cell(Cell::from("Step"))
            .with_cell(Cell::from("Eligible in previous bucket"))
            .with_cell(Cell::from("Promoted this step"))
            .with_cell(Cell::from("Total now in target")),
    );
    for step in steps {
        table.add_row(
            Row::new()
                .with_cell(Cell::from(step.step.as_str()))
                .with_cell(Cell::from(step.eligible.to_string()))
                .with_cell(Cell::from(step.promoted.to_string()))
                .with_cell(Cell::from(step.total_in_target.to_string())),
        );
    }
    table
}

/// How many records got each GI label, over the whole sample.
#[derive(Debug, Clone, Serialize)]
pub struct GiDistribution {
    counts: BTreeMap<Gi, usize>,
    total: usize,
}

impl GiDistribution {
    pub fn new(labels: &[Gi]) -> Self {
        let mut counts: BTreeMap<Gi, usize> = Gi::ORDER.into_iter().map(|gi| (gi, 0)).collect();
        for gi in labels {
            *counts.entry(*gi).or_default() += 1;
        }
        GiDistribution {
            counts,
            total: labels.len(),
        }
    }

    pub fn count(&self, gi: Gi) -> usize {
        self.counts.get(&gi).copied().unwrap_or(0)
    }

    pub fn percent(&self, gi: Gi) -> Option<f64> {
        pct(self.count(gi), self.total)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// `(gi, count, percent)` in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Gi, usize, Option<f64>)> + '_ {
        Gi::ORDER
            .into_iter()
            .map(|gi| (gi, self.count(gi), self.percent(gi)))
    }

    pub fn term_table(&self) -> term_data_table::Table<'_> {
        use term_data_table::{Cell, Row, Table};
        let mut table = Table::new().with_row(
            Row::new()
                .with_cell(Cell::from("GI"))
                .with_cell(Cell::from("Description"))
                .with_cell(Cell::from("Count (%)")),
        );
        for (gi, count, pct) in self.iter() {
            table.add_row(
                Row::new()
                    .with_cell(Cell::from(gi.label()))
                    .with_cell(Cell::from(gi.description()))
                    .with_cell(Cell::from(count_pct_cell(count, pct))),
            );
        }
        table
    }
}

#[cfg(test)]
mod test {
    use super::{assign_gi, assign_stepwise, Gi, GiDistribution, GiFlags, INPUT_COLUMNS};
    use crate::Record;

    fn healthy() -> Record {
        Record::from_pairs([
            ("Q124", 2),
            ("Q126", 2),
            ("Q128", 2),
            ("Q129", 2),
            ("Q130", 2),
        ])
    }

    #[test]
    fn healthy_is_gi_i() {
        let flags = GiFlags::from_record(&healthy());
        assert!(flags.i);
        assert!(!flags.ii && !flags.iii && !flags.iv && !flags.v);
        assert_eq!(assign_gi(&healthy()), Gi::I);
    }

    #[test]
    fn decline_excludes_healthy() {
        // limited a lot and failed every cognition item
        let rec = (16..=26).fold(healthy().with("Q142", 1), |rec, n| {
            rec.with(&format!("Q{}", n), 2)
        });
        let flags = GiFlags::from_record(&rec);
        assert!(flags.iv);
        assert!(!flags.i);
        assert_eq!(assign_gi(&rec), Gi::IV);
    }

    #[test]
    fn cognition_needs_a_usable_item() {
        let rec = Record::from_pairs([("Q142", 2), ("Q16", 888)]);
        assert!(!GiFlags::from_record(&rec).iv);
        let rec = Record::from_pairs([("Q142", 2), ("Q16", 777)]);
        assert!(GiFlags::from_record(&rec).iv);
    }

    #[test]
    fn severity_beats_overlap() {
        // GI III (life threatening and not limited) and GI V (two admissions)
        let rec = Record::from_pairs([("Q130_A", 1), ("Q142", 3), ("Q96", 2)]);
        let flags = GiFlags::from_record(&rec);
        assert!(flags.iii && flags.v);
        assert_eq!(assign_gi(&rec), Gi::V);
        assert_eq!(assign_gi(&rec).label(), "GI V");
    }

    #[test]
    fn special_codes_are_not_admissions() {
        let rec = Record::from_pairs([("Q130_B", 1), ("Q96", 777), ("Q103", 666)]);
        assert!(!GiFlags::from_record(&rec).v);
        let rec = Record::from_pairs([("Q130_B", 1), ("Q96", 0), ("Q103", 4)]);
        assert!(GiFlags::from_record(&rec).v);
    }

    #[test]
    fn gi_ii_and_iii() {
        let rec = Record::from_pairs([("Q130_G", 1), ("Q142", 1)]);
        let flags = GiFlags::from_record(&rec);
        assert!(flags.ii && flags.iii);
        assert_eq!(flags.most_severe(), Gi::III);

        let rec = Record::from_pairs([("Q124", 3)]);
        assert_eq!(assign_gi(&rec), Gi::II);
        assert_eq!(assign_gi(&Record::new()), Gi::Unclassified);
    }

    #[test]
    fn stepwise_only_promotes_from_gi_i() {
        let flags = [
            // healthy and also meets GI II
            GiFlags {
                i: true,
                ii: true,
                ..Default::default()
            },
            // meets GI V without GI I
            GiFlags {
                v: true,
                ..Default::default()
            },
            GiFlags {
                i: true,
                ..Default::default()
            },
        ];
        let (labels, steps) = assign_stepwise(&flags);
        assert_eq!(labels, vec![Gi::II, Gi::Unclassified, Gi::I]);
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[0].step, "GI I → GI II");
        assert_eq!(steps[0].promoted, 1);
        assert_eq!(steps[0].eligible, 2);
        assert_eq!(steps[0].total_in_target, 1);
        assert_eq!(steps[3].promoted, 0);

        // the severity reducer disagrees on the second record
        assert_eq!(flags[1].most_severe(), Gi::V);
    }

    #[test]
    fn distribution_includes_every_label() {
        let dist = GiDistribution::new(&[Gi::I, Gi::I, Gi::V, Gi::Unclassified]);
        assert_eq!(dist.iter().count(), 6);
        assert_eq!(dist.count(Gi::I), 2);
        assert_eq!(dist.count(Gi::III), 0);
        assert_eq!(dist.percent(Gi::V), Some(25.));
    }

    #[test]
    fn parse() {
        assert_eq!("GI IV".parse::<Gi>().unwrap(), Gi::IV);
        assert_eq!("iii".parse::<Gi>().unwrap(), Gi::III);
        assert_eq!("Unclassified".parse::<Gi>().unwrap(), Gi::Unclassified);
        assert!("VI".parse::<Gi>().is_err());
    }

    #[test]
    fn input_columns_are_unique() {
        let mut cols = INPUT_COLUMNS.clone();
        cols.sort_unstable();
        cols.dedup();
        assert_eq!(cols.len(), INPUT_COLUMNS.len());
    }
}
