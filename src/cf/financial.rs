//! Financial challenges in accessing care.
//!
//! - Q108: skipped a GP or polyclinic visit because of cost? Q109: because it was too expensive.
//! - Q110: skipped a hospital visit because of cost? Q111: because it was too expensive.
//! - Q74: "I have enough money to meet my healthcare needs", 1 (strongly disagree) to 5.
use super::CfLevel;
use crate::{
    value::{is_sentinel, REFUSED},
    Record,
};

pub(super) const QUESTIONS: [&str; 5] = ["Q108", "Q109", "Q110", "Q111", "Q74"];

const YES: i64 = 1;
/// "Refused / X" on the paired yes/no questions.
const REFUSED_X: i64 = 4;

const YES_NO_LABELS: [(i64, &str); 4] = [
    (1, "Yes"),
    (2, "No"),
    (3, "Not applicable (no need for healthcare)"),
    (4, "Refused / X"),
];
const REASON_LABELS: [(i64, &str); 1] = [(1, "Could not afford to (too expensive)")];
const AGREEMENT_LABELS: [(i64, &str); 6] = [
    (1, "Strongly disagree"),
    (2, "Disagree"),
    (3, "Neither"),
    (4, "Agree"),
    (5, "Strongly agree"),
    (REFUSED, "Refused / X"),
];

/// Response labels for one of the financial questions, in display order.
pub fn value_labels(question: &str) -> &'static [(i64, &'static str)] {
    match question {
        "Q108" | "Q110" => &YES_NO_LABELS,
        "Q109" | "Q111" => &REASON_LABELS,
        "Q74" => &AGREEMENT_LABELS,
        _ => &[],
    }
}

pub fn classify(record: &Record) -> Option<CfLevel> {
    let usable = |q: &str| record.int(q).filter(|v| !is_sentinel(*v));
    let paired = |q: &str| usable(q).filter(|v| *v != REFUSED_X);

    let gp = paired("Q108");
    let gp_reason = usable("Q109");
    let hospital = paired("Q110");
    let hospital_reason = usable("Q111");
    let enough_money = usable("Q74");

    if [gp, gp_reason, hospital, hospital_reason, enough_money]
        .iter()
        .all(Option::is_none)
    {
        return None;
    }

    let skipped_gp = gp == Some(YES) && gp_reason == Some(YES);
    let skipped_hospital = hospital == Some(YES) && hospital_reason == Some(YES);
    let disagrees = matches!(enough_money, Some(1..=2));
    Some(if skipped_gp || skipped_hospital || disagrees {
        1
    } else {
        0
    })
}

#[cfg(test)]
mod test {
    use super::{classify, value_labels};
    use crate::Record;

    #[test]
    fn any_condition_flags() {
        let gp = Record::from_pairs([("Q108", 1), ("Q109", 1)]);
        assert_eq!(classify(&gp), Some(1));
        let hospital = Record::from_pairs([("Q110", 1), ("Q111", 1), ("Q74", 5)]);
        assert_eq!(classify(&hospital), Some(1));
        let money = Record::from_pairs([("Q108", 2), ("Q74", 2)]);
        assert_eq!(classify(&money), Some(1));
    }

    #[test]
    fn no_challenges() {
        let rec = Record::from_pairs([("Q108", 2), ("Q110", 3), ("Q74", 4)]);
        assert_eq!(classify(&rec), Some(0));
        // yes without the cost reason
        let rec = Record::from_pairs([("Q108", 1), ("Q74", 3)]);
        assert_eq!(classify(&rec), Some(0));
    }

    #[test]
    fn refusals_are_unusable() {
        let rec = Record::from_pairs([("Q108", 4), ("Q110", 777), ("Q74", 777)]);
        assert_eq!(classify(&rec), None);
        let rec = Record::from_pairs([("Q108", 4), ("Q74", 3)]);
        assert_eq!(classify(&rec), Some(0));
    }

    #[test]
    fn imputed_not_applicable_scores_as_no() {
        let rec = Record::from_pairs([("Q110", 2)]);
        assert_eq!(classify(&rec), Some(0));
    }

    #[test]
    fn labels() {
        assert_eq!(value_labels("Q110")[2].1, "Not applicable (no need for healthcare)");
        assert_eq!(value_labels("Q74").last(), Some(&(777, "Refused / X")));
        assert!(value_labels("Q2").is_empty());
    }
}
