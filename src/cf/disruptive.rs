//! Disruptive behaviour, from the eleven-item cognitive screen (1 pass, 2 fail).
use super::CfLevel;
use crate::Record;

pub const COGNITION_ITEMS: [&str; 11] = [
    "Q16", "Q17", "Q18", "Q19", "Q20", "Q21", "Q22", "Q23", "Q24", "Q25", "Q26",
];

const PASS: i64 = 1;
const FAIL: i64 = 2;

/// Number of items passed: 9 or more is 0, 7 or 8 is 1, fewer is 2.
pub fn classify(record: &Record) -> Option<CfLevel> {
    let scored = COGNITION_ITEMS
        .iter()
        .filter_map(|q| match record.int(q) {
            Some(PASS) => Some(1),
            Some(FAIL) => Some(0),
            _ => None,
        })
        .collect::<Vec<u32>>();
    if scored.is_empty() {
        return None;
    }
    let passed = scored.iter().sum::<u32>();
    Some(if passed >= 9 {
        0
    } else if passed >= 7 {
        1
    } else {
        2
    })
}

#[cfg(test)]
mod test {
    use super::{classify, COGNITION_ITEMS};
    use crate::Record;

    fn passing(n: usize) -> Record {
        COGNITION_ITEMS
            .iter()
            .enumerate()
            .fold(Record::new(), |rec, (idx, q)| {
                rec.with(q, if idx < n { 1 } else { 2 })
            })
    }

    #[test]
    fn thresholds() {
        assert_eq!(classify(&passing(11)), Some(0));
        assert_eq!(classify(&passing(9)), Some(0));
        assert_eq!(classify(&passing(8)), Some(1));
        assert_eq!(classify(&passing(7)), Some(1));
        assert_eq!(classify(&passing(6)), Some(2));
        assert_eq!(classify(&passing(0)), Some(2));
    }

    #[test]
    fn refused_items_are_excluded() {
        let rec = Record::from_pairs([("Q16", 777), ("Q17", 999), ("Q18", 1)]);
        assert_eq!(classify(&rec), Some(2));
    }
}
