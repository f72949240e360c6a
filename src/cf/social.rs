//! Social support, from the Lubben social network scale.
//!
//! Each item asks how many relatives (Q193 to Q195) or friends (Q196 to Q198) fill some role.
//! Answers are coded 1 to 6 and stand for a head count band.
use super::CfLevel;
use crate::Record;

pub const FAMILY: [&str; 3] = ["Q193", "Q194", "Q195"];
pub const FRIENDS: [&str; 3] = ["Q196", "Q197", "Q198"];

pub(super) const QUESTIONS: [&str; 6] = ["Q193", "Q194", "Q195", "Q196", "Q197", "Q198"];

/// Response codes with the head count band they stand for.
pub const LUBBEN_RESPONSES: [(i64, &str); 6] = [
    (1, "0"),
    (2, "1"),
    (3, "2"),
    (4, "3-4"),
    (5, "5-8"),
    (6, "9+"),
];

/// A representative head count for a response code. Only zero versus non-zero matters when
/// scoring.
pub fn lubben_count(code: i64) -> Option<u32> {
    match code {
        1 => Some(0),
        2 => Some(1),
        3 => Some(2),
        4 => Some(3),
        5 => Some(5),
        6 => Some(9),
        _ => None,
    }
}

/// A record is only scored when all six items have a valid answer.
///
/// Support with healthcare (0) means someone to talk to or call on (the first two items of a
/// block) and someone to help (the third) within the family or within friends.
pub fn classify(record: &Record) -> Option<CfLevel> {
    let family = counts(record, &FAMILY)?;
    let friends = counts(record, &FRIENDS)?;

    let supported = |[talk, call, help]: [u32; 3]| talk + call > 0 && help > 0;
    if supported(family) || supported(friends) {
        Some(0)
    } else if family.iter().chain(friends.iter()).sum::<u32>() == 0 {
        Some(2)
    } else {
        Some(1)
    }
}

fn counts(record: &Record, block: &[&str; 3]) -> Option<[u32; 3]> {
    let mut out = [0; 3];
    for (slot, q) in out.iter_mut().zip(block) {
        *slot = lubben_count(record.int(q)?)?;
    }
    Some(out)
}

#[cfg(test)]
mod test {
    use super::{classify, lubben_count, QUESTIONS};
    use crate::Record;

    fn answers(codes: [i64; 6]) -> Record {
        Record::from_pairs(QUESTIONS.iter().copied().zip(codes))
    }

    #[test]
    fn family_support() {
        assert_eq!(classify(&answers([2, 1, 3, 1, 1, 1])), Some(0));
    }

    #[test]
    fn friend_support() {
        assert_eq!(classify(&answers([1, 1, 1, 1, 6, 2])), Some(0));
    }

    #[test]
    fn nobody_at_all() {
        assert_eq!(classify(&answers([1; 6])), Some(2));
    }

    #[test]
    fn companionship_without_help() {
        // people to talk to, but no one to help
        assert_eq!(classify(&answers([3, 2, 1, 2, 1, 1])), Some(1));
        // help but nobody to talk to
        assert_eq!(classify(&answers([1, 1, 4, 1, 1, 1])), Some(1));
    }

    #[test]
    fn one_refusal_unscores_the_record() {
        assert_eq!(classify(&answers([2, 2, 2, 2, 2, 777])), None);
        assert_eq!(classify(&answers([2, 2, 2, 2, 2, 7])), None);
        let partial = Record::from_pairs([("Q193", 2), ("Q194", 2), ("Q195", 2)]);
        assert_eq!(classify(&partial), None);
    }

    #[test]
    fn counts() {
        assert_eq!(lubben_count(1), Some(0));
        assert_eq!(lubben_count(6), Some(9));
        assert_eq!(lubben_count(999), None);
    }
}
