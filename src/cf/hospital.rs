//! Hospital admissions in the last six months.
use super::CfLevel;
use crate::{value::is_sentinel, Record};

pub(super) const QUESTIONS: [&str; 1] = ["Q96"];

pub fn classify(record: &Record) -> Option<CfLevel> {
    match record.int(QUESTIONS[0])? {
        v if v < 0 || is_sentinel(v) => None,
        0 => Some(0),
        1..=2 => Some(1),
        _ => Some(2),
    }
}

#[cfg(test)]
mod test {
    use super::classify;
    use crate::Record;

    fn admissions(n: i64) -> Option<u8> {
        classify(&Record::from_pairs([("Q96", n)]))
    }

    #[test]
    fn levels() {
        assert_eq!(admissions(0), Some(0));
        assert_eq!(admissions(1), Some(1));
        assert_eq!(admissions(2), Some(1));
        assert_eq!(admissions(3), Some(2));
        assert_eq!(admissions(5), Some(2));
    }

    #[test]
    fn unusable() {
        assert_eq!(admissions(666), None);
        assert_eq!(admissions(777), None);
        assert_eq!(admissions(-1), None);
        assert_eq!(classify(&Record::new().with("Q96", "many")), None);
    }
}
