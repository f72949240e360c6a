//! Number of prescription medications taken regularly.
use super::CfLevel;
use crate::{value::is_sentinel, Record};

pub(super) const QUESTIONS: [&str; 1] = ["Q132"];

pub fn classify(record: &Record) -> Option<CfLevel> {
    match record.int(QUESTIONS[0])? {
        v if v < 0 || is_sentinel(v) => None,
        0..=4 => Some(0),
        5..=8 => Some(1),
        _ => Some(2),
    }
}

#[cfg(test)]
mod test {
    use super::classify;
    use crate::Record;

    fn medications(n: i64) -> Option<u8> {
        classify(&Record::from_pairs([("Q132", n)]))
    }

    #[test]
    fn levels() {
        assert_eq!(medications(0), Some(0));
        assert_eq!(medications(4), Some(0));
        assert_eq!(medications(5), Some(1));
        assert_eq!(medications(8), Some(1));
        assert_eq!(medications(9), Some(2));
        assert_eq!(medications(20), Some(2));
    }

    #[test]
    fn refused_and_not_applicable() {
        assert_eq!(medications(777), None);
        assert_eq!(medications(999), None);
        assert_eq!(classify(&Record::new()), None);
    }
}
