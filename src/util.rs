use std::fmt;

/// Placeholder shown where a percentage has a zero denominator.
pub const NO_DENOMINATOR: &str = "—";

/// `part / whole` as a percentage, or `None` if `whole` is zero.
pub fn pct(part: usize, whole: usize) -> Option<f64> {
    if whole == 0 {
        None
    } else {
        Some(part as f64 / whole as f64 * 100.)
    }
}

/// Format an optional percentage to one decimal place.
pub fn pct_cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}%", v),
        None => NO_DENOMINATOR.to_string(),
    }
}

/// Format a count alongside its percentage, e.g. `12 (4.8%)`.
pub fn count_pct_cell(count: usize, value: Option<f64>) -> String {
    format!("{} ({})", count, pct_cell(value))
}

/// A column header carrying its denominator, e.g. `Male (N=1021)`.
pub fn with_n(label: impl fmt::Display, n: usize) -> String {
    format!("{} (N={})", label, n)
}

pub fn header(header: &str) {
    let len = header.chars().count();
    print!("\n{}\n", header);
    for _ in 0..len {
        print!("=");
    }
    println!("\n")
}

#[cfg(test)]
mod test {
    use super::{count_pct_cell, pct, pct_cell, with_n};

    #[test]
    fn percentages() {
        assert_eq!(pct(1, 4), Some(25.));
        assert_eq!(pct(3, 0), None);
        assert_eq!(pct_cell(Some(33.333)), "33.3%");
        assert_eq!(pct_cell(None), "—");
        assert_eq!(count_pct_cell(2, pct(2, 3)), "2 (66.7%)");
        assert_eq!(with_n("Male", 10), "Male (N=10)");
    }
}
