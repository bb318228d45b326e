// SPDX-License-Identifier: MPL-2.0
//! Natural ordering of frame filenames.
//!
//! Digit runs are compared as integers, position by position, so that
//! `frame_000002` sorts before `frame_000010`. When every compared run is
//! equal the names fall back to a case-insensitive lexicographic compare.

use std::cmp::Ordering;

/// Compares two filenames by their embedded numbers first.
///
/// # Example
///
/// ```
/// use scanlens::domain::frame::natural_cmp;
/// use std::cmp::Ordering;
///
/// assert_eq!(natural_cmp("scan_2.dcm", "scan_10.dcm"), Ordering::Less);
/// assert_eq!(natural_cmp("IMG9", "img9"), Ordering::Equal);
/// ```
#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    for (run_a, run_b) in digit_runs(a).zip(digit_runs(b)) {
        match cmp_digit_runs(run_a, run_b) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    cmp_case_insensitive(a, b)
}

/// Iterates over the maximal ASCII digit runs of `name`, left to right.
fn digit_runs(name: &str) -> impl Iterator<Item = &str> {
    name.split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
}

/// Compares two digit runs by integer value without parsing.
///
/// Leading zeros are ignored; a longer significant run is the larger number,
/// so runs of any length compare correctly.
fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn cmp_case_insensitive(a: &str, b: &str) -> Ordering {
    let lower_a = a.chars().flat_map(char::to_lowercase);
    let lower_b = b.chars().flat_map(char::to_lowercase);
    lower_a.cmp(lower_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(names: &[&str]) -> Vec<String> {
        let mut names: Vec<String> = names.iter().map(|s| (*s).to_string()).collect();
        names.sort_by(|a, b| natural_cmp(a, b));
        names
    }

    #[test]
    fn numeric_runs_sort_by_value() {
        assert_eq!(
            sorted(&["scan_2.dcm", "scan_10.dcm", "scan_1.dcm"]),
            vec!["scan_1.dcm", "scan_2.dcm", "scan_10.dcm"]
        );
    }

    #[test]
    fn zero_padded_runs_compare_as_integers() {
        assert_eq!(natural_cmp("frame_000002", "frame_000010"), Ordering::Less);
        // Same value: the name itself decides.
        assert_eq!(natural_cmp("frame_10", "frame_000010"), Ordering::Greater);
    }

    #[test]
    fn later_runs_break_ties() {
        assert_eq!(
            sorted(&["s2_i10", "s2_i9", "s1_i50"]),
            vec!["s1_i50", "s2_i9", "s2_i10"]
        );
    }

    #[test]
    fn equal_runs_fall_back_to_case_insensitive_name() {
        assert_eq!(natural_cmp("b_1.png", "A_1.png"), Ordering::Greater);
        assert_eq!(natural_cmp("Scan.dcm", "scan.dcm"), Ordering::Equal);
    }

    #[test]
    fn names_without_digits_sort_alphabetically() {
        assert_eq!(
            sorted(&["Gamma", "alpha", "beta"]),
            vec!["alpha", "beta", "Gamma"]
        );
    }

    #[test]
    fn very_long_runs_do_not_overflow() {
        let small = "x_99999999999999999999999999999999999999";
        let large = "x_100000000000000000000000000000000000000";
        assert_eq!(natural_cmp(small, large), Ordering::Less);
    }
}
