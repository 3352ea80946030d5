use serde::Serialize;

use crate::matcher::MatchResult;
use crate::model::Table;

/// Display labels, in summary order.
pub const SUMMARY_LABELS: [&str; 5] = [
    "Total CIS Records",
    "Total TP Records",
    "CIS = TP (Matched)",
    "CIS <> TP (Mismatch from CIS)",
    "TP <> CIS (Mismatch from TP)",
];

/// Row counts for one run. Field order is the display and chart order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    pub total_left: usize,
    pub total_right: usize,
    pub matched: usize,
    pub unmatched_left: usize,
    pub unmatched_right: usize,
}

impl Summary {
    pub fn from_tables(left: &Table, right: &Table, result: &MatchResult) -> Self {
        Self {
            total_left: left.len(),
            total_right: right.len(),
            matched: result.matched.len(),
            unmatched_left: result.unmatched_left.len(),
            unmatched_right: result.unmatched_right.len(),
        }
    }

    pub fn counts(&self) -> [usize; 5] {
        [
            self.total_left,
            self.total_right,
            self.matched,
            self.unmatched_left,
            self.unmatched_right,
        ]
    }

    /// `(label, count)` pairs in display order.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, usize)> {
        SUMMARY_LABELS.into_iter().zip(self.counts())
    }

    pub fn total(&self) -> usize {
        self.counts().iter().sum()
    }
}

/// Format a count with comma thousands separators: `1234567` -> `1,234,567`.
pub fn format_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(1234567), "1,234,567");
        assert_eq!(format_thousands(100000), "100,000");
    }

    #[test]
    fn entries_follow_field_order() {
        let s = Summary {
            total_left: 3,
            total_right: 2,
            matched: 2,
            unmatched_left: 1,
            unmatched_right: 1,
        };
        let entries: Vec<_> = s.entries().collect();
        assert_eq!(entries[0], ("Total CIS Records", 3));
        assert_eq!(entries[2], ("CIS = TP (Matched)", 2));
        assert_eq!(entries[4], ("TP <> CIS (Mismatch from TP)", 1));
        assert_eq!(s.total(), 9);
    }

    #[test]
    fn serializes_with_field_names() {
        let json = serde_json::to_value(Summary::default()).unwrap();
        assert_eq!(json["total_left"], 0);
        assert_eq!(json["unmatched_right"], 0);
    }
}
