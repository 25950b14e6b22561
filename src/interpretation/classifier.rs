use std::fmt;

/// Readings strictly above this are positive.
pub const POSITIVE_MFI_CUTOFF: i64 = 2000;
/// Readings from here up to the positive cutoff (inclusive) are borderline.
pub const BORDERLINE_MFI_FLOOR: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BeadClassification {
    Positive,
    Borderline,
    Negative,
}

impl BeadClassification {
    pub fn label(&self) -> &'static str {
        match self {
            BeadClassification::Positive => "Positive",
            BeadClassification::Borderline => "Borderline",
            BeadClassification::Negative => "Negative",
        }
    }

    pub fn rank(&self) -> u8 {
        match self {
            BeadClassification::Positive => 8,
            BeadClassification::Borderline => 4,
            BeadClassification::Negative => 1,
        }
    }
}

impl fmt::Display for BeadClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn classify(mfi: i64) -> BeadClassification {
    match mfi {
        m if m > POSITIVE_MFI_CUTOFF => BeadClassification::Positive,
        m if m >= BORDERLINE_MFI_FLOOR => BeadClassification::Borderline,
        _ => BeadClassification::Negative,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries() {
        let cases = vec![
            (i64::MIN, BeadClassification::Negative),
            (-5, BeadClassification::Negative),
            (0, BeadClassification::Negative),
            (999, BeadClassification::Negative),
            (1000, BeadClassification::Borderline),
            (1500, BeadClassification::Borderline),
            (2000, BeadClassification::Borderline),
            (2001, BeadClassification::Positive),
            (i64::MAX, BeadClassification::Positive),
        ];

        for (mfi, expected) in cases {
            assert_eq!(classify(mfi), expected, "mfi {}", mfi);
        }
    }

    #[test]
    fn test_labels_and_ranks() {
        assert_eq!(classify(2001).label(), "Positive");
        assert_eq!(classify(2001).rank(), 8);
        assert_eq!(classify(1000).label(), "Borderline");
        assert_eq!(classify(1000).rank(), 4);
        assert_eq!(classify(999).to_string(), "Negative");
        assert_eq!(classify(999).rank(), 1);
    }
}
