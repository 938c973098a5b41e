/// A metric reported in a track's scoreboard "Final results" block.
///
/// The `Display`/`FromStr` forms are the literal labels Rain prints.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter,
)]
pub enum Metric {
    #[strum(serialize = "Offered load (ops/sec)")]
    OfferedLoadOps,
    #[strum(serialize = "Effective load (ops/sec)")]
    EffectiveLoadOps,
    #[strum(serialize = "Little's Law Estimate (ops/sec)")]
    LittlesEstimateOps,
    #[strum(serialize = "Effective load (requests/sec)")]
    EffectiveLoadReqs,
    #[strum(serialize = "Operations successfully completed")]
    OperationsSuccessful,
    #[strum(serialize = "Operations failed")]
    OperationsFailed,
    #[strum(serialize = "Average operation response time (s)")]
    AverageOpResponseTime,
    #[strum(serialize = "Average number of users")]
    AverageUsers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum NumericKind {
    Float,
    Count,
}

impl Metric {
    #[must_use]
    pub fn kind(self) -> NumericKind {
        match self {
            Self::OperationsSuccessful | Self::OperationsFailed => NumericKind::Count,
            _ => NumericKind::Float,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn labels_round_trip_through_from_str() {
        for m in Metric::iter() {
            let label = m.to_string();
            let parsed = Metric::from_str(&label).unwrap_or_else(|e| panic!("{label}: {e}"));
            assert_eq!(parsed, m);
        }
    }

    #[test]
    fn only_operation_counts_are_integers() {
        let counts: Vec<_> = Metric::iter()
            .filter(|m| m.kind() == NumericKind::Count)
            .collect();
        assert_eq!(
            counts,
            vec![Metric::OperationsSuccessful, Metric::OperationsFailed]
        );
        assert_eq!(Metric::iter().count(), 8);
    }
}
