use serde::{Deserialize, Serialize};

use crate::models::ProductId;

/// Advisory strength bucket for an association rule. Informational metadata
/// only; it never gates whether a rule is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStrength {
    VeryStrong,
    Strong,
    Medium,
    Weak,
    VeryWeak,
}

impl RuleStrength {
    pub fn classify(confidence: f64, lift: f64) -> Self {
        if confidence >= 0.8 && lift >= 2.0 {
            RuleStrength::VeryStrong
        } else if confidence >= 0.6 && lift >= 1.5 {
            RuleStrength::Strong
        } else if confidence >= 0.4 && lift >= 1.2 {
            RuleStrength::Medium
        } else if confidence >= 0.2 && lift >= 1.0 {
            RuleStrength::Weak
        } else {
            RuleStrength::VeryWeak
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleStrength::VeryStrong => "very_strong",
            RuleStrength::Strong => "strong",
            RuleStrength::Medium => "medium",
            RuleStrength::Weak => "weak",
            RuleStrength::VeryWeak => "very_weak",
        }
    }
}

impl std::str::FromStr for RuleStrength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "very_strong" => Ok(RuleStrength::VeryStrong),
            "strong" => Ok(RuleStrength::Strong),
            "medium" => Ok(RuleStrength::Medium),
            "weak" => Ok(RuleStrength::Weak),
            "very_weak" => Ok(RuleStrength::VeryWeak),
            other => Err(format!("unknown rule strength: {}", other)),
        }
    }
}

/// Directed rule `antecedent -> consequent` derived from a frequent itemset.
/// Antecedent and consequent are disjoint sorted id vectors whose union was
/// frequent in the mined period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationRule {
    pub antecedent: Vec<ProductId>,
    pub consequent: Vec<ProductId>,
    /// Support of the union itemset.
    pub support: f64,
    /// Baskets containing the union itemset.
    pub support_count: usize,
    /// support(union) / support(antecedent), in [0, 1].
    pub confidence: f64,
    /// confidence / support(consequent), always > 0.
    pub lift: f64,
    pub strength: RuleStrength,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strength_buckets_match_thresholds() {
        assert_eq!(RuleStrength::classify(0.85, 2.4), RuleStrength::VeryStrong);
        assert_eq!(RuleStrength::classify(0.65, 1.6), RuleStrength::Strong);
        assert_eq!(RuleStrength::classify(0.45, 1.3), RuleStrength::Medium);
        assert_eq!(RuleStrength::classify(0.25, 1.05), RuleStrength::Weak);
        assert_eq!(RuleStrength::classify(0.75, 0.9), RuleStrength::VeryWeak);
        assert_eq!(RuleStrength::classify(0.1, 3.0), RuleStrength::VeryWeak);
    }

    #[test]
    fn strength_round_trips_through_str() {
        for s in [
            RuleStrength::VeryStrong,
            RuleStrength::Strong,
            RuleStrength::Medium,
            RuleStrength::Weak,
            RuleStrength::VeryWeak,
        ] {
            assert_eq!(s.as_str().parse::<RuleStrength>().unwrap(), s);
        }
    }
}
