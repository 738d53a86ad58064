use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Cost reported by a fitness metric (program size, gas, ...). Lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cost(pub u64);

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Cost {
    fn from(value: u64) -> Self {
        Cost(value)
    }
}

/// Outcome of evaluating one chromosome.
///
/// `Failed` orders after every `Cost`, so a chromosome whose evaluation failed
/// behaves as if it had infinite cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Fitness {
    Cost(Cost),
    Failed,
}

impl Fitness {
    pub fn cost(&self) -> Option<Cost> {
        match self {
            Fitness::Cost(cost) => Some(*cost),
            Fitness::Failed => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Fitness::Failed)
    }
}

impl Ord for Fitness {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Fitness::Cost(a), Fitness::Cost(b)) => a.cmp(b),
            (Fitness::Cost(_), Fitness::Failed) => Ordering::Less,
            (Fitness::Failed, Fitness::Cost(_)) => Ordering::Greater,
            (Fitness::Failed, Fitness::Failed) => Ordering::Equal,
        }
    }
}

impl PartialOrd for Fitness {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Fitness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fitness::Cost(cost) => write!(f, "{}", cost),
            Fitness::Failed => write!(f, "failed"),
        }
    }
}
