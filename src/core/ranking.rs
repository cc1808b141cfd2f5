use serde::Serialize;

/// Options ordered by final wealth, highest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ranking<K> {
    pub order: Vec<RankedOption<K>>,
    pub best: K,
    pub worst: K,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedOption<K> {
    pub option: K,
    pub final_wealth: f64,
}

impl<K: Copy> Ranking<K> {
    /// Wealth gap between the winner and the runner-up.
    pub fn lead(&self) -> f64 {
        match (self.order.first(), self.order.get(1)) {
            (Some(first), Some(second)) => first.final_wealth - second.final_wealth,
            _ => 0.0,
        }
    }
}

/// Sorts three options by final wealth, descending. Ties keep the order the
/// entries were given in.
pub fn rank<K: Copy>(entries: [(K, f64); 3]) -> Ranking<K> {
    let mut order = entries
        .into_iter()
        .map(|(option, final_wealth)| RankedOption {
            option,
            final_wealth,
        })
        .collect::<Vec<_>>();
    order.sort_by(|a, b| b.final_wealth.total_cmp(&a.final_wealth));

    let best = order[0].option;
    let worst = order[order.len() - 1].option;
    Ranking { order, best, worst }
}
