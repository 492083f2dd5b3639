use crate::model::AllocationModel;
use crate::valuation::ValuationMatrix;

/// An optimal egalitarian split of every resource among the players
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone)]
pub struct Allocation {
    /// Fraction of each resource given to each player, indexed `[resource][player]`
    fractions: Vec<Vec<f64>>,
    /// Utility guaranteed to every player
    floor: f64,
    /// Utility each player actually receives
    utilities: Vec<f64>,
}

impl Allocation {
    pub(crate) fn from_solution(model: &AllocationModel, valuations: &ValuationMatrix, values: &[f64]) -> Self {
        let fractions: Vec<Vec<f64>> = (0..model.num_resources)
            .map(|resource| {
                (0..model.num_players)
                    .map(|player| values[model.variable_index(resource, player)])
                    .collect()
            })
            .collect();

        let utilities = (0..model.num_players)
            .map(|player| {
                valuations
                    .player(player)
                    .iter()
                    .enumerate()
                    .map(|(resource, value)| value * fractions[resource][player])
                    .sum()
            })
            .collect();

        Self {
            fractions,
            floor: values[model.floor_index()] * model.scale,
            utilities,
        }
    }

    pub fn num_players(&self) -> usize {
        self.utilities.len()
    }

    pub fn num_resources(&self) -> usize {
        self.fractions.len()
    }

    /// Fraction of `resource` given to `player`, in `[0, 1]`
    pub fn fraction(&self, player: usize, resource: usize) -> f64 {
        self.fractions[resource][player]
    }

    /// Fractions of every resource given to `player`
    pub fn player_fractions(&self, player: usize) -> Vec<f64> {
        self.fractions.iter().map(|shares| shares[player]).collect()
    }

    /// How `resource` is divided among the players
    pub fn resource_shares(&self, resource: usize) -> &[f64] {
        &self.fractions[resource]
    }

    /// The optimal value of the floor variable
    pub fn floor(&self) -> f64 {
        self.floor
    }

    pub fn utility(&self, player: usize) -> f64 {
        self.utilities[player]
    }

    pub fn utilities(&self) -> &[f64] {
        &self.utilities
    }

    /// Smallest utility any player receives
    pub fn min_utility(&self) -> f64 {
        self.utilities.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Share of `resource` given to `player` as a percentage, rounded to 2 decimals
    pub fn percentage(&self, player: usize, resource: usize) -> f64 {
        round_percentage(self.fraction(player, resource))
    }

    /// e.g. `player 0 receives  0.0% of resource 0 and 100.0% of resource 1`
    pub fn player_summary(&self, player: usize) -> String {
        let shares: Vec<String> = self
            .player_fractions(player)
            .into_iter()
            .enumerate()
            .map(|(resource, fraction)| format!("{}% of resource {}", format_percentage(fraction), resource))
            .collect();
        format!("player {} receives  {}", player, shares.join(" and "))
    }

    /// One summary line per player
    pub fn report(&self) -> String {
        (0..self.num_players())
            .map(|player| self.player_summary(player))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Convert a fraction to a percentage rounded to 2 decimals and clamped to `[0, 100]`
pub fn round_percentage(fraction: f64) -> f64 {
    let rounded = (fraction * 10_000.0).round() / 100.0;
    // adding 0.0 turns -0.0 into 0.0
    rounded.clamp(0.0, 100.0) + 0.0
}

/// Render a fraction the way reports show it: `100.0`, `50.31`, `0.0`
pub fn format_percentage(fraction: f64) -> String {
    format!("{:?}", round_percentage(fraction))
}
