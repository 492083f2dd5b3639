use crate::error::MalformedInputError;

/// Per-unit values each player assigns to each resource.
///
/// Rows are players and columns are resources. Construction validates that the
/// matrix is non-empty, rectangular, finite and non-negative, so every
/// `ValuationMatrix` describes a solvable allocation problem.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>"))]
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationMatrix {
    rows: Vec<Vec<f64>>,
}

impl ValuationMatrix {
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self, MalformedInputError> {
        let first = rows.first().ok_or(MalformedInputError::NoPlayers)?;
        let num_resources = first.len();
        if num_resources == 0 {
            return Err(MalformedInputError::NoResources);
        }

        for (player, row) in rows.iter().enumerate() {
            if row.len() != num_resources {
                return Err(MalformedInputError::RaggedRow {
                    player,
                    expected: num_resources,
                    found: row.len(),
                });
            }
            for (resource, &value) in row.iter().enumerate() {
                if !value.is_finite() {
                    return Err(MalformedInputError::NonFiniteValuation { player, resource });
                }
                if value < 0.0 {
                    return Err(MalformedInputError::NegativeValuation { player, resource, value });
                }
            }
        }

        Ok(Self { rows })
    }

    pub fn num_players(&self) -> usize {
        self.rows.len()
    }

    pub fn num_resources(&self) -> usize {
        self.rows[0].len()
    }

    /// Player `player`'s value for all of resource `resource`
    pub fn value(&self, player: usize, resource: usize) -> f64 {
        self.rows[player][resource]
    }

    pub fn player(&self, player: usize) -> &[f64] {
        &self.rows[player]
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }
}

impl TryFrom<Vec<Vec<f64>>> for ValuationMatrix {
    type Error = MalformedInputError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::new(rows)
    }
}

impl From<ValuationMatrix> for Vec<Vec<f64>> {
    fn from(matrix: ValuationMatrix) -> Self {
        matrix.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_matrix() {
        let matrix = ValuationMatrix::new(vec![vec![1.0, 19.0, 80.0], vec![20.0, 1.0, 79.0]]).unwrap();
        assert_eq!(matrix.num_players(), 2);
        assert_eq!(matrix.num_resources(), 3);
        assert_eq!(matrix.value(1, 0), 20.0);
        assert_eq!(matrix.player(0), &[1.0, 19.0, 80.0]);
    }

    #[test]
    fn test_zero_row_is_valid() {
        assert!(ValuationMatrix::new(vec![vec![0.0, 0.0], vec![1.0, 2.0]]).is_ok());
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(ValuationMatrix::new(vec![]), Err(MalformedInputError::NoPlayers));
        assert_eq!(ValuationMatrix::new(vec![vec![]]), Err(MalformedInputError::NoResources));
    }

    #[test]
    fn test_ragged_rows() {
        let result = ValuationMatrix::new(vec![vec![1.0, 2.0], vec![3.0]]);
        assert_eq!(
            result,
            Err(MalformedInputError::RaggedRow {
                player: 1,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_negative_and_non_finite_values() {
        assert_eq!(
            ValuationMatrix::new(vec![vec![1.0, -0.5]]),
            Err(MalformedInputError::NegativeValuation {
                player: 0,
                resource: 1,
                value: -0.5
            })
        );
        assert_eq!(
            ValuationMatrix::new(vec![vec![1.0], vec![f64::INFINITY]]),
            Err(MalformedInputError::NonFiniteValuation { player: 1, resource: 0 })
        );
        assert_eq!(
            ValuationMatrix::new(vec![vec![f64::NAN]]),
            Err(MalformedInputError::NonFiniteValuation { player: 0, resource: 0 })
        );
    }
}
