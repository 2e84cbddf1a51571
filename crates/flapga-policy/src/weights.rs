use serde::{Deserialize, Serialize};

/// Parameters of a [`PolicyNetwork`](crate::PolicyNetwork) as named tensors.
///
/// Weight matrices are `output × input`: `w1` has 6 rows of 5 values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkWeights {
    pub w1: Vec<Vec<f64>>,
    pub b1: Vec<f64>,
    pub w2: Vec<Vec<f64>>,
    pub b2: Vec<f64>,
    pub w3: Vec<Vec<f64>>,
    pub b3: Vec<f64>,
}

impl NetworkWeights {
    /// Largest absolute parameter value, used to scale visualizations.
    #[must_use]
    pub fn max_abs(&self) -> f64 {
        [&self.w1, &self.w2, &self.w3]
            .into_iter()
            .flatten()
            .flatten()
            .chain([&self.b1, &self.b2, &self.b3].into_iter().flatten())
            .fold(0.0, |acc: f64, v| acc.max(v.abs()))
    }
}

#[cfg(test)]
mod tests {
    use crate::PolicyNetwork;

    use super::*;

    #[test]
    fn test_json_layout() {
        let weights = PolicyNetwork::default().weights();
        let json = serde_json::to_value(&weights).unwrap();
        assert_eq!(json["w1"].as_array().unwrap().len(), 6);
        assert_eq!(json["w1"][0].as_array().unwrap().len(), 5);
        assert_eq!(json["b3"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_max_abs() {
        let mut weights = PolicyNetwork::default().weights();
        assert_eq!(weights.max_abs(), 0.0);
        weights.w2[1][3] = -2.5;
        weights.b1[0] = 1.0;
        assert_eq!(weights.max_abs(), 2.5);
    }
}
