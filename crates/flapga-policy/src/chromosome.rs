use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::{CodecError, Dense, HIDDEN1_SIZE, HIDDEN2_SIZE, INPUT_SIZE, OUTPUT_SIZE, PolicyNetwork};

/// Number of genes in a chromosome: every weight and bias of the policy.
pub const GENE_COUNT: usize = Dense::<INPUT_SIZE, HIDDEN1_SIZE>::PARAM_COUNT
    + Dense::<HIDDEN1_SIZE, HIDDEN2_SIZE>::PARAM_COUNT
    + Dense::<HIDDEN2_SIZE, OUTPUT_SIZE>::PARAM_COUNT;

/// Flattens every parameter of `network` in gene order.
#[must_use]
pub fn encode(network: &PolicyNetwork) -> Vec<f64> {
    network.tensors().concat()
}

/// Overwrites every parameter of `network` from `genes`, in gene order.
///
/// The network is left untouched if the length is wrong.
pub fn decode(genes: &[f64], network: &mut PolicyNetwork) -> Result<(), CodecError> {
    if genes.len() != GENE_COUNT {
        return Err(CodecError::LengthMismatch {
            expected: GENE_COUNT,
            actual: genes.len(),
        });
    }
    let mut rest = genes;
    for tensor in network.tensors_mut() {
        let (head, tail) = rest.split_at(tensor.len());
        tensor.copy_from_slice(head);
        rest = tail;
    }
    debug_assert!(rest.is_empty());
    Ok(())
}

/// Flat gene vector of exactly [`GENE_COUNT`] values.
///
/// Serialized as a plain JSON array of numbers; deserializing an array of any
/// other length fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Chromosome {
    genes: Vec<f64>,
}

impl Chromosome {
    pub fn from_genes(genes: Vec<f64>) -> Result<Self, CodecError> {
        if genes.len() != GENE_COUNT {
            return Err(CodecError::LengthMismatch {
                expected: GENE_COUNT,
                actual: genes.len(),
            });
        }
        Ok(Self { genes })
    }

    /// Builds a chromosome by calling `f` with every gene index.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnMut(usize) -> f64,
    {
        Self {
            genes: (0..GENE_COUNT).map(f).collect(),
        }
    }

    #[must_use]
    pub fn from_network(network: &PolicyNetwork) -> Self {
        Self {
            genes: encode(network),
        }
    }

    #[must_use]
    pub fn genes(&self) -> &[f64] {
        &self.genes
    }

    /// Mutable view of the genes; the length cannot change through it.
    pub fn genes_mut(&mut self) -> &mut [f64] {
        &mut self.genes
    }

    /// # Panics
    ///
    /// Never: every constructor checks that there are exactly [`GENE_COUNT`] genes.
    #[must_use]
    pub fn to_network(&self) -> PolicyNetwork {
        let mut network = PolicyNetwork::default();
        decode(&self.genes, &mut network).expect("chromosome length is an invariant");
        network
    }
}

impl Index<usize> for Chromosome {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.genes[index]
    }
}

impl TryFrom<Vec<f64>> for Chromosome {
    type Error = CodecError;

    fn try_from(genes: Vec<f64>) -> Result<Self, Self::Error> {
        Self::from_genes(genes)
    }
}

impl From<Chromosome> for Vec<f64> {
    fn from(chromosome: Chromosome) -> Self {
        chromosome.genes
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[expect(clippy::cast_precision_loss)]
    fn indexed() -> Vec<f64> {
        (0..GENE_COUNT).map(|i| i as f64).collect()
    }

    #[test]
    fn test_gene_count() {
        assert_eq!(GENE_COUNT, 61);
    }

    #[test]
    fn test_decode_then_encode_is_identity() {
        let genes = indexed();
        let mut network = PolicyNetwork::default();
        decode(&genes, &mut network).unwrap();
        assert_eq!(encode(&network), genes);
    }

    #[test]
    fn test_encode_then_decode_is_identity() {
        let network = PolicyNetwork::random(&mut Pcg32::seed_from_u64(3));
        let mut decoded = PolicyNetwork::default();
        decode(&encode(&network), &mut decoded).unwrap();
        assert_eq!(decoded, network);
    }

    #[test]
    fn test_gene_order_matches_layout() {
        let mut network = PolicyNetwork::default();
        decode(&indexed(), &mut network).unwrap();
        let weights = network.weights();
        assert_eq!(weights.w1[0], [0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(weights.w1[5][4], 29.0);
        assert_eq!(weights.b1, [30.0, 31.0, 32.0, 33.0, 34.0, 35.0]);
        assert_eq!(weights.w2[0][0], 36.0);
        assert_eq!(weights.w2[2][5], 53.0);
        assert_eq!(weights.b2, [54.0, 55.0, 56.0]);
        assert_eq!(weights.w3, [vec![57.0, 58.0, 59.0]]);
        assert_eq!(weights.b3, [60.0]);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let mut network = PolicyNetwork::default();
        for len in [0, 60, 62] {
            let err = decode(&vec![1.0; len], &mut network).unwrap_err();
            assert_eq!(
                err,
                CodecError::LengthMismatch {
                    expected: 61,
                    actual: len,
                }
            );
        }
        assert_eq!(network, PolicyNetwork::default());
    }

    #[test]
    fn test_chromosome_rejects_wrong_length() {
        assert!(Chromosome::from_genes(vec![0.0; 61]).is_ok());
        assert!(matches!(
            Chromosome::from_genes(vec![0.0; 10]),
            Err(CodecError::LengthMismatch { actual: 10, .. })
        ));
        let parsed: Result<Chromosome, _> = serde_json::from_str("[1.0, 2.0]");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_chromosome_network_roundtrip() {
        let chromosome = Chromosome::from_fn(|i| f64::from(u32::try_from(i).unwrap()) * 0.01);
        let network = chromosome.to_network();
        assert_eq!(Chromosome::from_network(&network), chromosome);
        assert_eq!(chromosome[60], 60.0 * 0.01);
    }

    #[test]
    fn test_deserialized_and_mutated_chromosomes_decode() {
        let json = serde_json::to_string(&vec![0.5; GENE_COUNT]).unwrap();
        let mut chromosome: Chromosome = serde_json::from_str(&json).unwrap();
        chromosome.genes_mut()[GENE_COUNT - 1] = -2.0;
        let network = chromosome.to_network();
        assert_eq!(network.fc3().bias(), &[-2.0]);
    }
}
