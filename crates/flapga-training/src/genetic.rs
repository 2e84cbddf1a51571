//! Genetic operators over policy chromosomes.
//!
//! # Algorithm Overview
//!
//! After every generation has been scored, the next population is built as:
//!
//! 1. **Elitism** - The best-ever chromosome (not merely this generation's best)
//!    is copied unmutated into slot 0
//! 2. **Roulette Selection** - Two parents are drawn with probability proportional
//!    to their score
//! 3. **Uniform Crossover** - Each gene comes from one parent or the other by a
//!    fair coin flip
//! 4. **Gaussian Mutation** - Each gene receives `N(0, σ²)` noise with a fixed
//!    per-gene probability
//!
//! Steps 2-4 repeat until the population is full again, so its size never changes.
//!
//! # Key Components
//!
//! - [`Individual`] - A chromosome and the score it earned
//! - [`Population`] - The ordered individuals of one generation
//! - [`FitnessWheel`] - Fitness-proportionate parent selection
//! - [`Mutation`] - Per-gene Gaussian perturbation
//! - [`PopulationEvolver`] - Combines the operators into one generation step
//!
//! # Zero Fitness
//!
//! When every individual scored 0, score shares are undefined. The wheel then
//! selects uniformly, which keeps breeding (and mutation) going instead of
//! dividing by zero.

use flapga_policy::{Chromosome, PolicyNetwork};
use rand::Rng;
use rand_distr::{Distribution as _, Normal};

use crate::{ConfigError, ScoreStats};

/// A chromosome and its score from the latest episode.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    chromosome: Chromosome,
    score: u32,
}

impl Individual {
    #[must_use]
    pub fn new(chromosome: Chromosome) -> Self {
        Self {
            chromosome,
            score: 0,
        }
    }

    /// Creates an individual with the default random initializer of the network.
    pub fn random<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::new(Chromosome::from_network(&PolicyNetwork::random(rng)))
    }

    #[must_use]
    pub fn chromosome(&self) -> &Chromosome {
        &self.chromosome
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }
}

/// The individuals of one generation, in a stable order.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    /// Creates `size` independently initialized individuals.
    pub fn random<R>(size: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self {
            individuals: (0..size).map(|_| Individual::random(rng)).collect(),
        }
    }

    /// Seeds a population around a known-good chromosome.
    ///
    /// The first individual is `seed` verbatim; the rest are copies of it that
    /// went through one mutation pass each.
    pub fn seeded_from<R>(seed: &Chromosome, size: usize, mutation: &Mutation, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let individuals = (0..size)
            .map(|i| {
                let mut chromosome = seed.clone();
                if i > 0 {
                    mutation.apply(&mut chromosome, rng);
                }
                Individual::new(chromosome)
            })
            .collect();
        Self { individuals }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// Decodes every chromosome into a fresh network, in order.
    pub fn networks(&self) -> impl Iterator<Item = PolicyNetwork> + '_ {
        self.individuals
            .iter()
            .map(|individual| individual.chromosome.to_network())
    }

    /// Records the scores of an episode played by [`Self::networks`].
    ///
    /// # Panics
    ///
    /// Panics if `scores` does not have one entry per individual.
    pub fn assign_scores(&mut self, scores: &[u32]) {
        assert_eq!(scores.len(), self.individuals.len());
        for (individual, score) in self.individuals.iter_mut().zip(scores) {
            individual.score = *score;
        }
    }

    /// The highest-scoring individual and its index; the lowest index wins ties.
    #[must_use]
    pub fn best(&self) -> Option<(usize, &Individual)> {
        self.individuals
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, &Individual)>, (i, ind)| match best {
                Some((_, b)) if b.score >= ind.score => best,
                _ => Some((i, ind)),
            })
    }

    #[must_use]
    pub fn score_stats(&self) -> Option<ScoreStats> {
        ScoreStats::new(self.individuals.iter().map(Individual::score))
    }
}

/// Fitness-proportionate (roulette-wheel) selection.
///
/// Individual `i` is picked with probability `score_i / Σ scores`. If every
/// score is 0 the wheel picks uniformly instead.
#[derive(Debug, Clone)]
pub struct FitnessWheel {
    len: usize,
    /// Cumulative score shares; `None` when the total score is 0.
    cumulative: Option<Vec<f64>>,
    last_positive: usize,
}

impl FitnessWheel {
    /// # Panics
    ///
    /// Panics if `scores` is empty.
    #[must_use]
    pub fn new(scores: &[u32]) -> Self {
        assert!(!scores.is_empty(), "cannot select from an empty population");
        let total = scores.iter().copied().map(f64::from).sum::<f64>();
        let last_positive = scores.iter().rposition(|s| *s > 0).unwrap_or(0);
        let cumulative = (total > 0.0).then(|| {
            scores
                .iter()
                .scan(0.0, |acc, s| {
                    *acc += f64::from(*s) / total;
                    Some(*acc)
                })
                .collect()
        });
        Self {
            len: scores.len(),
            cumulative,
            last_positive,
        }
    }

    /// Returns the index of the selected individual.
    ///
    /// Draws `u` uniformly from `[0, 1)` and picks the first individual whose
    /// cumulative share exceeds it.
    pub fn spin<R>(&self, rng: &mut R) -> usize
    where
        R: Rng + ?Sized,
    {
        match &self.cumulative {
            Some(cumulative) => {
                let u = rng.random::<f64>();
                // rounding can leave the last share slightly below 1
                cumulative
                    .iter()
                    .position(|c| *c > u)
                    .unwrap_or(self.last_positive)
            }
            None => rng.random_range(0..self.len),
        }
    }
}

/// Builds a child whose every gene comes from `a` or `b` by a fair coin flip.
pub fn uniform_crossover<R>(a: &Chromosome, b: &Chromosome, rng: &mut R) -> Chromosome
where
    R: Rng + ?Sized,
{
    Chromosome::from_fn(|i| if rng.random::<bool>() { a[i] } else { b[i] })
}

/// Per-gene Gaussian perturbation.
#[derive(Debug, Clone, Copy)]
pub struct Mutation {
    probability: f64,
    noise: Normal<f64>,
}

impl Mutation {
    pub fn new(probability: f64, std_dev: f64) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(ConfigError::ProbabilityOutOfRange { value: probability });
        }
        let noise = Normal::new(0.0, std_dev)
            .map_err(|_| ConfigError::InvalidStandardDeviation { value: std_dev })?;
        Ok(Self { probability, noise })
    }

    #[must_use]
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Adds `N(0, σ²)` noise to each gene with the configured probability.
    pub fn apply<R>(&self, chromosome: &mut Chromosome, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        for gene in chromosome.genes_mut() {
            if rng.random_bool(self.probability) {
                *gene += self.noise.sample(rng);
            }
        }
    }
}

/// Produces the next generation from a scored one.
#[derive(Debug, Clone, Copy)]
pub struct PopulationEvolver {
    pub elitism: bool,
    pub mutation: Mutation,
}

impl PopulationEvolver {
    /// Breeds a population of the same size as `population`.
    ///
    /// With elitism enabled and an `elite` given, slot 0 holds an exact copy of
    /// it. Every other slot is a mutated uniform crossover of two roulette-drawn
    /// parents; a parent may be drawn twice.
    #[must_use]
    pub fn evolve<R>(
        &self,
        population: &Population,
        elite: Option<&Chromosome>,
        rng: &mut R,
    ) -> Population
    where
        R: Rng + ?Sized,
    {
        let size = population.len();
        let mut next = Vec::with_capacity(size);

        if self.elitism
            && let Some(elite) = elite
            && size > 0
        {
            next.push(Individual::new(elite.clone()));
        }

        if next.len() < size {
            let scores = population
                .individuals
                .iter()
                .map(Individual::score)
                .collect::<Vec<_>>();
            let wheel = FitnessWheel::new(&scores);
            while next.len() < size {
                let a = &population.individuals[wheel.spin(rng)];
                let b = &population.individuals[wheel.spin(rng)];
                let mut child = uniform_crossover(&a.chromosome, &b.chromosome, rng);
                self.mutation.apply(&mut child, rng);
                next.push(Individual::new(child));
            }
        }

        Population { individuals: next }
    }
}

#[cfg(test)]
mod tests {
    use flapga_policy::GENE_COUNT;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    fn rng() -> Pcg64 {
        Pcg64::seed_from_u64(0xF1A9)
    }

    fn scored(scores: &[u32], rng: &mut Pcg64) -> Population {
        let mut population = Population::random(scores.len(), rng);
        population.assign_scores(scores);
        population
    }

    #[test]
    fn test_wheel_frequency_matches_score_share() {
        let scores = [1, 0, 3, 6];
        let wheel = FitnessWheel::new(&scores);
        let mut rng = rng();
        let trials: u32 = 100_000;
        let mut counts = [0_u32; 4];
        for _ in 0..trials {
            counts[wheel.spin(&mut rng)] += 1;
        }
        assert_eq!(counts[1], 0);
        for (count, expected) in counts.iter().zip([0.1, 0.0, 0.3, 0.6]) {
            let freq = f64::from(*count) / f64::from(trials);
            assert!((freq - expected).abs() < 0.01, "{freq} vs {expected}");
        }
    }

    #[test]
    fn test_wheel_zero_sum_is_uniform() {
        let wheel = FitnessWheel::new(&[0; 5]);
        let mut rng = rng();
        let mut counts = [0_u32; 5];
        for _ in 0..50_000 {
            counts[wheel.spin(&mut rng)] += 1;
        }
        assert!(counts.iter().all(|c| (9_000..11_000).contains(c)), "{counts:?}");
    }

    #[test]
    fn test_wheel_single_positive_always_wins() {
        let wheel = FitnessWheel::new(&[0, 0, 5, 0]);
        let mut rng = rng();
        assert!((0..1000).all(|_| wheel.spin(&mut rng) == 2));
    }

    #[test]
    fn test_crossover_takes_each_gene_from_a_parent() {
        let mut rng = rng();
        let a = Chromosome::from_fn(|_| 1.0);
        let b = Chromosome::from_fn(|_| -1.0);
        let child = uniform_crossover(&a, &b, &mut rng);
        assert!(child.genes().iter().all(|g| *g == 1.0 || *g == -1.0));
        let from_a = child.genes().iter().filter(|g| **g == 1.0).count();
        assert!(from_a > 0 && from_a < GENE_COUNT);
    }

    #[test]
    fn test_zero_probability_never_mutates() {
        let mut rng = rng();
        let mutation = Mutation::new(0.0, 0.3).unwrap();
        let original = Individual::random(&mut rng).chromosome;
        let mut chromosome = original.clone();
        for _ in 0..100 {
            mutation.apply(&mut chromosome, &mut rng);
        }
        assert_eq!(chromosome, original);
    }

    #[test]
    fn test_certain_mutation_perturbs_every_gene() {
        let mut rng = rng();
        let mutation = Mutation::new(1.0, 0.3).unwrap();
        let original = Chromosome::from_fn(|_| 0.0);
        let mut chromosome = original.clone();
        mutation.apply(&mut chromosome, &mut rng);
        assert!(chromosome.genes().iter().all(|g| *g != 0.0));
    }

    #[test]
    fn test_invalid_mutation_parameters() {
        assert!(matches!(
            Mutation::new(-0.1, 0.3),
            Err(ConfigError::ProbabilityOutOfRange { .. })
        ));
        assert!(matches!(
            Mutation::new(0.1, f64::NAN),
            Err(ConfigError::InvalidStandardDeviation { .. })
        ));
    }

    #[test]
    fn test_evolve_keeps_size_and_elite() {
        let mut rng = rng();
        let population = scored(&[0, 4, 1, 2, 0, 7, 3], &mut rng);
        let (_, best) = population.best().unwrap();
        let elite = best.chromosome().clone();
        let evolver = PopulationEvolver {
            elitism: true,
            mutation: Mutation::new(0.5, 0.3).unwrap(),
        };
        let next = evolver.evolve(&population, Some(&elite), &mut rng);
        assert_eq!(next.len(), population.len());
        assert_eq!(next.individuals()[0].chromosome(), &elite);
        assert!(next.individuals().iter().all(|ind| ind.score() == 0));
    }

    #[test]
    fn test_evolve_without_elitism_ignores_elite() {
        let mut rng = rng();
        let population = scored(&[1, 1, 1], &mut rng);
        let elite = Chromosome::from_fn(|_| 123.0);
        let evolver = PopulationEvolver {
            elitism: false,
            mutation: Mutation::new(0.0, 0.3).unwrap(),
        };
        let next = evolver.evolve(&population, Some(&elite), &mut rng);
        assert_eq!(next.len(), 3);
        assert!(next.individuals().iter().all(|ind| ind.chromosome() != &elite));
    }

    #[test]
    fn test_children_without_mutation_only_inherit_parent_genes() {
        let mut rng = rng();
        let population = scored(&[2, 5, 0, 1], &mut rng);
        let evolver = PopulationEvolver {
            elitism: false,
            mutation: Mutation::new(0.0, 0.3).unwrap(),
        };
        let next = evolver.evolve(&population, None, &mut rng);
        for child in next.individuals() {
            for (i, gene) in child.chromosome().genes().iter().enumerate() {
                assert!(
                    population
                        .individuals()
                        .iter()
                        .filter(|parent| parent.score() > 0)
                        .any(|parent| parent.chromosome()[i] == *gene)
                );
            }
        }
    }

    #[test]
    fn test_evolve_is_deterministic() {
        let population = scored(&[3, 1, 4, 1, 5], &mut rng());
        let evolver = PopulationEvolver {
            elitism: true,
            mutation: Mutation::new(0.05, 0.3).unwrap(),
        };
        let elite = population.best().unwrap().1.chromosome().clone();
        let a = evolver.evolve(&population, Some(&elite), &mut Pcg64::seed_from_u64(1));
        let b = evolver.evolve(&population, Some(&elite), &mut Pcg64::seed_from_u64(1));
        assert_eq!(a, b);
    }

    #[test]
    fn test_seeded_population() {
        let mut rng = rng();
        let seed = Individual::random(&mut rng).chromosome;
        let mutation = Mutation::new(1.0, 0.3).unwrap();
        let population = Population::seeded_from(&seed, 10, &mutation, &mut rng);
        assert_eq!(population.len(), 10);
        assert_eq!(population.individuals()[0].chromosome(), &seed);
        assert!(
            population.individuals()[1..]
                .iter()
                .all(|ind| ind.chromosome() != &seed)
        );
    }

    #[test]
    fn test_best_prefers_lowest_index_on_ties() {
        let population = scored(&[1, 5, 2, 5], &mut rng());
        assert_eq!(population.best().map(|(i, _)| i), Some(1));
        let stats = population.score_stats().unwrap();
        assert_eq!(stats.max, 5);
        assert_eq!(stats.min, 1);
    }
}
