use flapga_engine::World;
use flapga_policy::PolicyNetwork;
use serde::Serialize;

use crate::Agent;

/// Why training ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
pub enum StopReason {
    #[display("generation limit reached")]
    Generations,
    #[display("score target reached")]
    Score,
    #[display("time budget exhausted")]
    Time,
    #[display("quit requested")]
    Quit,
}

/// Result of advancing an [`Episode`] by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum TickOutcome {
    /// At least one agent is still playing.
    Continue,
    /// Every agent is dead, or the tick limit was reached.
    EpisodeComplete,
    /// The stop predicate fired; the world was not advanced.
    StopRequested(StopReason),
}

/// One generation's play: a shared world and every agent flying through it.
///
/// All agents observe the same world state within a tick, and no agent can
/// change the world, so the order of agents never affects their scores.
#[derive(Debug, Clone)]
pub struct Episode {
    world: World,
    agents: Vec<Agent>,
    tick_limit: Option<u64>,
}

impl Episode {
    #[must_use]
    pub fn new(world: World, agents: Vec<Agent>, tick_limit: Option<u64>) -> Self {
        Self {
            world,
            agents,
            tick_limit,
        }
    }

    /// Creates one network-driven agent per network, in order.
    pub fn with_networks<I>(world: World, networks: I, tick_limit: Option<u64>) -> Self
    where
        I: IntoIterator<Item = PolicyNetwork>,
    {
        let agents = networks
            .into_iter()
            .map(|network| Agent::with_network(network, &world))
            .collect();
        Self::new(world, agents, tick_limit)
    }

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Mutable access for hosts that steer manual agents.
    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.agents.iter().filter(|agent| agent.is_alive()).count()
    }

    /// Highest score among agents that are still alive.
    #[must_use]
    pub fn best_alive_score(&self) -> Option<u32> {
        self.agents
            .iter()
            .filter(|agent| agent.is_alive())
            .map(Agent::score)
            .max()
    }

    /// The alive agent with the highest score; the lowest index wins ties.
    #[must_use]
    pub fn leader(&self) -> Option<(usize, &Agent)> {
        self.agents
            .iter()
            .enumerate()
            .filter(|(_, agent)| agent.is_alive())
            .fold(None, |best: Option<(usize, &Agent)>, (i, agent)| match best {
                Some((_, b)) if b.score() >= agent.score() => best,
                _ => Some((i, agent)),
            })
    }

    /// Final (or current) score of every agent, in agent order.
    #[must_use]
    pub fn scores(&self) -> Vec<u32> {
        self.agents.iter().map(Agent::score).collect()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.alive_count() == 0
            || self
                .tick_limit
                .is_some_and(|limit| self.world.tick_count() >= limit)
    }

    /// Advances the world, then lets every alive agent play the tick.
    ///
    /// `should_stop` is consulted before anything moves; if it returns a
    /// reason, the episode is left as it was.
    pub fn advance_one_tick<F>(&mut self, should_stop: F) -> TickOutcome
    where
        F: FnOnce(&Self) -> Option<StopReason>,
    {
        if self.is_complete() {
            return TickOutcome::EpisodeComplete;
        }
        if let Some(reason) = should_stop(&*self) {
            return TickOutcome::StopRequested(reason);
        }

        self.world.tick();
        for agent in &mut self.agents {
            agent.play_tick(&self.world);
        }

        if self.is_complete() {
            TickOutcome::EpisodeComplete
        } else {
            TickOutcome::Continue
        }
    }

    /// Plays until the episode completes or `should_stop` fires.
    pub fn run<F>(&mut self, mut should_stop: F) -> TickOutcome
    where
        F: FnMut(&Self) -> Option<StopReason>,
    {
        loop {
            match self.advance_one_tick(&mut should_stop) {
                TickOutcome::Continue => {}
                outcome => return outcome,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use flapga_engine::{WorldConfig, WorldSeed};
    use flapga_policy::PolicyNetwork;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;
    use crate::Pilot;

    fn seed() -> WorldSeed {
        WorldSeed::from_bytes([9; 16])
    }

    fn random_networks(count: usize, seed: u64) -> Vec<PolicyNetwork> {
        let mut rng = Pcg64::seed_from_u64(seed);
        (0..count).map(|_| PolicyNetwork::random(&mut rng)).collect()
    }

    /// A world whose gaps are wide enough that a bird hovering in the middle
    /// band never touches an obstacle.
    fn wide_gap_world() -> World {
        let mut config = WorldConfig::default();
        config.obstacles.gap = 200.0;
        World::with_seed(config, seed())
    }

    fn hover(agent: &mut Agent) {
        if agent.bird().rect().bottom() > 220.0 {
            agent.request_jump();
        }
    }

    #[test]
    fn test_same_seed_same_scores() {
        let config = WorldConfig::default();
        let mut a = Episode::with_networks(
            World::with_seed(config.clone(), seed()),
            random_networks(30, 1),
            Some(3000),
        );
        let mut b = Episode::with_networks(
            World::with_seed(config, seed()),
            random_networks(30, 1),
            Some(3000),
        );
        assert!(a.run(|_| None).is_episode_complete());
        assert!(b.run(|_| None).is_episode_complete());
        assert_eq!(a.scores(), b.scores());
        assert_eq!(a.world().tick_count(), b.world().tick_count());
    }

    #[test]
    fn test_agent_order_does_not_change_scores() {
        let networks = random_networks(20, 2);
        let mut forward = Episode::with_networks(
            World::with_seed(WorldConfig::default(), seed()),
            networks.clone(),
            Some(3000),
        );
        let mut reversed = Episode::with_networks(
            World::with_seed(WorldConfig::default(), seed()),
            networks.into_iter().rev(),
            Some(3000),
        );
        forward.run(|_| None);
        reversed.run(|_| None);
        let mut expected = forward.scores();
        expected.reverse();
        assert_eq!(reversed.scores(), expected);
    }

    #[test]
    fn test_episode_ends_when_all_agents_die() {
        let mut episode = Episode::with_networks(
            World::with_seed(WorldConfig::default(), seed()),
            random_networks(10, 3),
            Some(20_000),
        );
        assert!(episode.run(|_| None).is_episode_complete());
        assert_eq!(episode.alive_count(), 0);
        assert!(episode.leader().is_none());
        assert!(episode.advance_one_tick(|_| None).is_episode_complete());
    }

    #[test]
    fn test_stop_predicate_leaves_episode_untouched() {
        let mut episode = Episode::with_networks(
            World::with_seed(WorldConfig::default(), seed()),
            random_networks(5, 4),
            None,
        );
        episode.advance_one_tick(|_| None);
        let ticks = episode.world().tick_count();
        let outcome = episode.advance_one_tick(|_| Some(StopReason::Quit));
        assert_eq!(outcome, TickOutcome::StopRequested(StopReason::Quit));
        assert_eq!(episode.world().tick_count(), ticks);
    }

    #[test]
    fn test_tick_limit_completes_episode() {
        let world = wide_gap_world();
        let bird = world.spawn_bird();
        let mut episode = Episode::new(
            world,
            vec![Agent::new(Pilot::Manual { jump_requested: false }, bird)],
            Some(50),
        );
        let outcome = loop {
            hover(&mut episode.agents_mut()[0]);
            match episode.advance_one_tick(|_| None) {
                TickOutcome::Continue => {}
                outcome => break outcome,
            }
        };
        assert!(outcome.is_episode_complete());
        assert_eq!(episode.world().tick_count(), 50);
        assert_eq!(episode.alive_count(), 1);
    }

    #[test]
    fn test_score_counts_each_pair_once() {
        let world = wide_gap_world();
        let bird = world.spawn_bird();
        let bird_center = bird.rect().center_x();
        let mut episode = Episode::new(
            world,
            vec![Agent::new(Pilot::Manual { jump_requested: false }, bird)],
            None,
        );

        let mut previous = 0;
        let mut crossed = BTreeSet::new();
        for _ in 0..1500 {
            hover(&mut episode.agents_mut()[0]);
            assert!(episode.advance_one_tick(|_| None).is_continue());
            let score = episode.agents()[0].score();
            assert!(score == previous || score == previous + 1);
            previous = score;
            crossed.extend(
                episode
                    .world()
                    .pairs()
                    .filter(|pair| pair.center_x() <= bird_center)
                    .map(|pair| pair.id()),
            );
        }
        assert!(previous >= 10);
        assert_eq!(usize::try_from(previous).unwrap(), crossed.len());
    }

    #[test]
    fn test_leader_prefers_higher_score_then_lower_index() {
        let world = wide_gap_world();
        let agents = (0..3)
            .map(|_| Agent::new(Pilot::Manual { jump_requested: false }, world.spawn_bird()))
            .collect();
        let mut episode = Episode::new(world, agents, None);
        assert_eq!(episode.leader().map(|(i, _)| i), Some(0));
        // let agent 0 fall while the others hover
        for _ in 0..200 {
            for agent in &mut episode.agents_mut()[1..] {
                hover(agent);
            }
            episode.advance_one_tick(|_| None);
        }
        assert!(!episode.agents()[0].is_alive());
        assert_eq!(episode.leader().map(|(i, _)| i), Some(1));
        assert!(episode.best_alive_score().unwrap() > 0);
    }
}
