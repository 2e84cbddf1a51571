use flapga_engine::{Action, Bird, ObstacleId, Observation, World};
use flapga_policy::{Activations, PolicyNetwork};

/// Jump probability above which a policy flaps.
pub const JUMP_THRESHOLD: f64 = 0.5;

/// Where an agent's decisions come from.
///
/// Only [`Pilot::Network`] takes part in training. [`Pilot::Manual`] lets a host
/// feed decisions in from outside, one tick at a time.
#[derive(Debug, Clone)]
pub enum Pilot {
    Network(PolicyNetwork),
    Manual { jump_requested: bool },
}

/// One bird flown by one pilot.
#[derive(Debug, Clone)]
pub struct Agent {
    pilot: Pilot,
    bird: Bird,
    alive: bool,
    score: u32,
    next_pair: ObstacleId,
    last_activations: Option<Activations>,
}

impl Agent {
    #[must_use]
    pub fn new(pilot: Pilot, bird: Bird) -> Self {
        Self {
            pilot,
            bird,
            alive: true,
            score: 0,
            next_pair: ObstacleId::default(),
            last_activations: None,
        }
    }

    /// Creates a network-driven agent at the world's spawn point.
    #[must_use]
    pub fn with_network(network: PolicyNetwork, world: &World) -> Self {
        Self::new(Pilot::Network(network), world.spawn_bird())
    }

    #[must_use]
    pub fn pilot(&self) -> &Pilot {
        &self.pilot
    }

    #[must_use]
    pub fn network(&self) -> Option<&PolicyNetwork> {
        match &self.pilot {
            Pilot::Network(network) => Some(network),
            Pilot::Manual { .. } => None,
        }
    }

    #[must_use]
    pub fn bird(&self) -> &Bird {
        &self.bird
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Number of obstacle pairs crossed.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Activations of the latest forward pass, if the pilot is a network that
    /// has decided at least once.
    #[must_use]
    pub fn last_activations(&self) -> Option<&Activations> {
        self.last_activations.as_ref()
    }

    /// Requests a flap on the next tick of a manual agent. No-op for networks.
    pub fn request_jump(&mut self) {
        if let Pilot::Manual { jump_requested } = &mut self.pilot {
            *jump_requested = true;
        }
    }

    /// Plays one tick against a world that has already advanced.
    ///
    /// In order: collision (death ends the tick), crossing credit, observation,
    /// decision, and movement. Dead agents are left untouched.
    pub fn play_tick(&mut self, world: &World) {
        if !self.alive {
            return;
        }
        if world.collides(&self.bird) {
            self.alive = false;
            return;
        }
        if let Some(id) = world.crossed_pair(&self.bird, self.next_pair) {
            self.score += 1;
            self.next_pair = id.next();
        }
        let observation = world.observe(&self.bird);
        let action = self.decide(&observation);
        self.bird.step(action);
    }

    fn decide(&mut self, observation: &Observation) -> Action {
        match &mut self.pilot {
            Pilot::Network(network) => {
                let activations = network.forward(&observation.to_array());
                self.last_activations = Some(activations);
                if activations.output > JUMP_THRESHOLD {
                    Action::Jump
                } else {
                    Action::Nothing
                }
            }
            Pilot::Manual { jump_requested } => {
                if std::mem::take(jump_requested) {
                    Action::Jump
                } else {
                    Action::Nothing
                }
            }
        }
    }
}
