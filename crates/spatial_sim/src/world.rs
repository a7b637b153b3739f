//! Simulated entity store and the systems that consume spatial queries.
//!
//! Stands in for the ECS world: it owns the entities and hands the spatial
//! index a snapshot of those that currently have a position. Render culling
//! and AI detection then use the index as a broad phase and apply their own
//! exact rules to the candidates.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use spatial_partition::{Bounds, EntityId, Position, SpatialObject, SpatialPartitionSystem};
use std::collections::HashMap;
use std::time::Duration;

/// Share of entities spawned without a position (spawn still in progress)
const PENDING_SPAWN_RATIO: f64 = 0.05;
/// Chance per tick that a pending entity finishes spawning
const SPAWN_COMPLETE_CHANCE: f64 = 0.1;
/// How far past the world edge entities may wander, as a fraction of its size
const OUT_OF_BOUNDS_SLACK: f64 = 0.02;
/// Top speed in world units per second
const MAX_SPEED: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Team {
    Red,
    Blue,
}

/// A simulated entity.
#[derive(Debug, Clone)]
pub struct Agent {
    pub id: EntityId,
    pub team: Team,
    /// `None` while the entity is still spawning
    pub position: Option<Position>,
    pub velocity: (f64, f64),
}

/// Render viewport, culled against the spatial index every tick.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
}

impl Viewport {
    /// Region to query for a camera centred on `focus`, margin included.
    pub fn culling_bounds(&self, focus: Position) -> Bounds {
        Bounds::from_center(
            focus.x,
            focus.y,
            self.width + 2.0 * self.margin,
            self.height + 2.0 * self.margin,
        )
    }
}

/// Owner of every simulated entity.
#[derive(Debug)]
pub struct SimWorld {
    agents: Vec<Agent>,
    teams: HashMap<EntityId, Team>,
    bounds: Bounds,
    rng: StdRng,
}

impl SimWorld {
    /// Spawns `count` entities over `bounds`.
    ///
    /// A few start without a position and a few slightly outside the world,
    /// so both the skipped and the dropped paths of the index get exercised.
    pub fn spawn(count: usize, bounds: Bounds, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let roam = roaming_bounds(&bounds);

        let agents: Vec<Agent> = (0..count)
            .map(|i| {
                let team = if i % 2 == 0 { Team::Red } else { Team::Blue };
                let position = if rng.gen_bool(PENDING_SPAWN_RATIO) {
                    None
                } else {
                    Some(random_position(&mut rng, &roam))
                };
                Agent {
                    id: EntityId::new(),
                    team,
                    position,
                    velocity: random_velocity(&mut rng),
                }
            })
            .collect();

        let teams = agents.iter().map(|agent| (agent.id, agent.team)).collect();

        Self {
            agents,
            teams,
            bounds,
            rng,
        }
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn team_of(&self, id: EntityId) -> Option<Team> {
        self.teams.get(&id).copied()
    }

    /// Moves every entity by its velocity, bouncing off the roaming edge.
    pub fn step(&mut self, delta_time: Duration) {
        let dt = delta_time.as_secs_f64();
        let roam = roaming_bounds(&self.bounds);

        for agent in &mut self.agents {
            let Some(position) = agent.position.as_mut() else {
                if self.rng.gen_bool(SPAWN_COMPLETE_CHANCE) {
                    agent.position = Some(random_position(&mut self.rng, &roam));
                }
                continue;
            };

            position.x += agent.velocity.0 * dt;
            position.y += agent.velocity.1 * dt;
            bounce(&mut position.x, &mut agent.velocity.0, roam.x, roam.right());
            bounce(&mut position.y, &mut agent.velocity.1, roam.y, roam.bottom());

            // Occasional change of heading
            if self.rng.gen_bool(0.01) {
                agent.velocity = random_velocity(&mut self.rng);
            }
        }
    }

    /// Entities that currently have a position, as handed to the index.
    pub fn snapshot(&self) -> impl Iterator<Item = SpatialObject<EntityId>> + '_ {
        self.agents
            .iter()
            .filter_map(|agent| agent.position.map(|position| SpatialObject::new(agent.id, position)))
    }

    /// Camera focus: the first positioned entity, or the world center.
    pub fn camera_focus(&self) -> Position {
        self.agents
            .iter()
            .find_map(|agent| agent.position)
            .unwrap_or_else(|| self.bounds.center())
    }

    /// Counts, over all positioned entities, the enemies within `radius`.
    ///
    /// Scans run in parallel; they only read the index, which is never
    /// rebuilt while this borrow is alive.
    pub fn detect_enemies(&self, system: &SpatialPartitionSystem<EntityId>, radius: f64) -> usize {
        self.agents
            .par_iter()
            .filter_map(|agent| agent.position.map(|position| (agent, position)))
            .map(|(agent, position)| {
                system
                    .query_radius(position.x, position.y, radius)
                    .into_iter()
                    .filter(|candidate| {
                        candidate.id != agent.id
                            && self.team_of(candidate.id).is_some_and(|team| team != agent.team)
                    })
                    .count()
            })
            .sum()
    }
}

/// World bounds grown by the wandering slack on every side.
fn roaming_bounds(bounds: &Bounds) -> Bounds {
    let slack_x = bounds.width * OUT_OF_BOUNDS_SLACK;
    let slack_y = bounds.height * OUT_OF_BOUNDS_SLACK;
    Bounds::new(
        bounds.x - slack_x,
        bounds.y - slack_y,
        bounds.width + 2.0 * slack_x,
        bounds.height + 2.0 * slack_y,
    )
}

/// Reflects the velocity and pulls the value back inside `[min, max)` when it
/// has left that range.
fn bounce(value: &mut f64, velocity: &mut f64, min: f64, max: f64) {
    if *value < min || *value >= max {
        *velocity = -*velocity;
        *value = value.clamp(min, max - (max - min) * 1e-9);
    }
}

fn random_position(rng: &mut StdRng, bounds: &Bounds) -> Position {
    Position::new(
        rng.gen_range(bounds.x..bounds.right()),
        rng.gen_range(bounds.y..bounds.bottom()),
    )
}

fn random_velocity(rng: &mut StdRng) -> (f64, f64) {
    (
        rng.gen_range(-MAX_SPEED..=MAX_SPEED),
        rng.gen_range(-MAX_SPEED..=MAX_SPEED),
    )
}
