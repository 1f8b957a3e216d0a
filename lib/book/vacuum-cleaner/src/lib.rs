/*
 * Copyright (C) 2023 Asim Ihsan
 * SPDX-License-Identifier: AGPL-3.0-only
 *
 * This program is free software: you can redistribute it and/or modify it under
 * the terms of the GNU Affero General Public License as published by the Free
 * Software Foundation, version 3.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A
 * PARTICULAR PURPOSE. See the GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License along
 * with this program. If not, see <https://www.gnu.org/licenses/>
 */

// PEAS - Performance, Environment, Action, Sensing
//
// See:
// -  Chapter 2: Intelligent Agents, page 40

use num_traits::Zero;
use tracing::trace;

pub mod evaluation;
pub mod reflex_agent;
pub mod vacuum_world;

use vacuum_world::{Direction, VacuumWorldLocation};

pub type Rng = rand_pcg::Pcg64;

/// An Environment owns the world and where the agent is in it. The Agent senses and acts only
/// through this trait, so the Environment is the single source of truth for the agent's
/// location and the reward.
///
/// Notice that the Environment is not aware of an Agent.
pub trait Environment {
    type Score: num_traits::NumAssign + Copy;

    /// Whether the square under the agent is dirty.
    fn sense(&self) -> bool;
    fn clean_current_cell(&mut self);

    /// Move the agent one square. The Environment decides where the agent ends up if the
    /// requested direction is blocked; it must always end up somewhere valid.
    fn move_agent(&mut self, direction: Direction);
    fn agent_location(&self) -> VacuumWorldLocation;

    /// Advance time by one step and accrue that step's reward.
    fn advance_time_step(&mut self);

    /// Returns the cumulative reward since the Environment was created.
    fn total_reward(&self) -> Self::Score;
    fn time_step(&self) -> u64;
}

/// An Agent acts in a Performance, Environment, Action, Sensing (PEAS) cycle. It senses the
/// Environment and acts on it through the Environment's own operations.
pub trait Agent<_Environment: Environment> {
    fn take_action(&mut self, environment: &mut _Environment);
}

/// A Simulation runs a single Agent in multiple Performance, Environment, Action, Sensing (PEAS)
/// cycles. Each cycle the Agent acts once and then the Environment advances time by one step.
///
/// The Simulation is aware of both the Environment and the single Agent.
pub struct Simulation<_Environment, _Agent>
where
    _Environment: Environment,
    _Agent: Agent<_Environment>,
{
    environment: _Environment,
    agent: _Agent,
    time_steps: u64,
    rewards: Vec<_Environment::Score>,
}

impl<_Environment, _Agent> Simulation<_Environment, _Agent>
where
    _Environment: Environment,
    _Agent: Agent<_Environment>,
{
    pub fn new(environment: _Environment, agent: _Agent, time_steps: u64) -> Self {
        Self {
            environment,
            agent,
            time_steps,
            rewards: Vec::new(),
        }
    }

    /// Run one cycle and return the change in total reward it caused.
    pub fn step(&mut self) -> _Environment::Score {
        let before = self.environment.total_reward();
        self.agent.take_action(&mut self.environment);
        self.environment.advance_time_step();
        let reward = self.environment.total_reward() - before;
        self.rewards.push(reward);
        reward
    }

    pub fn run(&mut self) {
        for _ in 0..self.time_steps {
            self.step();
        }
        trace!(
            time_step = self.environment.time_step(),
            "simulation finished"
        );
    }

    pub fn score(&self) -> <_Environment as Environment>::Score {
        self.environment.total_reward()
    }

    /// Reward change of each cycle run so far, in order.
    pub fn rewards(&self) -> &[_Environment::Score] {
        &self.rewards
    }

    pub fn reward_sum(&self) -> _Environment::Score {
        self.rewards
            .iter()
            .fold(_Environment::Score::zero(), |acc, &reward| acc + reward)
    }

    pub fn environment(&self) -> &_Environment {
        &self.environment
    }

    pub fn agent(&self) -> &_Agent {
        &self.agent
    }
}
