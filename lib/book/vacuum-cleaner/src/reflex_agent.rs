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

use rand::{Rng, SeedableRng};
use tracing::trace;

use crate::vacuum_world::{Direction, VacuumWorldAction, VacuumWorldLocation};
use crate::{Agent, Environment};

/// A simple reflex agent: suck if the square is dirty, otherwise move left or right with equal
/// probability. Whether the move is possible is the Environment's problem, not the Agent's.
///
/// The location is a mirror of the Environment's agent location, copied after every action.
#[derive(Debug, Clone)]
pub struct ReflexVacuumAgent<R = crate::Rng> {
    location: VacuumWorldLocation,
    rng: R,
}

impl<R: Rng> ReflexVacuumAgent<R> {
    /// Bind a new agent to an environment.
    pub fn new<_Environment: Environment>(environment: &_Environment, rng: R) -> Self {
        Self {
            location: environment.agent_location(),
            rng,
        }
    }

    pub fn location(&self) -> VacuumWorldLocation {
        self.location
    }

    /// Each call draws independently; nothing is remembered between calls.
    pub fn decide(&mut self, dirty: bool) -> VacuumWorldAction {
        if dirty {
            VacuumWorldAction::Suck
        } else if self.rng.gen_bool(0.5) {
            VacuumWorldAction::Move(Direction::Right)
        } else {
            VacuumWorldAction::Move(Direction::Left)
        }
    }
}

impl ReflexVacuumAgent<crate::Rng> {
    pub fn with_seed<_Environment: Environment>(environment: &_Environment, seed: u64) -> Self {
        Self::new(environment, crate::Rng::seed_from_u64(seed))
    }
}

impl<_Environment, R> Agent<_Environment> for ReflexVacuumAgent<R>
where
    _Environment: Environment,
    R: Rng,
{
    fn take_action(&mut self, environment: &mut _Environment) {
        let action = self.decide(environment.sense());
        match action {
            VacuumWorldAction::Suck => environment.clean_current_cell(),
            VacuumWorldAction::Move(direction) => environment.move_agent(direction),
        }
        self.location = environment.agent_location();
        trace!(?action, location = %self.location, "reflex agent acted");
    }
}
