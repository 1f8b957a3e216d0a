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

//! Run the reflex agent over every initial dirt configuration and average the scores.
//!
//! See Chapter 2, Exercise 12.

use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::reflex_agent::ReflexVacuumAgent;
use crate::vacuum_world::{
    VacuumWorldConfig, VacuumWorldEnvironment, VacuumWorldError, VacuumWorldLocation,
};
use crate::Simulation;

/// 2^12 runs is already a lot for an interactive binary.
pub const MAX_EVALUATION_SQUARES: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub dirt: Vec<VacuumWorldLocation>,
    pub total_reward: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub runs: Vec<RunResult>,
    pub average_reward: f64,
}

/// Build a world, place the dirt, bind a reflex agent and run it. The grid and the agent share one
/// seeded random stream so a run is reproducible from its seed alone.
pub fn simulate_reflex_agent(
    config: &VacuumWorldConfig,
    dirt: &[VacuumWorldLocation],
    time_steps: u64,
    seed: u64,
) -> Result<Simulation<VacuumWorldEnvironment, ReflexVacuumAgent>, VacuumWorldError> {
    let mut rng = crate::Rng::seed_from_u64(seed);
    let mut environment = VacuumWorldEnvironment::new(config, &mut rng)?;
    environment.place_dirt(dirt)?;
    let agent = ReflexVacuumAgent::new(&environment, rng);
    let mut simulation = Simulation::new(environment, agent, time_steps);
    simulation.run();
    Ok(simulation)
}

/// Every subset of squares, including the empty one. Bit `i` of the subset index selects the
/// `i`th square in row-major order.
pub fn all_dirt_configurations(
    rows: usize,
    cols: usize,
) -> Result<Vec<Vec<VacuumWorldLocation>>, VacuumWorldError> {
    // An overflowing product is reported as usize::MAX squares.
    let cells = rows.saturating_mul(cols);
    if cells > MAX_EVALUATION_SQUARES {
        return Err(VacuumWorldError::TooManyConfigurations {
            cells,
            max: MAX_EVALUATION_SQUARES,
        });
    }

    let locations: Vec<VacuumWorldLocation> = (0..rows)
        .flat_map(|row| (0..cols).map(move |col| VacuumWorldLocation::new(row, col)))
        .collect();
    let configurations = (0..1usize << cells)
        .map(|mask| {
            locations
                .iter()
                .enumerate()
                .filter(|&(i, _)| mask & (1usize << i) != 0)
                .map(|(_, &location)| location)
                .collect()
        })
        .collect();
    Ok(configurations)
}

/// Run every dirt configuration for `time_steps`. Random dirt is switched off so that only the
/// placed dirt is on the grid; run `i` is seeded with `seed + i`.
pub fn evaluate(
    config: &VacuumWorldConfig,
    time_steps: u64,
    seed: u64,
) -> Result<Evaluation, VacuumWorldError> {
    let config = VacuumWorldConfig {
        dirt_probability: 0.0,
        ..config.clone()
    };
    config.validate()?;

    let mut runs = Vec::new();
    for (i, dirt) in all_dirt_configurations(config.rows, config.cols)?
        .into_iter()
        .enumerate()
    {
        let simulation =
            simulate_reflex_agent(&config, &dirt, time_steps, seed.wrapping_add(i as u64))?;
        let total_reward = simulation.score();
        debug!(run = i, dirty_squares = dirt.len(), total_reward, "evaluated configuration");
        runs.push(RunResult { dirt, total_reward });
    }

    let average_reward = runs.iter().map(|r| r.total_reward).sum::<f64>() / runs.len() as f64;
    Ok(Evaluation {
        runs,
        average_reward,
    })
}
