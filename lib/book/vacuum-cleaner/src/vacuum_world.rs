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
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::Environment;

/// Errors raised while configuring a vacuum world. Nothing in the per-tick loop can fail.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VacuumWorldError {
    /// Dirt probability is outside `[0, 1]`.
    #[error("dirt probability must be between 0 and 1, got {0}")]
    InvalidDirtProbability(f64),

    /// Movement penalty is negative or not finite.
    #[error("movement penalty must be finite and non-negative, got {0}")]
    InvalidMovementPenalty(f64),

    /// The grid needs at least one row and one column.
    #[error("grid must have at least one row and one column, got {rows}x{cols}")]
    InvalidGridShape { rows: usize, cols: usize },

    /// A location lies outside the grid.
    #[error("location {location} is out of bounds for a {rows}x{cols} grid")]
    OutOfBounds {
        location: VacuumWorldLocation,
        rows: usize,
        cols: usize,
    },

    /// Too many squares to enumerate every dirt configuration.
    #[error("cannot enumerate dirt configurations of {cells} squares, at most {max} are supported")]
    TooManyConfigurations { cells: usize, max: usize },
}

#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct VacuumWorldLocation {
    pub row: usize,
    pub col: usize,
}

impl VacuumWorldLocation {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for VacuumWorldLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SquareState {
    Clean,
    Dirty,
}

/// Movement is along the column axis only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing column.
    Left,

    /// Toward increasing column.
    Right,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VacuumWorldAction {
    Suck,
    Move(Direction),
}

/// Parameters used to construct a [`VacuumWorldEnvironment`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacuumWorldConfig {
    pub rows: usize,
    pub cols: usize,

    /// Probability that each square starts dirty.
    pub dirt_probability: f64,

    /// Subtracted from the total reward on every move.
    pub movement_penalty: f64,
}

impl VacuumWorldConfig {
    pub fn new(rows: usize, cols: usize, dirt_probability: f64, movement_penalty: f64) -> Self {
        Self {
            rows,
            cols,
            dirt_probability,
            movement_penalty,
        }
    }

    pub fn validate(&self) -> Result<(), VacuumWorldError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(VacuumWorldError::InvalidGridShape {
                rows: self.rows,
                cols: self.cols,
            });
        }
        // The square count must fit in an allocation.
        match self.rows.checked_mul(self.cols) {
            Some(cells) if cells <= isize::MAX as usize => {}
            _ => {
                return Err(VacuumWorldError::InvalidGridShape {
                    rows: self.rows,
                    cols: self.cols,
                })
            }
        }
        validate_dirt_probability(self.dirt_probability)?;
        if !self.movement_penalty.is_finite() || self.movement_penalty < 0.0 {
            return Err(VacuumWorldError::InvalidMovementPenalty(
                self.movement_penalty,
            ));
        }
        Ok(())
    }
}

impl Default for VacuumWorldConfig {
    fn default() -> Self {
        let width = 2;
        let height = 1;
        Self::new(height, width, 0.5, 0.0)
    }
}

fn validate_dirt_probability(dirt_probability: f64) -> Result<(), VacuumWorldError> {
    // NaN fails the range check too.
    if (0.0..=1.0).contains(&dirt_probability) {
        Ok(())
    } else {
        Err(VacuumWorldError::InvalidDirtProbability(dirt_probability))
    }
}

/// Row-major grid of squares. Shapes are validated by `VacuumWorldConfig::validate` first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Grid {
    squares: Vec<SquareState>,
    rows: usize,
    cols: usize,
}

impl Grid {
    /// Create an all-clean grid.
    fn new(rows: usize, cols: usize) -> Self {
        Self {
            squares: vec![SquareState::Clean; rows * cols],
            rows,
            cols,
        }
    }

    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn contains(&self, location: VacuumWorldLocation) -> bool {
        location.row < self.rows && location.col < self.cols
    }

    /// Get a square, or None if the location is outside the grid.
    fn get(&self, location: VacuumWorldLocation) -> Option<SquareState> {
        if self.contains(location) {
            Some(self.squares[location.row * self.cols + location.col])
        } else {
            None
        }
    }

    fn set(&mut self, location: VacuumWorldLocation, state: SquareState) {
        debug_assert!(self.contains(location));
        self.squares[location.row * self.cols + location.col] = state;
    }

    fn count(&self, state: SquareState) -> usize {
        self.squares.iter().filter(|&&s| s == state).count()
    }

    fn populate<R: Rng>(&mut self, dirt_probability: f64, rng: &mut R) {
        for square in self.squares.iter_mut() {
            if rng.gen_bool(dirt_probability) {
                *square = SquareState::Dirty;
            }
        }
    }
}

/// The environment owns the grid, where the agent is, and the running reward. It is the only
/// thing that mutates them after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct VacuumWorldEnvironment {
    grid: Grid,
    agent_location: VacuumWorldLocation,
    dirt_probability: f64,
    movement_penalty: f64,
    total_reward: f64,
    time_step: u64,
}

impl VacuumWorldEnvironment {
    /// Create a world where each square is independently dirty with the configured probability.
    /// The agent starts at (0, 0).
    pub fn new<R: Rng>(config: &VacuumWorldConfig, rng: &mut R) -> Result<Self, VacuumWorldError> {
        config.validate()?;
        let mut grid = Grid::new(config.rows, config.cols);
        grid.populate(config.dirt_probability, rng);
        debug!(
            rows = config.rows,
            cols = config.cols,
            dirt_probability = config.dirt_probability,
            movement_penalty = config.movement_penalty,
            dirty_squares = grid.count(SquareState::Dirty),
            "created vacuum world"
        );
        Ok(Self {
            grid,
            agent_location: VacuumWorldLocation::new(0, 0),
            dirt_probability: config.dirt_probability,
            movement_penalty: config.movement_penalty,
            total_reward: 0.0,
            time_step: 0,
        })
    }

    pub fn with_seed(config: &VacuumWorldConfig, seed: u64) -> Result<Self, VacuumWorldError> {
        Self::new(config, &mut crate::Rng::seed_from_u64(seed))
    }

    /// Mark every location dirty. Either all locations are applied or, if any is out of bounds,
    /// none are.
    pub fn place_dirt(
        &mut self,
        locations: &[VacuumWorldLocation],
    ) -> Result<(), VacuumWorldError> {
        if let Some(&location) = locations.iter().find(|&&l| !self.grid.contains(l)) {
            return Err(VacuumWorldError::OutOfBounds {
                location,
                rows: self.grid.rows(),
                cols: self.grid.cols(),
            });
        }
        for &location in locations {
            self.grid.set(location, SquareState::Dirty);
        }
        debug!(placed = locations.len(), "placed dirt");
        Ok(())
    }

    pub fn dirt_probability(&self) -> f64 {
        self.dirt_probability
    }

    /// Only affects the stored probability; squares already populated are left alone.
    pub fn set_dirt_probability(&mut self, dirt_probability: f64) -> Result<(), VacuumWorldError> {
        validate_dirt_probability(dirt_probability)?;
        self.dirt_probability = dirt_probability;
        Ok(())
    }

    pub fn movement_penalty(&self) -> f64 {
        self.movement_penalty
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    pub fn square_state(&self, location: VacuumWorldLocation) -> Option<SquareState> {
        self.grid.get(location)
    }

    pub fn clean_square_count(&self) -> usize {
        self.grid.count(SquareState::Clean)
    }

    pub fn dirty_square_count(&self) -> usize {
        self.grid.count(SquareState::Dirty)
    }

    fn neighbour_col(&self, direction: Direction) -> Option<usize> {
        let col = self.agent_location.col;
        match direction {
            Direction::Left => col.checked_sub(1),
            Direction::Right => Some(col + 1).filter(|&c| c < self.grid.cols()),
        }
    }

    /// Requested direction first, then the opposite one. A single-column grid leaves the agent
    /// where it is.
    fn resolve_move(&self, direction: Direction) -> usize {
        self.neighbour_col(direction)
            .or_else(|| self.neighbour_col(direction.opposite()))
            .unwrap_or(self.agent_location.col)
    }
}

impl Environment for VacuumWorldEnvironment {
    type Score = f64;

    fn sense(&self) -> bool {
        self.grid.get(self.agent_location) == Some(SquareState::Dirty)
    }

    fn clean_current_cell(&mut self) {
        self.grid.set(self.agent_location, SquareState::Clean);
    }

    fn move_agent(&mut self, direction: Direction) {
        let col = self.resolve_move(direction);
        trace!(
            ?direction,
            from = self.agent_location.col,
            to = col,
            "moving agent"
        );
        self.agent_location.col = col;
        self.total_reward -= self.movement_penalty;
    }

    fn agent_location(&self) -> VacuumWorldLocation {
        self.agent_location
    }

    fn advance_time_step(&mut self) {
        let clean = self.clean_square_count();
        self.total_reward += clean as f64;
        self.time_step += 1;
        trace!(
            time_step = self.time_step,
            clean,
            total_reward = self.total_reward,
            "advanced time step"
        );
    }

    fn total_reward(&self) -> Self::Score {
        self.total_reward
    }

    fn time_step(&self) -> u64 {
        self.time_step
    }
}

// `.` is clean, `*` is dirty, and the agent is `a` on a clean square or `A` on a dirty one.
// Row and column numbers start at 0.
impl std::fmt::Display for VacuumWorldEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rows = self.grid.rows();
        let cols = self.grid.cols();

        write!(f, " ")?;
        for col in 0..cols {
            write!(f, " {}", col)?;
        }
        writeln!(f)?;

        for row in 0..rows {
            write!(f, "{}", row)?;
            for col in 0..cols {
                let location = VacuumWorldLocation::new(row, col);
                let dirty = self.grid.get(location) == Some(SquareState::Dirty);
                let c = match (location == self.agent_location, dirty) {
                    (true, true) => 'A',
                    (true, false) => 'a',
                    (false, true) => '*',
                    (false, false) => '.',
                };
                write!(f, " {}", c)?;
            }
            writeln!(f)?;
        }
        write!(
            f,
            "time step: {}, total reward: {}",
            self.time_step, self.total_reward
        )
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn clean_world(rows: usize, cols: usize, movement_penalty: f64) -> VacuumWorldEnvironment {
        let config = VacuumWorldConfig::new(rows, cols, 0.0, movement_penalty);
        VacuumWorldEnvironment::with_seed(&config, 42).expect("valid config")
    }

    #[test]
    fn test_vacuum_world_starts_at_origin_with_zero_reward() {
        let env = VacuumWorldEnvironment::with_seed(&VacuumWorldConfig::default(), 42).unwrap();
        assert_eq!(env.agent_location(), VacuumWorldLocation::new(0, 0));
        assert_eq!(env.total_reward(), 0.0);
        assert_eq!(env.time_step(), 0);
    }

    #[test]
    fn test_dirt_probability_one_makes_every_square_dirty() {
        let config = VacuumWorldConfig::new(3, 4, 1.0, 0.0);
        let env = VacuumWorldEnvironment::with_seed(&config, 7).unwrap();
        assert_eq!(env.dirty_square_count(), 12);
        assert!(env.sense());
    }

    #[test]
    fn test_dirt_probability_zero_makes_every_square_clean() {
        let env = clean_world(3, 4, 0.0);
        assert_eq!(env.clean_square_count(), 12);
        assert!(!env.sense());
    }

    #[test]
    fn test_invalid_configs_are_rejected() {
        let mut rng = crate::Rng::seed_from_u64(42);
        assert_eq!(
            VacuumWorldEnvironment::new(&VacuumWorldConfig::new(0, 2, 0.5, 0.0), &mut rng),
            Err(VacuumWorldError::InvalidGridShape { rows: 0, cols: 2 })
        );
        assert_eq!(
            VacuumWorldEnvironment::new(&VacuumWorldConfig::new(1, 2, 1.5, 0.0), &mut rng),
            Err(VacuumWorldError::InvalidDirtProbability(1.5))
        );
        assert_eq!(
            VacuumWorldEnvironment::new(&VacuumWorldConfig::new(1, 2, 0.5, -1.0), &mut rng),
            Err(VacuumWorldError::InvalidMovementPenalty(-1.0))
        );
        assert!(matches!(
            VacuumWorldEnvironment::new(&VacuumWorldConfig::new(1, 2, f64::NAN, 0.0), &mut rng),
            Err(VacuumWorldError::InvalidDirtProbability(_))
        ));
    }

    #[test]
    fn test_grid_shape_too_large_to_allocate_is_rejected() {
        for (rows, cols) in [(usize::MAX, 2), (2, usize::MAX), (usize::MAX / 2 + 1, 1)] {
            assert_eq!(
                VacuumWorldConfig::new(rows, cols, 0.0, 0.0).validate(),
                Err(VacuumWorldError::InvalidGridShape { rows, cols })
            );
        }
        assert_eq!(
            VacuumWorldEnvironment::with_seed(&VacuumWorldConfig::new(usize::MAX, 2, 0.0, 0.0), 1),
            Err(VacuumWorldError::InvalidGridShape { rows: usize::MAX, cols: 2 })
        );
    }

    #[test]
    fn test_set_dirt_probability_rejects_without_clamping() {
        let mut env = clean_world(1, 2, 0.0);
        env.set_dirt_probability(0.25).unwrap();
        assert_eq!(env.dirt_probability(), 0.25);

        assert_eq!(
            env.set_dirt_probability(-0.1),
            Err(VacuumWorldError::InvalidDirtProbability(-0.1))
        );
        assert_eq!(
            env.set_dirt_probability(1.1),
            Err(VacuumWorldError::InvalidDirtProbability(1.1))
        );
        assert!(matches!(
            env.set_dirt_probability(f64::NAN),
            Err(VacuumWorldError::InvalidDirtProbability(p)) if p.is_nan()
        ));
        assert_eq!(env.dirt_probability(), 0.25);
    }

    #[test]
    fn test_place_dirt_marks_squares_dirty() {
        let mut env = clean_world(2, 3, 0.0);
        env.place_dirt(&[VacuumWorldLocation::new(0, 0), VacuumWorldLocation::new(1, 2)])
            .unwrap();
        assert_eq!(
            env.square_state(VacuumWorldLocation::new(0, 0)),
            Some(SquareState::Dirty)
        );
        assert_eq!(
            env.square_state(VacuumWorldLocation::new(1, 2)),
            Some(SquareState::Dirty)
        );
        assert_eq!(env.dirty_square_count(), 2);
    }

    #[test]
    fn test_place_dirt_out_of_bounds_applies_nothing() {
        let mut env = clean_world(1, 2, 0.0);
        let result =
            env.place_dirt(&[VacuumWorldLocation::new(0, 1), VacuumWorldLocation::new(1, 0)]);
        assert_eq!(
            result,
            Err(VacuumWorldError::OutOfBounds {
                location: VacuumWorldLocation::new(1, 0),
                rows: 1,
                cols: 2,
            })
        );
        assert_eq!(env.dirty_square_count(), 0);
    }

    #[test]
    fn test_out_of_bounds_error_names_location_and_shape() {
        let mut env = clean_world(1, 2, 0.0);
        let err = env
            .place_dirt(&[VacuumWorldLocation::new(0, 5)])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "location (0, 5) is out of bounds for a 1x2 grid"
        );
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let mut env = clean_world(1, 2, 0.0);
        env.place_dirt(&[VacuumWorldLocation::new(0, 0)]).unwrap();

        env.clean_current_cell();
        let once = env.clone();
        env.clean_current_cell();
        assert_eq!(env, once);
        assert!(!env.sense());
    }

    #[test]
    fn test_cleaning_leaves_other_square_dirty() {
        let config = VacuumWorldConfig::new(1, 2, 1.0, 0.0);
        let mut env = VacuumWorldEnvironment::with_seed(&config, 42).unwrap();
        env.clean_current_cell();
        assert!(!env.sense());
        env.move_agent(Direction::Right);
        assert_eq!(env.agent_location(), VacuumWorldLocation::new(0, 1));
        assert!(env.sense());
    }

    #[test]
    fn test_cleaning_does_not_change_reward_until_time_advances() {
        let config = VacuumWorldConfig::new(1, 2, 1.0, 0.0);
        let mut env = VacuumWorldEnvironment::with_seed(&config, 42).unwrap();
        env.clean_current_cell();
        assert_eq!(env.total_reward(), 0.0);
        env.advance_time_step();
        assert_eq!(env.total_reward(), 1.0);
        assert_eq!(env.time_step(), 1);
    }

    #[test]
    fn test_move_falls_back_to_opposite_direction_at_walls() {
        let mut env = clean_world(1, 3, 0.0);
        env.move_agent(Direction::Left);
        assert_eq!(env.agent_location(), VacuumWorldLocation::new(0, 1));
        env.move_agent(Direction::Right);
        assert_eq!(env.agent_location(), VacuumWorldLocation::new(0, 2));
        env.move_agent(Direction::Right);
        assert_eq!(env.agent_location(), VacuumWorldLocation::new(0, 1));
        env.move_agent(Direction::Left);
        assert_eq!(env.agent_location(), VacuumWorldLocation::new(0, 0));
    }

    #[test]
    fn test_single_column_move_stays_put() {
        let mut env = clean_world(3, 1, 0.0);
        for direction in [Direction::Left, Direction::Right] {
            env.move_agent(direction);
            assert_eq!(env.agent_location(), VacuumWorldLocation::new(0, 0));
        }
    }

    #[test]
    fn test_every_move_costs_the_penalty() {
        let mut env = clean_world(1, 1, 0.75);
        env.move_agent(Direction::Left);
        assert_abs_diff_eq!(env.total_reward(), -0.75);

        let mut env = clean_world(1, 2, 0.75);
        // requested direction taken
        env.move_agent(Direction::Right);
        assert_abs_diff_eq!(env.total_reward(), -0.75);
        // fallback taken
        env.move_agent(Direction::Right);
        assert_abs_diff_eq!(env.total_reward(), -1.5);
    }

    #[test]
    fn test_advance_time_step_counts_every_clean_square() {
        let mut env = clean_world(2, 3, 0.0);
        env.place_dirt(&[VacuumWorldLocation::new(1, 1)]).unwrap();
        env.advance_time_step();
        assert_eq!(env.total_reward(), 5.0);
        env.advance_time_step();
        assert_eq!(env.total_reward(), 10.0);
        assert_eq!(env.time_step(), 2);
    }

    #[test]
    fn test_display_marks_agent_and_dirt() {
        let mut env = clean_world(2, 3, 0.0);
        env.place_dirt(&[VacuumWorldLocation::new(0, 0), VacuumWorldLocation::new(1, 2)])
            .unwrap();
        assert_eq!(
            env.to_string(),
            "  0 1 2\n0 A . .\n1 . . *\ntime step: 0, total reward: 0"
        );
        env.clean_current_cell();
        env.move_agent(Direction::Right);
        assert_eq!(
            env.to_string(),
            "  0 1 2\n0 . a .\n1 . . *\ntime step: 0, total reward: 0"
        );
    }
}
