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

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use vacuum_cleaner::evaluation::simulate_reflex_agent;
use vacuum_cleaner::vacuum_world::{VacuumWorldConfig, VacuumWorldLocation};
use vacuum_cleaner::Environment;

// Chapter 2 Intelligent Agents Exercises 11 and 12.
//
// Exercise 11:
//
// Implement a performance-measuring environment simulator for the vacuum-cleaner world depicted in
// Figure 2.8 and specified on page . Your implementation should be modular so that the sensors,
// actuators, and environment characteristics (size, shape, dirt placement, etc.) can be changed
// easily. (Note: for some choices of programming language and operating system there are already
// implementations in the online code repository.)
#[derive(Parser, Debug)]
#[command(
    name = "vacuum-agents",
    about = "Run a reflex vacuum agent once and print its score"
)]
struct Args {
    #[arg(long, default_value_t = 1)]
    rows: usize,

    #[arg(long, default_value_t = 2)]
    cols: usize,

    /// Probability that each square starts dirty
    #[arg(long, default_value_t = 0.5)]
    dirt_probability: f64,

    /// Subtracted from the score every time the agent moves
    #[arg(long, default_value_t = 0.0)]
    movement_penalty: f64,

    #[arg(long, default_value_t = 1000)]
    time_steps: u64,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Make a square dirty before the run. May be repeated.
    #[arg(long = "dirt", value_name = "ROW,COL", value_parser = parse_location)]
    dirt: Vec<VacuumWorldLocation>,

    /// Print the result as JSON instead of drawing the grid
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    config: VacuumWorldConfig,
    time_step: u64,
    total_reward: f64,
    agent_location: VacuumWorldLocation,
    dirty_squares: usize,
}

fn parse_location(s: &str) -> Result<VacuumWorldLocation, String> {
    let (row, col) = s
        .split_once(',')
        .ok_or_else(|| format!("expected ROW,COL, got {:?}", s))?;
    let row = row
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("invalid row {:?}: {}", row, e))?;
    let col = col
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("invalid column {:?}: {}", col, e))?;
    Ok(VacuumWorldLocation::new(row, col))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let config = VacuumWorldConfig::new(
        args.rows,
        args.cols,
        args.dirt_probability,
        args.movement_penalty,
    );
    tracing::info!(?config, time_steps = args.time_steps, seed = args.seed, "starting");
    let simulation = simulate_reflex_agent(&config, &args.dirt, args.time_steps, args.seed)
        .context("failed to set up the vacuum world")?;
    let environment = simulation.environment();

    if args.json {
        let report = Report {
            config,
            time_step: environment.time_step(),
            total_reward: environment.total_reward(),
            agent_location: environment.agent_location(),
            dirty_squares: environment.dirty_square_count(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", environment);
        println!("score: {}", simulation.score());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_location() {
        assert_eq!(parse_location("0,1"), Ok(VacuumWorldLocation::new(0, 1)));
        assert_eq!(parse_location(" 3 , 4 "), Ok(VacuumWorldLocation::new(3, 4)));
        assert!(parse_location("3").is_err());
        assert!(parse_location("a,1").is_err());
        assert!(parse_location("1,-1").is_err());
    }

    #[test]
    fn test_args_collect_repeated_dirt() {
        let args = Args::parse_from([
            "vacuum-agents",
            "--dirt",
            "0,0",
            "--dirt",
            "0,1",
            "--dirt-probability",
            "0",
            "--time-steps",
            "5",
        ]);
        assert_eq!(
            args.dirt,
            vec![VacuumWorldLocation::new(0, 0), VacuumWorldLocation::new(0, 1)]
        );
        assert_eq!(args.dirt_probability, 0.0);
        assert_eq!(args.time_steps, 5);
        assert!(!args.json);
    }

    #[test]
    fn test_args_match_clap_rules() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
