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

#![warn(missing_docs)]

//! Chapter 2, Exercise 12, Evaluate Reflex Agent.

use anyhow::Context;
use clap::Parser;
use vacuum_cleaner::evaluation::{evaluate, Evaluation};
use vacuum_cleaner::vacuum_world::VacuumWorldConfig;

// Exercise 12:
//
// Implement a simple reflex agent for the vacuum environment in Exercise 2.10. Run the environment
// with this agent for all possible initial dirt configurations and agent locations. Record the
// performance score for each configuration and the overall average score.
#[derive(Parser, Debug)]
#[command(
    name = "ch02-ex12-evaluate-reflex-agent",
    about = "Score a reflex vacuum agent on every initial dirt configuration"
)]
struct Args {
    #[arg(long, default_value_t = 1)]
    rows: usize,

    #[arg(long, default_value_t = 2)]
    cols: usize,

    /// Subtracted from the score every time the agent moves
    #[arg(long, default_value_t = 0.0)]
    movement_penalty: f64,

    #[arg(long, default_value_t = 10)]
    time_steps: u64,

    /// Seed of the first run; run `i` uses `seed + i`
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

fn print_evaluation(evaluation: &Evaluation) {
    for (i, run) in evaluation.runs.iter().enumerate() {
        let dirt = run
            .dirt
            .iter()
            .map(|location| location.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        println!("Run {}: dirt [{}]", i + 1, dirt);
        println!("Total Reward: {}", run.total_reward);
        println!("-------------");
    }
    println!("Average Reward: {}", evaluation.average_reward);
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let config = VacuumWorldConfig::new(args.rows, args.cols, 0.0, args.movement_penalty);
    tracing::info!(?config, time_steps = args.time_steps, "evaluating reflex agent");
    let evaluation =
        evaluate(&config, args.time_steps, args.seed).context("failed to evaluate reflex agent")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&evaluation)?);
    } else {
        print_evaluation(&evaluation);
    }
    Ok(())
}
