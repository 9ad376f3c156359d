//! Runs a scene file through the sweeper.
//!
//! A scene file starts with the number of arcs `N`, followed by `N` groups of
//! five numbers `a b c t1 t2`, one arc per line. Every line after that is a
//! command (`step`, `step -p`, `status`, or `run`).

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::Parser;

use arcsweep::{Arcs, Command, Sweeper};

#[derive(Parser)]
struct Args {
    input: PathBuf,

    #[arg(long)]
    swap_offset: Option<f64>,
}

struct Scene {
    arcs: Arcs,
    commands: Vec<Command>,
}

fn parse_scene(input: &str) -> anyhow::Result<Scene> {
    let mut lines = input.lines().map(str::trim).filter(|l| !l.is_empty());

    let count: usize = lines
        .next()
        .ok_or_else(|| anyhow!("empty scene"))?
        .parse()
        .context("bad arc count")?;

    let mut arcs = Arcs::default();
    for i in 0..count {
        let line = lines
            .next()
            .ok_or_else(|| anyhow!("expected {count} arcs, found {i}"))?;
        let nums = line
            .split_whitespace()
            .map(str::parse::<f64>)
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("bad arc {i}: {line:?}"))?;
        let [a, b, c, t1, t2] = nums[..] else {
            anyhow::bail!("arc {i} needs five numbers, got {line:?}");
        };
        arcs.push(a, b, c, t1, t2)?;
    }

    let commands = lines
        .map(|l| l.parse::<Command>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Scene { arcs, commands })
}

pub fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let input = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let scene = parse_scene(&input)?;

    let mut sweeper = match args.swap_offset {
        Some(offset) => Sweeper::with_swap_offset(&scene.arcs, offset),
        None => Sweeper::new(&scene.arcs),
    };
    for cmd in scene.commands {
        for line in sweeper.execute(cmd)? {
            println!("{line}");
        }
    }
    Ok(())
}
