use clap::Parser;
use kdam::BarExt;
use num::ToPrimitive;
use rand_chacha::rand_core::SeedableRng;

use tissue_games::prelude::*;

/// Donation game on a honeycomb monolayer with fitness-proportional division
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct CLIArgs {
    /// Cells per side of the honeycomb patch
    #[arg(short, long, default_value_t = 16)]
    number: usize,

    /// Initial proportion of defectors
    #[arg(short, long, default_value_t = 0.1)]
    proportion: f64,

    /// Benefit received from a cooperating neighbor
    #[arg(short, long, default_value_t = 10.0)]
    benefit: f64,

    /// Cost paid by a cooperator per neighbor
    #[arg(short, long, default_value_t = 5.0)]
    cost: f64,

    /// Selection intensity of the fitness mapping
    #[arg(short, long, default_value_t = 0.01)]
    intensity: f64,

    /// Time between two selection events
    #[arg(long, default_value_t = 10.0)]
    period: f64,

    /// Time step of the simulation loop
    #[arg(long, default_value_t = 0.005)]
    dt: f64,

    /// Total simulated time
    #[arg(short, long, default_value_t = 100.0)]
    time: f64,

    /// Seed of the random number generator
    #[arg(short, long, default_value_t = 1)]
    seed: u64,

    /// Cost matrix resource driving the tension rule
    #[arg(long)]
    costs: Option<std::path::PathBuf>,

    /// Demographics resource for the initial cell types
    #[arg(long)]
    demographics: Option<std::path::PathBuf>,

    /// Write an XML parameter report to this path
    #[arg(long)]
    report: Option<std::path::PathBuf>,

    /// Hide the progress bar
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

fn initialize_bar(total: usize) -> Result<kdam::Bar, TimeError> {
    let bar_format = "\
    {desc}{percentage:3.0}%|{animation}| \
    {count}/{total} \
    [{elapsed}, \
    {rate:.2}{unit}/s{postfix}]";
    Ok(kdam::BarBuilder::default()
        .total(total)
        .bar_format(bar_format)
        .dynamic_ncols(true)
        .build()?)
}

fn number_of_steps(time: f64, dt: f64) -> Result<usize, TimeError> {
    if !(dt > 0.0) {
        return Err(TimeError(format!("time step must be positive but is {dt}")));
    }
    (time / dt).round().to_usize().ok_or(TimeError(format!(
        "cannot derive a step count from time {time} and step {dt}"
    )))
}

fn main() -> Result<(), SimulationError> {
    let args = CLIArgs::parse();
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(args.seed);

    let mut patch = HoneycombMonolayer::new(args.number, args.number)?;
    patch.randomize_strategies(args.proportion, &mut rng);

    let costs = match &args.costs {
        Some(path) => Some(CostMatrix::from_path(path)?),
        None => None,
    };
    let demographics = match &args.demographics {
        Some(path) => Some(Demographics::from_path(path)?),
        None => None,
    };
    if let (Some(costs), Some(demographics)) = (&costs, &demographics) {
        if costs.n_types() != demographics.n_types() {
            return Err(SetupError(format!(
                "cost matrix covers {} types but demographics describe {}",
                costs.n_types(),
                demographics.n_types()
            ))
            .into());
        }
    }
    if let Some(demographics) = &demographics {
        patch.randomize_types(demographics, &mut rng);
    }

    let game = DonationGame::new(args.benefit, args.cost, args.intensity);
    let controller = ProliferationController::new(game, args.period);
    let cycle_model = FlagDrivenCycleModel::default();
    let tension = match &costs {
        Some(costs) => LineTension::new(LineTensionPolicy::FromCostMatrix(costs.clone())),
        None => LineTension::default(),
    };

    if let Some(path) = &args.report {
        let mut parameter_report = ParameterReport::new(&cycle_model, &controller);
        if let Some(costs) = &costs {
            parameter_report = parameter_report.with_costs(costs);
        }
        if let Some(demographics) = &demographics {
            parameter_report = parameter_report.with_demographics(demographics);
        }
        parameter_report.write_to_path(path)?;
    }

    let n_steps = number_of_steps(args.time, args.dt)?;
    let mut bar = match args.quiet {
        false => Some(initialize_bar(n_steps + 1)?),
        true => None,
    };

    let mut n_divisions = 0;
    for step in 0..=n_steps {
        let time = step as f64 * args.dt;
        controller.update_at_end_of_time_step(&mut patch, time, args.dt, &mut rng)?;
        for index in patch.cell_indices() {
            let event = {
                let record = patch.record_mut(index)?;
                FlagDrivenCycleModel::update_cycle(&mut rng, &args.dt, record)
            };
            if let Some(CycleEvent::Division) = event {
                patch.replace_with_daughter_of(index, &mut rng)?;
                n_divisions += 1;
            }
        }
        if let Some(bar) = bar.as_mut() {
            let _ = bar.update(1)?;
        }
    }
    if bar.is_some() {
        println!();
    }

    controller.game.update_fitness(&mut patch)?;
    let mut cooperators = 0;
    let mut mean_fitness = 0.0;
    for index in patch.cell_indices() {
        let record = patch.record(index)?;
        if record.strategy == Strategy::Cooperator {
            cooperators += 1;
        }
        mean_fitness += record.fitness;
    }
    mean_fitness /= patch.n_cells() as f64;
    let total_tension = patch.total_line_tension(&tension)?;

    println!("cells:         {}", patch.n_cells());
    println!("cooperators:   {}", cooperators);
    println!("defectors:     {}", patch.n_cells() - cooperators);
    println!("divisions:     {}", n_divisions);
    println!("mean fitness:  {:.6}", mean_fitness);
    println!("total tension: {:.6}", total_tension);
    Ok(())
}
