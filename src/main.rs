mod game;
mod levels;
mod solver;
mod state;

use clap::Parser;
use game::{Direction, Grid, moves_to_string};
use levels::Levels;
use solver::{SolveResult, Solver, SolverConfig};
use state::{PushRule, Rules, State, TargetRule};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn print_solution(grid: &Grid, solution: &[Direction], rules: Rules) {
    println!("\nStarting position:\n{}", grid);
    let Some(mut state) = State::initial(grid) else {
        return;
    };
    let total = solution.len();
    for (count, &dir) in solution.iter().enumerate() {
        let from = state.player();
        state = match state.step(dir, rules, grid) {
            Some(next) => next,
            None => {
                eprintln!("Move {} ({}) is blocked", count + 1, dir);
                return;
            }
        };
        println!(
            "Move {} {} ({}/{}):\n{}",
            from,
            dir,
            count + 1,
            total,
            state.grid()
        );
    }
    println!("Moves: {}", moves_to_string(solution));
}

struct LevelStats {
    solved: bool,
    moves: usize,
    states_explored: usize,
    elapsed_ms: u128,
}

struct SolveOpts {
    level_num: usize,
    config: SolverConfig,
    print_solution: bool,
}

fn solve_level(grid: &Grid, opts: SolveOpts) -> LevelStats {
    let mut solver = Solver::new(opts.config);
    let start = Instant::now();
    let result = solver.solve(grid);
    let elapsed_ms = start.elapsed().as_millis();
    let states_explored = solver.states_expanded();
    let max_frontier = solver.max_frontier();

    let result = match result {
        Ok(result) => result,
        Err(e) => {
            eprintln!("level: {:<3}  error: {}", opts.level_num, e);
            return LevelStats {
                solved: false,
                moves: 0,
                states_explored,
                elapsed_ms,
            };
        }
    };

    let (solved_char, solution_len, solved) = match &result {
        SolveResult::Solved(solution) => ('Y', solution.len(), true),
        SolveResult::Cutoff => ('N', 0, false),
        SolveResult::Impossible => ('X', 0, false),
    };

    println!(
        "level: {:<3}  solved: {}  moves: {:<5}  states: {:<12}  frontier: {:<10}  elapsed: {} ms",
        opts.level_num, solved_char, solution_len, states_explored, max_frontier, elapsed_ms
    );

    if opts.print_solution {
        if let SolveResult::Solved(solution) = result {
            print_solution(grid, &solution, solver.config().rules());
        }
    }

    LevelStats {
        solved,
        moves: solution_len,
        states_explored,
        elapsed_ms,
    }
}

#[derive(Parser)]
#[command(name = "pushbfs")]
#[command(about = "A breadth-first box-pushing puzzle solver", long_about = None)]
struct Args {
    /// Path to the levels file (W . T B P markers)
    #[arg(value_name = "FILE")]
    levels_file: String,

    /// Level number to solve (1-indexed), or start of range
    #[arg(value_name = "LEVEL")]
    level_start: usize,

    /// Optional end of level range (inclusive, 1-indexed)
    #[arg(value_name = "LEVEL_END")]
    level_end: Option<usize>,

    /// Print the solution move by move
    #[arg(short, long)]
    print_solution: bool,

    /// Maximum number of states to expand before giving up
    #[arg(short = 'n', long)]
    max_states: Option<usize>,

    /// Let the player walk over target cells
    #[arg(long, default_value = "false")]
    walkable_targets: bool,

    /// Refuse to push a box into another box instead of merging them
    #[arg(long, default_value = "false")]
    blocking_pushes: bool,

    /// Log search progress every this many expanded states
    #[arg(long, default_value = "100000")]
    progress_interval: usize,

    /// Log search progress and results (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    // Load levels from file
    let levels = match Levels::from_file(&args.levels_file) {
        Ok(levels) => levels,
        Err(e) => {
            eprintln!("Error loading levels: {}", e);
            std::process::exit(1);
        }
    };

    if levels.is_empty() {
        eprintln!("Error: {} contains no levels", args.levels_file);
        std::process::exit(1);
    }

    // Determine the range of levels to solve
    let level_end = args.level_end.unwrap_or(args.level_start);

    // Validate range
    if args.level_start == 0 {
        eprintln!("Error: level numbers must be at least 1");
        std::process::exit(1);
    }

    if level_end < args.level_start {
        eprintln!("Error: level end must be >= level start");
        std::process::exit(1);
    }

    if level_end > levels.len() {
        eprintln!(
            "Error: level {} not found (file contains {} levels)",
            level_end,
            levels.len()
        );
        std::process::exit(1);
    }

    let num_levels = level_end - args.level_start + 1;
    if args.print_solution && num_levels > 1 {
        eprintln!("Error: solution printing only supported when solving a single level");
        std::process::exit(1);
    }

    let config = SolverConfig {
        target_rule: if args.walkable_targets {
            TargetRule::Walkable
        } else {
            TargetRule::Blocking
        },
        push_rule: if args.blocking_pushes {
            PushRule::Blocking
        } else {
            PushRule::Merging
        },
        max_states: args.max_states,
        progress_interval: args.progress_interval,
    };

    // Solve each level in the range
    let mut total_solved = 0;
    let mut total_moves = 0;
    let mut total_states = 0;
    let mut total_time_ms = 0;

    for level_num in args.level_start..=level_end {
        let Some(grid) = levels.get(level_num - 1) else {
            continue;
        };
        let opts = SolveOpts {
            level_num,
            config,
            print_solution: args.print_solution,
        };
        let stats = solve_level(grid, opts);

        if stats.solved {
            total_solved += 1;
        }
        total_moves += stats.moves;
        total_states += stats.states_explored;
        total_time_ms += stats.elapsed_ms;
    }

    // Print summary statistics if multiple levels were solved
    if num_levels > 1 {
        println!("---");
        println!(
            "solved: {:>3}/{:<3}        moves: {:<5}  states: {:<12}  elapsed: {} ms",
            total_solved, num_levels, total_moves, total_states, total_time_ms
        );
    }
}
