use clap::Parser;
use dice_expr::{Limits, RollContext};
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

/// Reads one dice expression per line. `?expr` prints its exact distribution,
/// `~expr` a Monte Carlo estimate, anything else is rolled.
#[derive(Parser, Debug)]
#[command(name = "dice-repl", version)]
struct Cli {
    /// How many times a single die may chain explosions.
    #[arg(long, default_value_t = Limits::DEFAULT_MAX_EXPLOSION_DEPTH)]
    max_depth: usize,
    /// How many draws one roll may make.
    #[arg(long, default_value_t = Limits::DEFAULT_MAX_ROLLS)]
    max_rolls: usize,
    /// How many keep/drop pools exact analysis may enumerate.
    #[arg(long, default_value_t = Limits::DEFAULT_MAX_OUTCOMES)]
    max_outcomes: u64,
    /// Samples taken by `~expr`.
    #[arg(long, default_value_t = 100_000)]
    samples: u32,
}

fn eval_line(line: &str, cli: &Cli, ctx: &mut RollContext) -> String {
    let limits = *ctx.limits();
    let analysis = if let Some(expr) = line.strip_prefix('?') {
        dice_expr::analyze_with(expr.trim(), &limits)
    } else if let Some(expr) = line.strip_prefix('~') {
        dice_expr::monte_carlo_with(expr.trim(), cli.samples, ctx)
    } else {
        return dice_expr::throw_with(line, ctx).to_string();
    };
    match analysis.map(|a| serde_json::to_string(&a)) {
        Ok(Ok(json)) => json,
        Ok(Err(why)) => format!("Error: {}", why),
        Err(why) => format!("Error: {}", why),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let limits = Limits::default()
        .with_max_explosion_depth(cli.max_depth)
        .with_max_rolls(cli.max_rolls)
        .with_max_outcomes(cli.max_outcomes);
    let mut ctx = RollContext::new(limits, rand::thread_rng());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    print!("> ");
    io::stdout().flush()?;
    loop {
        match lines.next() {
            Some(Ok(line)) => {
                let line = line.trim();
                if !line.is_empty() {
                    println!("{}", eval_line(line, &cli, &mut ctx));
                }
            }
            // A line that is not UTF-8 is skipped; other read errors end the session.
            Some(Err(why)) => {
                println!("Error: {}", why);
                if why.kind() != io::ErrorKind::InvalidData {
                    break;
                }
            }
            None => break,
        }
        print!("> ");
        io::stdout().flush()?;
    }
    Ok(())
}
