//! binary font compiler
//!
//! Takes a build plan and writes the compiled font to the plan's output
//! directory.

use std::path::PathBuf;

use clap::Parser;
use pixel_fonts::{layout::UnresolvedPolicy, BuildPlan, FontProject};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The build plan.
    plan: PathBuf,

    /// Write the font here instead of the plan's output directory.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Fail if a ligature or alternate refers to an unknown glyph
    #[arg(long)]
    strict: bool,

    /// Don't run the plan's post-processing command
    #[arg(long)]
    no_postprocess: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut plan = match BuildPlan::load(&args.plan) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    if let Some(output_dir) = args.output_dir {
        plan.output_dir = output_dir;
    }
    if args.strict {
        plan.substitutions.unresolved = UnresolvedPolicy::Error;
    }

    let result = FontProject::new(plan).and_then(|mut project| project.build(!args.no_postprocess));
    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
