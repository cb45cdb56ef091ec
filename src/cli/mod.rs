use std::collections::HashSet;
use std::fs::canonicalize;

use clap::Parser;

use crate::cacti::characterize;
use crate::cli::args::Args;
use crate::cli::progress::StepContext;
use crate::config::parse_config;
use crate::plan::{execute_plan, generate_plan, validate_sram, ExecutePlanParams, TaskKey};
use crate::Result;

pub mod args;
pub mod progress;

pub const BANNER: &str = r"
 ________ ________  ___  __    _______   ________  ________  _____ ______
|\  _____\\   __  \|\  \|\  \ |\  ___ \ |\   __  \|\   __  \|\   _ \  _   \
\ \  \__/\ \  \|\  \ \  \/  /|\ \   __/|\ \  \|\  \ \  \|\  \ \  \\\__\ \  \
 \ \   __\\ \   __  \ \   ___  \ \  \_|/_\ \   _  _\ \   __  \ \  \\|__| \  \
  \ \  \_| \ \  \ \  \ \  \\ \  \ \  \_|\ \ \  \\  \\ \  \ \  \ \  \    \ \  \
   \ \__\   \ \__\ \__\ \__\\ \__\ \_______\ \__\\ _\\ \__\ \__\ \__\    \ \__\
    \|__|    \|__|\|__|\|__| \|__|\|_______|\|__|\|__|\|__|\|__|\|__|     \|__|

FAKERAM v0.1
";

pub fn run() -> Result<()> {
    let args = Args::parse();

    let config_path = canonicalize(&args.config)?;

    println!("{BANNER}");

    println!("Reading configuration file...\n");
    let config = parse_config(&config_path)?;

    println!("Configuration file: {:?}", &config_path);
    println!("Process parameters:");
    println!("\tTechnology node: {} nm", config.process.tech_nm);
    println!("\tMetal prefix: {}", config.process.metal_prefix);
    println!("\tPin width: {} nm", config.process.pin_width_nm);
    println!("\tPin pitch: {} nm", config.process.pin_pitch_nm);
    println!("\tFlip pins: {}", config.process.flip_pins);
    println!("\tVoltage: {} V", config.process.voltage);

    let enabled_tasks = vec![
        (args.lef, TaskKey::GenerateLef),
        (args.lib, TaskKey::GenerateLib),
        (args.verilog, TaskKey::GenerateVerilog),
        (args.all, TaskKey::All),
    ]
    .into_iter()
    .filter_map(|(a, b)| if a { Some(b) } else { None });

    let mut tasks: HashSet<TaskKey> = enabled_tasks.collect();
    if tasks.is_empty() {
        tasks.insert(TaskKey::All);
    }

    std::fs::create_dir_all(&args.output_dir)?;
    let output_dir = canonicalize(&args.output_dir)?;

    for sram in &config.srams {
        println!("\nSRAM {}:", sram.name);
        println!("\tNumber of words: {}", sram.depth);
        println!("\tData width: {}", sram.width);

        let work_dir = output_dir.join(sram.name.as_str());
        let mut ctx = StepContext::new(&sram.name, &tasks);

        ctx.check(validate_sram(&config.process, sram))?;
        let characterization = ctx.check(characterize(
            &config.process,
            sram,
            &work_dir,
            args.cacti_dir.as_deref(),
        ))?;
        ctx.finish(TaskKey::Characterize);

        let plan = ctx.check(generate_plan(&config.process, sram, &characterization))?;
        ctx.finish(TaskKey::GeneratePlan);

        let res = execute_plan(ExecutePlanParams {
            work_dir: &work_dir,
            plan: &plan,
            tasks: &tasks,
            ctx: Some(&mut ctx),
        });

        ctx.check(res)?;
        println!("Artifacts saved to: {:?}\n", &work_dir);
    }

    Ok(())
}
