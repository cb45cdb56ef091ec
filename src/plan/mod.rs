use std::collections::HashSet;
use std::path::Path;

use anyhow::bail;
use arcstr::ArcStr;
use rust_decimal::Decimal;

use crate::abs::save_lef;
use crate::cacti::Characterization;
use crate::cli::progress::StepContext;
use crate::config::{ProcessConfig, ProcessRules, SramConfig};
use crate::error::{LayoutError, LayoutResult};
use crate::layout::{plan_physical, MemoryShape, PhysicalView};
use crate::liberty::{save_lib, LibParams};
use crate::paths::{out_lef, out_lib, out_verilog};
use crate::verilog::save_1rw_verilog;
use crate::Result;

/// A concrete plan for one memory.
///
/// Everything needed to write its views; no file has been written yet.
pub struct SramPlan {
    pub rules: ProcessRules,
    pub shape: MemoryShape,
    pub view: PhysicalView,
    pub lib_params: LibParams,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TaskKey {
    Characterize,
    GeneratePlan,
    GenerateLef,
    GenerateLib,
    GenerateVerilog,
    All,
}

pub struct ExecutePlanParams<'a> {
    pub work_dir: &'a Path,
    pub plan: &'a SramPlan,
    pub tasks: &'a HashSet<TaskKey>,
    pub ctx: Option<&'a mut StepContext>,
}

/// Checks a memory's configuration before it is characterized.
pub fn validate_sram(process: &ProcessConfig, sram: &SramConfig) -> Result<()> {
    if sram.banks != 1 {
        bail!(
            "{}: only single-bank memories are supported, got {} banks",
            sram.name,
            sram.banks
        );
    }
    for (field, value) in [("depth", sram.depth), ("width", sram.width)] {
        if value == 0 {
            return Err(LayoutError::InvalidDimension {
                name: sram.name.clone(),
                field,
                value: value.to_string(),
            }
            .into());
        }
    }
    process.rules()?;

    if !sram.depth.is_power_of_two() {
        log::warn!(
            "{}: depth {} is not a power of two; the top addresses are unused",
            sram.name,
            sram.depth
        );
    }
    if sram.width % 8 != 0 {
        log::warn!(
            "{}: width {} is not a whole number of bytes; CACTI sees {} bits",
            sram.name,
            sram.width,
            sram.width_in_bytes() * 8
        );
    }
    Ok(())
}

/// A characterized length in exact decimal. Its sign is checked by [`MemoryShape::new`].
fn to_decimal(name: &ArcStr, field: &'static str, value: f64) -> LayoutResult<Decimal> {
    Decimal::from_f64_retain(value).ok_or_else(|| LayoutError::InvalidDimension {
        name: name.clone(),
        field,
        value: value.to_string(),
    })
}

pub fn generate_plan(
    process: &ProcessConfig,
    sram: &SramConfig,
    characterization: &Characterization,
) -> Result<SramPlan> {
    validate_sram(process, sram)?;
    let rules = process.rules()?;

    let width = to_decimal(&sram.name, "macro width", characterization.width_um)?;
    let height = to_decimal(&sram.name, "macro height", characterization.height_um)?;
    let (width, height) = (process.snap_width(width), process.snap_height(height));
    let shape = MemoryShape::new(sram.name.clone(), sram.depth, sram.width, width, height)?;
    log::info!(
        "{}: macro is {} x {} um after snapping",
        shape.name(),
        shape.width(),
        shape.height()
    );

    let view = plan_physical(&rules, &shape)?;
    let lib_params = LibParams::new(&shape, characterization, process.voltage)?;

    Ok(SramPlan {
        rules,
        shape,
        view,
        lib_params,
    })
}

macro_rules! try_finish_task {
    ( $ctx:expr, $task:expr ) => {
        if let Some(ctx) = $ctx.as_mut() {
            ctx.finish($task);
        }
    };
}

macro_rules! try_execute_task {
    ( $tasks:expr, $task:expr, $body:expr, $ctx:expr) => {
        if $tasks.contains(&$task) || $tasks.contains(&TaskKey::All) {
            $body;
            try_finish_task!($ctx, $task);
        }
    };
}

pub fn execute_plan(params: ExecutePlanParams) -> Result<()> {
    let ExecutePlanParams {
        work_dir,
        plan,
        tasks,
        mut ctx,
    } = params;

    std::fs::create_dir_all(work_dir)?;

    let name = plan.shape.name();

    try_execute_task!(
        tasks,
        TaskKey::GenerateLef,
        save_lef(out_lef(work_dir, name), &plan.rules, &plan.shape, &plan.view)?,
        ctx
    );
    try_execute_task!(
        tasks,
        TaskKey::GenerateLib,
        save_lib(out_lib(work_dir, name), &plan.lib_params)?,
        ctx
    );
    try_execute_task!(
        tasks,
        TaskKey::GenerateVerilog,
        save_1rw_verilog(out_verilog(work_dir, name), &plan.shape)?,
        ctx
    );

    Ok(())
}
