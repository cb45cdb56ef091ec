use std::collections::HashSet;
use std::time::Duration;

use colored::{ColoredString, Colorize};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::plan::TaskKey;
use crate::Result;

/// Every step of generating one memory, in order.
///
/// Optional steps run only when their task, or [`TaskKey::All`], is selected.
const STEPS: [(&str, TaskKey, bool); 5] = [
    ("Characterize", TaskKey::Characterize, false),
    ("Generate plan", TaskKey::GeneratePlan, false),
    ("Generate LEF", TaskKey::GenerateLef, true),
    ("Generate LIB", TaskKey::GenerateLib, true),
    ("Generate Verilog", TaskKey::GenerateVerilog, true),
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepStatus {
    Done,
    Pending,
    InProgress,
    Disabled,
    Skipped,
    Failed,
}

impl StepStatus {
    fn label(self) -> ColoredString {
        match self {
            StepStatus::Done => "Done".green().bold(),
            StepStatus::Pending => "Pending".blue().bold(),
            StepStatus::InProgress => "In Progress".bright_white().bold(),
            StepStatus::Disabled => "Disabled".truecolor(120, 120, 120).bold(),
            StepStatus::Skipped => "Skipped".yellow().bold(),
            StepStatus::Failed => "Failed".bright_white().on_red().bold(),
        }
    }

    #[inline]
    fn is_waiting(self) -> bool {
        matches!(self, StepStatus::Pending | StepStatus::InProgress)
    }

    fn template(self) -> String {
        let lead = if self.is_waiting() {
            "{spinner:.green}"
        } else {
            " "
        };
        format!("{lead} {:16} {{msg}}", self.label())
    }
}

/// Progress through the steps of generating one memory.
pub struct StepContext {
    name: String,
    current: usize,
    steps: Vec<Step>,
}

pub struct Step {
    key: TaskKey,
    status: StepStatus,
    bar: ProgressBar,
}

impl Step {
    fn set_status(&mut self, status: StepStatus) {
        self.status = status;
        if let Ok(style) = ProgressStyle::with_template(&status.template()) {
            self.bar.set_style(style);
        }
        match status {
            StepStatus::InProgress => self.bar.enable_steady_tick(Duration::from_millis(200)),
            StepStatus::Pending => {}
            _ => self.bar.finish(),
        }
    }

    #[inline]
    pub fn key(&self) -> TaskKey {
        self.key
    }

    #[inline]
    pub fn status(&self) -> StepStatus {
        self.status
    }
}

impl StepContext {
    pub fn new(name: &str, tasks: &HashSet<TaskKey>) -> Self {
        println!("Tasks for {name}:");

        let selected = |key: TaskKey| tasks.contains(&key) || tasks.contains(&TaskKey::All);
        let enabled = STEPS
            .iter()
            .filter(|(_, key, optional)| !optional || selected(*key))
            .count();
        let width = enabled.to_string().len();

        let mp = MultiProgress::new();
        let mut counter = 0;
        let mut steps = Vec::with_capacity(STEPS.len());
        for (desc, key, optional) in STEPS {
            let bar = mp.add(ProgressBar::new_spinner());
            let mut step = Step {
                key,
                status: StepStatus::Pending,
                bar,
            };
            if optional && !selected(key) {
                step.bar.set_message(format!("[-/-] {desc}"));
                step.set_status(StepStatus::Disabled);
            } else {
                counter += 1;
                step.bar
                    .set_message(format!("[{counter:width$}/{enabled:width$}] {desc}"));
                step.set_status(StepStatus::Pending);
            }
            steps.push(step);
        }

        let mut ctx = StepContext {
            name: name.to_string(),
            current: 0,
            steps,
        };
        ctx.start_current();
        ctx
    }

    /// The step that is running, or `None` once every step has ended.
    #[inline]
    pub fn current_step(&mut self) -> Option<&mut Step> {
        self.steps.get_mut(self.current)
    }

    fn start_current(&mut self) {
        while let Some(step) = self.steps.get_mut(self.current) {
            if step.status != StepStatus::Disabled {
                step.set_status(StepStatus::InProgress);
                return;
            }
            self.current += 1;
        }
    }

    /// Marks the current step failed and every later step skipped if `res` is an error.
    pub fn check<T>(&mut self, res: Result<T>) -> Result<T> {
        if res.is_err() && self.current < self.steps.len() {
            for (i, step) in self.steps.iter_mut().enumerate().skip(self.current) {
                if i == self.current {
                    step.set_status(StepStatus::Failed);
                } else if step.status.is_waiting() {
                    step.set_status(StepStatus::Skipped);
                }
            }
            self.current = self.steps.len();
            println!("\n");
        }
        res
    }

    /// Completes the step for `key`, which must be the current one.
    pub fn finish(&mut self, key: TaskKey) {
        let Some(step) = self.current_step() else {
            panic!("step {key:?} finished after every step had ended");
        };
        assert_eq!(step.key, key, "steps must finish in order");
        step.set_status(StepStatus::Done);

        self.current += 1;
        self.start_current();
        if self.current == self.steps.len() {
            println!("\n\nCompleted all tasks for {}", self.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statuses(ctx: &StepContext) -> Vec<StepStatus> {
        ctx.steps.iter().map(Step::status).collect()
    }

    #[test]
    fn test_disabled_steps_are_skipped() {
        let tasks = HashSet::from([TaskKey::GenerateLib]);
        let mut ctx = StepContext::new("fakeram45_64x32", &tasks);
        ctx.finish(TaskKey::Characterize);
        ctx.finish(TaskKey::GeneratePlan);
        assert_eq!(
            ctx.current_step().map(|step| step.key()),
            Some(TaskKey::GenerateLib)
        );
        ctx.finish(TaskKey::GenerateLib);
        assert!(ctx.current_step().is_none());
        assert_eq!(
            statuses(&ctx),
            vec![
                StepStatus::Done,
                StepStatus::Done,
                StepStatus::Disabled,
                StepStatus::Done,
                StepStatus::Disabled,
            ]
        );
    }

    #[test]
    fn test_check_failure() {
        let tasks = HashSet::from([TaskKey::All]);
        let mut ctx = StepContext::new("fakeram45_64x32", &tasks);
        ctx.finish(TaskKey::Characterize);
        let res: Result<()> = Err(anyhow::anyhow!("no room for pins"));
        assert!(ctx.check(res).is_err());
        assert!(ctx.current_step().is_none());
        assert_eq!(
            statuses(&ctx),
            vec![
                StepStatus::Done,
                StepStatus::Failed,
                StepStatus::Skipped,
                StepStatus::Skipped,
                StepStatus::Skipped,
            ]
        );
    }

    #[test]
    #[should_panic(expected = "steps must finish in order")]
    fn test_finish_out_of_order() {
        let tasks = HashSet::from([TaskKey::All]);
        let mut ctx = StepContext::new("fakeram45_64x32", &tasks);
        ctx.finish(TaskKey::GeneratePlan);
    }
}
