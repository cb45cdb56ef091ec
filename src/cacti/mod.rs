//! Area, timing and power estimates from CACTI.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{anyhow, bail, Context};
use serde::{Deserialize, Serialize};

use crate::config::{ProcessConfig, SramConfig};
use crate::paths::{out_cacti_cfg, out_cacti_results};
use crate::{Result, TEMPLATES};

/// Environment variable naming the CACTI build directory.
pub const CACTI_DIR_ENV: &str = "CACTI_BUILD_DIR";

/// CACTI's estimates for one memory.
///
/// Field order matches the columns of the CACTI results file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Characterization {
    pub tech_node_nm: u32,
    pub capacity_bytes: usize,
    pub associativity: usize,
    pub output_width_bits: usize,
    pub access_time_ns: f64,
    pub cycle_time_ns: f64,
    pub dyn_search_energy_nj: f64,
    pub dyn_read_energy_nj: f64,
    pub dyn_write_energy_nj: f64,
    pub standby_leakage_per_bank_mw: f64,
    pub area_mm2: f64,
    pub fo4_ps: f64,
    pub width_um: f64,
    pub height_um: f64,
}

/// Values substituted into the CACTI configuration template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CactiConfigParams {
    pub size_bytes: usize,
    pub block_bytes: usize,
    pub rw_ports: usize,
    pub r_ports: usize,
    pub w_ports: usize,
    pub tech_um: String,
    pub bus_bits: usize,
    pub cache_type: String,
}

impl CactiConfigParams {
    /// A single read-write port memory.
    pub fn new(process: &ProcessConfig, sram: &SramConfig) -> Self {
        Self {
            size_bytes: sram.total_size_bytes(),
            block_bytes: sram.width_in_bytes(),
            rw_ports: 1,
            r_ports: 0,
            w_ports: 0,
            tech_um: process.tech_um().to_string(),
            bus_bits: sram.width_in_bytes() * 8,
            cache_type: sram.cache_type.clone(),
        }
    }
}

pub fn generate_cacti_config(params: &CactiConfigParams) -> Result<String> {
    Ok(TEMPLATES.render("cacti.cfg", &tera::Context::from_serialize(params)?)?)
}

pub fn save_cacti_config(path: impl AsRef<Path>, params: &CactiConfigParams) -> Result<()> {
    let cfg = generate_cacti_config(params)?;

    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, cfg)?;

    Ok(())
}

pub struct CactiParams<'a> {
    /// Directory holding the `cacti` binary. CACTI must be run from there.
    pub cacti_dir: &'a Path,
    pub cfg_path: &'a Path,
}

struct CactiGeneratedPaths {
    results_path: PathBuf,
    stdout_path: PathBuf,
    stderr_path: PathBuf,
}

fn generate_paths(cfg_path: &Path) -> CactiGeneratedPaths {
    let dir = cfg_path.parent().unwrap_or_else(|| Path::new("."));
    CactiGeneratedPaths {
        results_path: out_cacti_results(cfg_path),
        stdout_path: dir.join("cacti.log"),
        stderr_path: dir.join("cacti.err"),
    }
}

/// Runs CACTI on an existing configuration file and reads back its results.
pub fn run_cacti(params: &CactiParams) -> Result<Characterization> {
    let cfg_path = std::fs::canonicalize(params.cfg_path)
        .with_context(|| format!("CACTI configuration {:?} not found", params.cfg_path))?;
    let paths = generate_paths(&cfg_path);

    let out_file = std::fs::File::create(&paths.stdout_path)?;
    let err_file = std::fs::File::create(&paths.stderr_path)?;

    log::info!("running CACTI on {:?}", cfg_path);
    let status = Command::new(params.cacti_dir.join("cacti"))
        .arg("-infile")
        .arg(&cfg_path)
        .stdout(out_file)
        .stderr(err_file)
        .current_dir(params.cacti_dir)
        .status()
        .with_context(|| format!("failed to run CACTI from {:?}", params.cacti_dir))?;

    if !status.success() {
        bail!(
            "CACTI exited unsuccessfully with status {:?}; see {:?}",
            status.code(),
            paths.stderr_path
        );
    }

    read_cacti_results(&paths.results_path)
}

pub fn read_cacti_results(path: impl AsRef<Path>) -> Result<Characterization> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read CACTI results {path:?}"))?;
    parse_cacti_results(&contents).with_context(|| format!("failed to parse {path:?}"))
}

/// Parses the last line of a CACTI results file.
pub fn parse_cacti_results(contents: &str) -> Result<Characterization> {
    let line = contents
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .ok_or_else(|| anyhow!("CACTI results are empty"))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(line.as_bytes());
    let record = reader
        .records()
        .next()
        .ok_or_else(|| anyhow!("CACTI results are empty"))??;

    macro_rules! parse_field {
        ($idx:expr, $name:ident) => {
            record
                .get($idx)
                .ok_or_else(|| anyhow!("missing field {} ({})", $idx, stringify!($name)))?
                .parse()
                .with_context(|| format!("invalid value for {}", stringify!($name)))?
        };
    }

    Ok(Characterization {
        tech_node_nm: parse_field!(0, tech_node_nm),
        capacity_bytes: parse_field!(1, capacity_bytes),
        associativity: parse_field!(2, associativity),
        output_width_bits: parse_field!(3, output_width_bits),
        access_time_ns: parse_field!(4, access_time_ns),
        cycle_time_ns: parse_field!(5, cycle_time_ns),
        dyn_search_energy_nj: parse_field!(6, dyn_search_energy_nj),
        dyn_read_energy_nj: parse_field!(7, dyn_read_energy_nj),
        dyn_write_energy_nj: parse_field!(8, dyn_write_energy_nj),
        standby_leakage_per_bank_mw: parse_field!(9, standby_leakage_per_bank_mw),
        area_mm2: parse_field!(10, area_mm2),
        fo4_ps: parse_field!(11, fo4_ps),
        width_um: parse_field!(12, width_um),
        height_um: parse_field!(13, height_um),
    })
}

/// Where to find CACTI: the given directory, or else `$CACTI_BUILD_DIR`.
pub fn cacti_dir(dir: Option<&Path>) -> Result<PathBuf> {
    match dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => std::env::var_os(CACTI_DIR_ENV)
            .map(PathBuf::from)
            .ok_or_else(|| {
                anyhow!("no CACTI directory given and {CACTI_DIR_ENV} is not set")
            }),
    }
}

/// Characterizes one memory.
///
/// Numbers given in the configuration are used as is. Otherwise a CACTI
/// configuration is written to `work_dir` and CACTI is run on it.
pub fn characterize(
    process: &ProcessConfig,
    sram: &SramConfig,
    work_dir: impl AsRef<Path>,
    cacti_dir: Option<&Path>,
) -> Result<Characterization> {
    if let Some(characterization) = sram.characterization.as_ref() {
        log::info!("{}: using characterization from configuration", sram.name);
        return Ok(characterization.clone());
    }

    let cacti_dir = self::cacti_dir(cacti_dir)?;
    let cfg_path = out_cacti_cfg(work_dir);
    save_cacti_config(&cfg_path, &CactiConfigParams::new(process, sram))?;
    run_cacti(&CactiParams {
        cacti_dir: &cacti_dir,
        cfg_path: &cfg_path,
    })
    .with_context(|| format!("failed to characterize {}", sram.name))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::config::parse_toml_config;
    use crate::tests::test_work_dir;

    const CACTI_OUT: &str = "\
Tech node (nm), Capacity (bytes), Associativity, Output width (bits), Access time (ns), ...
45, 256, 1, 64, 0.293, 0.214, 0.0, 0.0051, 0.0048, 0.722, 0.0031, 16.8, 56.28, 55.09,
";

    fn test_config() -> crate::config::Config {
        parse_toml_config(
            r#"
            tech_nm = 45
            metal_prefix = "metal"
            pin_width_nm = 70
            pin_pitch_nm = 140
            voltage = 1.1

            [[srams]]
            name = "fakeram45_64x20"
            width = 20
            depth = 64
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_cacti_results() -> Result<()> {
        let c = parse_cacti_results(CACTI_OUT)?;
        assert_eq!(c.tech_node_nm, 45);
        assert_eq!(c.capacity_bytes, 256);
        assert_eq!(c.associativity, 1);
        assert_eq!(c.output_width_bits, 64);
        assert_relative_eq!(c.access_time_ns, 0.293);
        assert_relative_eq!(c.cycle_time_ns, 0.214);
        assert_relative_eq!(c.dyn_write_energy_nj, 0.0048);
        assert_relative_eq!(c.standby_leakage_per_bank_mw, 0.722);
        assert_relative_eq!(c.width_um, 56.28);
        assert_relative_eq!(c.height_um, 55.09);
        Ok(())
    }

    #[test]
    fn test_parse_bad_cacti_results() {
        assert!(parse_cacti_results("").is_err());
        assert!(parse_cacti_results("45, 256, 1\n").is_err());
        assert!(parse_cacti_results("45, lots, 1, 4, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1\n").is_err());
    }

    #[test]
    fn test_generate_cacti_config() -> Result<()> {
        let config = test_config();
        let params = CactiConfigParams::new(&config.process, &config.srams[0]);
        let cfg = generate_cacti_config(&params)?;
        assert!(cfg.starts_with("# cacti.cfg\n"));
        assert!(cfg.contains("-size (bytes) 192\n"));
        assert!(cfg.contains("-block size (bytes) 3\n"));
        assert!(cfg.contains("-read-write port 1\n"));
        assert!(cfg.contains("-technology (u) 0.045\n"));
        assert!(cfg.contains("-output/input bus width 24\n"));
        assert!(cfg.contains("-cache type \"cache\"\n"));
        Ok(())
    }

    #[test]
    fn test_characterize_from_config() -> Result<()> {
        let mut config = test_config();
        config.srams[0].characterization = Some(Characterization {
            width_um: 10.0,
            height_um: 20.0,
            ..Default::default()
        });
        let work_dir = test_work_dir("test_characterize_from_config");
        let c = characterize(&config.process, &config.srams[0], &work_dir, None)?;
        assert_relative_eq!(c.height_um, 20.0);
        assert!(!out_cacti_cfg(&work_dir).exists());
        Ok(())
    }

    #[test]
    fn test_missing_cacti() {
        let config = test_config();
        let work_dir = test_work_dir("test_missing_cacti");
        let missing = work_dir.join("no_such_cacti_dir");
        assert!(characterize(&config.process, &config.srams[0], &work_dir, Some(&missing)).is_err());
        // The configuration is still written for inspection.
        assert!(out_cacti_cfg(&work_dir).exists());
    }
}
