use std::path::{Path, PathBuf};

pub fn out_verilog(work_dir: impl AsRef<Path>, name: &str) -> PathBuf {
    PathBuf::from(work_dir.as_ref()).join(format!("{name}.v"))
}

pub fn out_lef(work_dir: impl AsRef<Path>, name: &str) -> PathBuf {
    PathBuf::from(work_dir.as_ref()).join(format!("{name}.lef"))
}

pub fn out_lib(work_dir: impl AsRef<Path>, name: &str) -> PathBuf {
    PathBuf::from(work_dir.as_ref()).join(format!("{name}.lib"))
}

pub fn out_cacti_cfg(work_dir: impl AsRef<Path>) -> PathBuf {
    PathBuf::from(work_dir.as_ref()).join("cacti.cfg")
}

/// CACTI writes its results next to the configuration file.
pub fn out_cacti_results(cfg_path: impl AsRef<Path>) -> PathBuf {
    let mut path = cfg_path.as_ref().as_os_str().to_owned();
    path.push(".out");
    PathBuf::from(path)
}
