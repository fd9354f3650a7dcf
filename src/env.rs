use std::{env, path::PathBuf};

pub struct Env {}

impl Env {
    pub const OUTPUT_DIR_VAR: &'static str = "AVLBENCH_OUTPUT_DIR";

    pub fn proj_root() -> PathBuf {
        env!("CARGO_MANIFEST_DIR").into()
    }

    /// Root directory for generated plots and measurement files. Can be
    /// overridden with `AVLBENCH_OUTPUT_DIR`.
    pub fn output_root() -> PathBuf {
        match env::var(Self::OUTPUT_DIR_VAR) {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => {
                let mut path = Self::proj_root();
                path.push("eval");
                path
            }
        }
    }

    pub fn ubench_root() -> PathBuf {
        let mut path = Self::output_root();
        path.push("ubench");
        path
    }
}
