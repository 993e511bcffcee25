//! Fake `newman` executable
//!
//! Installs a small shell script that logs its arguments and exits non-zero
//! for selected collections, so the subprocess backend can be tested
//! without Node.js.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// A fake newman script and its invocation log
#[derive(Debug)]
pub struct FakeNewman {
    program: PathBuf,
    log: PathBuf,
}

impl FakeNewman {
    /// Write the script into `dir`
    ///
    /// `failing` lists collection base names (files `{name}.json`) for
    /// which the script exits with code 1.
    ///
    /// # Panics
    /// Panics if the script cannot be written.
    pub fn install(dir: &Path, failing: &[&str]) -> Self {
        let program = dir.join("fake-newman");
        let log = dir.join("fake-newman.log");

        let mut cases = String::new();
        for name in failing {
            cases.push_str(&format!("  */{name}.json|{name}.json) exit 1 ;;\n"));
        }

        let script = format!(
            "#!/bin/sh\n\
             if [ \"$1\" = \"--version\" ]; then echo 6.2.1; exit 0; fi\n\
             echo \"$*\" >> '{log}'\n\
             case \"$2\" in\n\
             {cases}\
             esac\n\
             exit 0\n",
            log = log.display(),
        );

        std::fs::write(&program, script).expect("write fake newman");
        let mut perms = std::fs::metadata(&program)
            .expect("stat fake newman")
            .permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&program, perms).expect("chmod fake newman");

        Self { program, log }
    }

    /// Path to pass as the runner program
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Argument lines of every `run` invocation, in order
    pub fn invocations(&self) -> Vec<String> {
        std::fs::read_to_string(&self.log)
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }
}
