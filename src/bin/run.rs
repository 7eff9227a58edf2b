//! Runs the `logistic` binary that sits next to this executable and reprints
//! its output.

use std::path::PathBuf;
use std::process::{Command, ExitCode};

fn main_binary() -> std::io::Result<PathBuf> {
    let current = std::env::current_exe()?;
    Ok(current.with_file_name(format!("logistic{}", std::env::consts::EXE_SUFFIX)))
}

fn main() -> ExitCode {
    let output = main_binary().and_then(|binary| Command::new(binary).output());

    match output {
        Ok(output) => {
            println!("{}", String::from_utf8_lossy(&output.stdout));
            if !output.stderr.is_empty() {
                println!("Errors: {}", String::from_utf8_lossy(&output.stderr));
            }

            let code = output.status.code().unwrap_or(1);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
        Err(err) => {
            println!("Error running script: {err}");
            ExitCode::FAILURE
        }
    }
}
