use anyhow::{anyhow, Context, Result};
use glob::glob;
use std::result::Result as StdResult;

use std::fs;
use std::path::Path;
use std::process::Command;

const INTERPRETER: &str = "../target/release/smi";

fn main() -> Result<()> {
    compile_smi().context("compiling interpreter")?;

    let scripts: Vec<_> = glob("tests/*.sm")?.collect::<StdResult<_, _>>()?;
    let mut failed = 0;
    for script in &scripts {
        let expected_path = sibling(script, "out")?;
        let expected_output = fs::read_to_string(&expected_path)
            .context(format!("loading expected output: {}", expected_path))?;
        // a script with an .err file has to fail with exactly that message
        let expected_error = fs::read_to_string(sibling(script, "err")?).ok();
        let result = Command::new(INTERPRETER)
            .arg(script)
            .env_remove("RUST_LOG")
            .output()
            .context(format!("running script {}", script.display()))?;
        let output = String::from_utf8(result.stdout)?;
        let error = String::from_utf8(result.stderr)?;
        let status_ok = match &expected_error {
            Some(expected) => !result.status.success() && &error == expected,
            None => result.status.success(),
        };
        if output == expected_output && status_ok {
            println!("{}: passed", script.display());
        } else {
            failed += 1;
            println!(
                "{}: failed ({})\nactual output:\n{}\nactual error:\n{}",
                script.display(),
                result.status,
                output,
                error
            );
        }
    }

    println!("{} of {} scripts passed", scripts.len() - failed, scripts.len());
    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn sibling(script: &Path, extension: &str) -> Result<String> {
    let stem = script
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("odd script name: {}", script.display()))?;
    Ok(format!("tests/{}.{}", stem, extension))
}

fn compile_smi() -> Result<()> {
    let st = Command::new("cargo")
        .args(["build", "--release", "--features", "dev"])
        .current_dir("../interpreter")
        .status()?;
    if st.success() {
        Ok(())
    } else {
        Err(anyhow!("compiling the interpreter failed"))
    }
}
