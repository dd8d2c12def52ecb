use std::fs;
use std::path::Path;

use pdfstencil::sandbox;

pub fn run(file: &Path) -> Result<(), i32> {
    let source = fs::read_to_string(file).map_err(|e| {
        eprintln!("failed to read {}: {e}", file.display());
        1
    })?;

    match sandbox::validate(&source) {
        Ok(()) => {
            println!("{}: OK", file.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("{}: rejected: {e}", file.display());
            Err(1)
        }
    }
}
