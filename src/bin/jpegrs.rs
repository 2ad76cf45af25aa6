//! Command-line front end: decode one or more JPEG files to sibling `.bmp`
//! files. `-v` raises logging verbosity via `env_logger`.
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use log::info;

use jpegrs::{write_bmp, Decoder};

fn sibling_bmp_path(input: &Path) -> PathBuf {
    input.with_extension("bmp")
}

fn decode_one(path: &Path) -> Result<(), String> {
    let (info, pixels) = Decoder::decode_file(path).map_err(|e| format!("{}: {}", path.display(), e))?;

    let out_path = sibling_bmp_path(path);
    let file = File::create(&out_path).map_err(|e| format!("{}: {}", out_path.display(), e))?;
    let mut writer = BufWriter::new(file);
    write_bmp(&mut writer, info.width, info.height, &pixels)
        .map_err(|e| format!("{}: {}", out_path.display(), e))?;

    info!(
        "{} -> {} ({}x{}, {})",
        path.display(),
        out_path.display(),
        info.width,
        info.height,
        if info.is_progressive { "progressive" } else { "baseline" }
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        eprintln!("usage: jpegrs <path>...");
        return ExitCode::FAILURE;
    }

    for path in &paths {
        if let Err(message) = decode_one(Path::new(path)) {
            eprintln!("error: {}", message);
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
