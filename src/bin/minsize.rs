/// Print every image in a directory that is smaller than a megapixel threshold
use clap::Parser;
use log::error;
use std::path::PathBuf;

use wallcrop::cli::existing_dir;
use wallcrop::io::decoder::ImageDecoder;
use wallcrop::io::scan;

#[derive(Parser, Debug)]
#[command(name = "wallcrop-minsize", version, about = "List images below a minimum size")]
struct Args {
    /// Directory containing the images to check
    #[arg(value_parser = existing_dir)]
    source: PathBuf,

    /// Minimum acceptable size, in megapixels
    megapixels: f64,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let files = match scan::collect_files(&args.source) {
        Ok(files) => files,
        Err(e) => {
            error!("❌ {}", e);
            std::process::exit(1);
        }
    };

    for path in scan::smaller_than(&files, &mut ImageDecoder, args.megapixels) {
        println!("{}", path.display());
    }
}
