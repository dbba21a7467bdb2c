//! uiviz - hide and restore the macOS menu bar and Dock from the command line.

fn main() {
    uiviz_lib::logging::init();

    if let Err(err) = uiviz_lib::cli::run() {
        eprintln!("uiviz: {err}");
        std::process::exit(1);
    }
}
