use std::process;

fn main() {
    if let Err(err) = assemblywatch::app::run() {
        eprintln!("fatal: {err:#}");
        process::exit(1);
    }
}
