fn main() {
    if let Err(error) = notedeck_cli::run() {
        eprintln!("Error: {error:#}");
        std::process::exit(1);
    }
}
