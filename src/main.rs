fn main() {
    if let Err(err) = csv_analyst::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
