fn main() {
    if let Err(err) = bitlane::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
