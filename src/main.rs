fn main() {
    if let Err(e) = gue_gas_rs::adapters::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
