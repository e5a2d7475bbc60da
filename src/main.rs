use teamforge::cli;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    std::process::exit(cli::run_with_args(&args));
}
