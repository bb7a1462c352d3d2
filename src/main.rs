use sitelog::cli::{build_cli, parse_options, run};

fn main() -> anyhow::Result<()> {
    let matches = build_cli().get_matches();
    let options = match parse_options(&matches) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Invalid arguments: {}", e);
            std::process::exit(2);
        }
    };

    run(options)
}
