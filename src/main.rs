use logistic::{config::Config, logging, pipeline};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(err) = logging::init() {
        eprintln!("{err}");
    }

    let config = Config::load_or_default(&Config::default_path())?;

    let (report, _classifier) = pipeline::run(&config)?;
    print!("{report}");

    Ok(())
}
