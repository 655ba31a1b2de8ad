use clap::Parser;
use rollnet::app::{AppError, RollnetApp};

fn main() {
    env_logger::init();
    log::debug!("cwd: {:?}", std::env::current_dir());
    let args = RollnetApp::parse();
    match run_rollnet(args) {
        Ok(_) => {}
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    }
}

fn run_rollnet(args: RollnetApp) -> Result<(), AppError> {
    log::info!("starting app at {}", chrono::Local::now().to_rfc3339());
    let config = args.load_configuration()?;
    args.op.run(&args.dataset, &config)
}
