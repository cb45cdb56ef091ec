fn main() -> fakeram::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    fakeram::cli::run()
}
