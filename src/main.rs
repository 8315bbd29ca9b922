fn main() {
    ::env_logger::init();

    let cli = rulox::parse_args();
    ::std::process::exit(cli.run());
}
