use branchgen::cli;

fn main() -> anyhow::Result<()> {
    cli::init_logging();
    let command_line_interface = cli::CommandLineInterface::load();
    command_line_interface.run()
}
