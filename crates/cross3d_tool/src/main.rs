use clap::Parser;
use cross3d_utils::{ok, AnyResult};

fn main() -> AnyResult {
    let cli = cross3d_tool::Cli::parse_from(wild::args());

    pretty_env_logger::formatted_builder()
        .format_indent(None)
        .format_timestamp(None)
        .filter_level(cli.log_level())
        .init();

    cross3d_tool::run(cli)?;
    ok()
}
