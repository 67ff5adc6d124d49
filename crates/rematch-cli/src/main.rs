//! Command line entrypoint for `rematch`.

fn main() -> eyre::Result<()> {
    rematch_cli::cli::run()
}
