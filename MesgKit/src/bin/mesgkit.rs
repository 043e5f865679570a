fn main() -> anyhow::Result<()> {
    mesgkit::cli::run_cli()
}
