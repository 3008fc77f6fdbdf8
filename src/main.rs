fn main() -> anyhow::Result<()> {
    grove::cli::run_cli()
}
