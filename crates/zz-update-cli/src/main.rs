fn main() -> anyhow::Result<()> {
    zz_update_cli::run(std::env::args())
}
