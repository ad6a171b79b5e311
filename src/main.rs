use anyhow::Result;

fn main() -> Result<()> {
    records_tui::cli::run()
}
