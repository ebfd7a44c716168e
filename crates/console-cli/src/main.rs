mod cli;
mod logging;
mod tui;

fn main() -> anyhow::Result<()> {
    // Must be read before the runtime or the terminal spawn any thread.
    let utc_offset = console_core::model::local_offset();
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(cli::run(utc_offset))
}
