#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = academy_rust::run().await {
        eprintln!("academy-rust fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
