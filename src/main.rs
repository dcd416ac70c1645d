#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = exameval::run().await {
        eprintln!("exameval fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
