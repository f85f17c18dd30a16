use anyhow::Result;

pub fn execute() -> Result<()> {
    println!("traywatch version {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
