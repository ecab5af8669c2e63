use anyhow::Result;
use miqat_protocol::Request;

use super::{expect_ok, send};

pub async fn start() -> Result<()> {
    expect_ok(send(Request::StartMicroTimer).await?)?;
    println!("⏱️  Two-minute timer started");
    Ok(())
}

pub async fn cancel() -> Result<()> {
    expect_ok(send(Request::CancelMicroTimer).await?)?;
    println!("Micro timer cancelled");
    Ok(())
}
