use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    chown_audit_cli::main_entry().await
}
