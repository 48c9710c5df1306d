use qportal_core::PortalConfig;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = PortalConfig::from_env()?;

    let (_state, router) = qportal_api::setup::initialize_app(config.clone()).await?;

    qportal_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
