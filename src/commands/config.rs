use anyhow::Result;
use recall_core::config::RecallConfig;

pub fn path() -> Result<()> {
    println!("{}", RecallConfig::config_path()?.display());
    Ok(())
}

pub fn init(force: bool) -> Result<()> {
    let path = RecallConfig::config_path()?;

    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}\n\
            Use --force to overwrite it.",
            path.display()
        );
    }

    RecallConfig::create_default_config(&path)?;
    println!("Wrote {}", path.display());

    Ok(())
}
