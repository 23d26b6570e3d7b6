use clap::Subcommand;

use catnap_core::RawConfig;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the resolved configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let settings = RawConfig::load_or_default().resolve();
            print!("{}", toml::to_string_pretty(&settings)?);
        }
        ConfigAction::Path => {
            println!("{}", RawConfig::path()?.display());
        }
    }
    Ok(())
}
