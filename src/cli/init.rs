use pylabs::Config;
use tracing::instrument;

use crate::cli::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Init {
    /// The suffix every new plain file must carry
    #[arg(long, value_name = "SUFFIX")]
    suffix: Option<String>,
}

impl Init {
    #[instrument]
    pub async fn run(self, root: &std::path::Path) -> anyhow::Result<()> {
        let config_path = root.join(Config::FILE_NAME);
        if tokio::fs::try_exists(&config_path).await? {
            anyhow::bail!(
                "Workspace already initialized (found {})",
                config_path.display()
            );
        }

        tokio::fs::create_dir_all(root)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", root.display()))?;

        let mut config = Config::default();
        if let Some(suffix) = self.suffix {
            config.set_file_suffix(suffix);
        }
        config
            .save(&config_path)
            .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", Config::FILE_NAME))?;

        println!(
            "{}",
            format!("Initialized workspace in {}", root.display()).success()
        );
        println!("  Created: {}", config_path.display());
        println!();
        println!("Next steps:");
        println!("  pylabs new <name>  # Create your first project");
        Ok(())
    }
}
