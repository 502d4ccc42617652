use super::Parser;

#[derive(Parser, Debug)]
#[command(name = "bullpen", about = "Group membership and messaging core")]
pub struct Cli {
    /// Path to a TOML settings file.
    #[arg(long)]
    pub settings: Option<String>,
}
