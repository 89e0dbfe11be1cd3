use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(version, about = "Loads a prebuilt payload module and hands control to its entry function")]
pub struct Cli {
    /// Path to the compiled payload module.
    #[arg(short, long)]
    pub payload: Option<PathBuf>,

    /// Exported symbol to transfer control to.
    #[arg(short, long)]
    pub entry: Option<String>,

    /// Read configuration from this file instead of the user config directory.
    #[arg(long)]
    pub config: Option<PathBuf>,
}
