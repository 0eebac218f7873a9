//! CLI argument parsing with clap.

use clap::Parser;

use crate::error::EditError;

/// AI photo editing CLI - edit an image with a natural-language instruction.
#[derive(Parser, Debug)]
#[command(name = "photostudio", version, about)]
pub struct Cli {
    /// Path to the image to edit.
    pub image: String,

    /// Editing instruction (e.g., "add a wizard hat to the person").
    #[arg(conflicts_with = "prompt_file")]
    pub prompt: Option<String>,

    /// Path to a file containing the instruction text.
    #[arg(short = 'p', long, conflicts_with = "prompt")]
    pub prompt_file: Option<String>,

    /// Model name or short alias (defaults to the config file, then `nano-banana`).
    #[arg(short, long)]
    pub model: Option<String>,

    /// Convert the edited image to this format: jpeg, png, webp.
    #[arg(short, long)]
    pub format: Option<String>,

    /// Output file path (auto-generated if not specified).
    #[arg(short, long)]
    pub output: Option<String>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Resolve the instruction from either the positional argument or the file flag.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInputKind` if neither is given and `Io` if the prompt
    /// file cannot be read.
    pub fn resolve_prompt(&self) -> Result<String, EditError> {
        match (&self.prompt, &self.prompt_file) {
            (Some(text), _) => Ok(text.clone()),
            (None, Some(path)) => std::fs::read_to_string(path).map_err(|e| {
                EditError::Io(std::io::Error::new(
                    e.kind(),
                    format!("cannot read prompt file {path}: {e}"),
                ))
            }),
            (None, None) => Err(EditError::InvalidInputKind(
                "Provide an editing instruction or use -p/--prompt-file".to_string(),
            )),
        }
    }
}
