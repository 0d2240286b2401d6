use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Normalize the stored preference, stamp every page, render pseudocode.
    Apply,
    /// Flip the current theme (light <-> dark), persist it, restamp pages.
    Toggle,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProgressMode {
    /// Enable progress UI when stderr is a TTY.
    Auto,
    /// Always enable progress UI (even when piped).
    Always,
    /// Never show progress UI.
    Never,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Rendered HTML pages to patch: files and/or directories (directories
    /// are scanned recursively for `*.html`).
    #[arg(long, required = true, num_args = 1..)]
    pub pages: Vec<PathBuf>,

    /// JSON state file holding the persisted theme preference under the
    /// `theme` key. Created on first write; a missing file reads as "no
    /// saved preference".
    #[arg(long)]
    pub state: PathBuf,

    /// What to do: `apply` or `toggle`.
    #[arg(long, value_enum, default_value = "apply")]
    pub mode: Mode,

    /// Theme applied when the stored preference is missing, legacy `auto`,
    /// or unrecognized.
    #[arg(long, value_enum, default_value = "light")]
    pub default_theme: Theme,

    /// Indent size passed to the pseudocode renderer (one nesting level).
    #[arg(long, default_value = "1.5em")]
    pub indent_size: String,

    /// Leave `pre.pseudocode` blocks untouched.
    #[arg(long)]
    pub skip_pseudocode: bool,

    /// Write patched copies into this directory instead of rewriting pages
    /// in place.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Progress display: `auto`, `always`, or `never`.
    #[arg(long, value_enum, default_value = "auto")]
    pub progress: ProgressMode,
}
