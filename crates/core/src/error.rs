use log::error;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not start `{}` in shell `{}`: {}", .command, .shell, .original)]
    SubProcess {
        shell: String,
        command: String,
        original: std::io::Error,
    },

    #[error("Error {} {} file at `{}`: {}", .action, .file_description, .path, .original)]
    Yaml {
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    },

    #[error("IO error with {} file at path `{}`: {}", .file_description, .path, .original)]
    Io {
        file_description: String,
        path: String,
        original: std::io::Error,
    },

    #[error("Unable to take control of the terminal (raw mode unavailable): {}", .0)]
    TerminalSetup(std::io::Error),

    #[error("Unknown color name: \"{}\"", _0)]
    UnknownColorName(String),

    #[error("Unknown matcher `{}`, expected `builtin` or `skim`", _0)]
    UnknownMatcher(String),

    #[error("The rank worker stopped unexpectedly.")]
    RankWorkerGone,

    #[error("STDIO error: {}", .0)]
    Stdio(#[from] std::io::Error),
}

impl Error {
    pub fn yaml_error(
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    ) -> Self {
        Self::Yaml {
            action,
            file_description,
            path,
            original,
        }
    }

    pub fn io_error(file_description: String, path: String, original: std::io::Error) -> Self {
        Self::Io {
            file_description,
            path,
            original,
        }
    }

    pub fn terminal_setup(original: std::io::Error) -> Self {
        error!("Could not enter raw mode: {original}");
        Self::TerminalSetup(original)
    }
}
