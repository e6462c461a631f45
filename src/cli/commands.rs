use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::endpoints::TokenKind;
use crate::domain::{Platform, RuntimeMode};

#[derive(Parser)]
#[command(name = "touchid")]
#[command(about = "Touch ID / platform credential manager for the wallet", long_about = None)]
#[command(version)]
pub struct Cli {
    #[arg(short, long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Show availability and enablement")]
    Status,

    #[command(about = "Enable Touch ID for this device")]
    Enable {
        #[arg(long, help = "PIN to remember (hybrid runtime only)")]
        pin: Option<String>,
    },

    #[command(about = "Disable Touch ID for this device")]
    Disable,

    #[command(about = "Obtain a token with a Touch ID assertion")]
    Token {
        #[arg(value_enum, help = "Token kind")]
        kind: TokenArg,
    },

    #[command(about = "Run a bare biometric check")]
    Verify,

    #[command(about = "Manage configuration")]
    Config {
        #[command(subcommand)]
        subcommand: Option<ConfigCommands>,
    },

    #[command(about = "Generate shell completion script")]
    Completion {
        #[arg(help = "Shell type (bash, zsh, fish)")]
        shell: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    #[command(about = "Set the credential server root URL")]
    UrlRoot {
        #[arg(help = "Root URL, e.g. https://wallet.example/")]
        url: String,
    },

    #[command(about = "Set the runtime mode")]
    Runtime {
        #[arg(value_parser = parse_runtime, help = "web or hybrid")]
        mode: RuntimeMode,
    },

    #[command(about = "Set the platform")]
    Platform {
        #[arg(value_parser = parse_platform, help = "ios, android or other")]
        platform: Platform,
    },

    #[command(about = "Set the web origin used in client data")]
    Origin {
        #[arg(help = "Origin, or 'auto' to derive it from the root URL")]
        origin: String,
    },

    #[command(about = "Set the request timeout")]
    Timeout {
        #[arg(help = "Timeout in seconds")]
        secs: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TokenArg {
    Public,
    Private,
}

impl From<TokenArg> for TokenKind {
    fn from(arg: TokenArg) -> Self {
        match arg {
            TokenArg::Public => TokenKind::Public,
            TokenArg::Private => TokenKind::Private,
        }
    }
}

fn parse_runtime(s: &str) -> Result<RuntimeMode, String> {
    s.parse()
}

fn parse_platform(s: &str) -> Result<Platform, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_token_kind() {
        let cli = Cli::try_parse_from(["touchid", "token", "private"]).unwrap();
        match cli.command {
            Commands::Token { kind } => {
                assert_eq!(TokenKind::from(kind), TokenKind::Private)
            }
            _ => panic!("expected token command"),
        }
    }

    #[test]
    fn test_parse_config_runtime() {
        let cli = Cli::try_parse_from(["touchid", "-v", "config", "runtime", "hybrid"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Config {
                subcommand: Some(ConfigCommands::Runtime { mode }),
            } => assert_eq!(mode, RuntimeMode::Hybrid),
            _ => panic!("expected config runtime command"),
        }
    }

    #[test]
    fn test_rejects_unknown_platform() {
        assert!(Cli::try_parse_from(["touchid", "config", "platform", "symbian"]).is_err());
    }
}
