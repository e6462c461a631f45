use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::commands::Cli;

const BIN_NAME: &str = "touchid";

pub fn handle_completion(shell: &str) -> Result<()> {
    let shell = parse_shell(shell)?;
    print!("{}", completion_script(shell)?);
    println!();
    println!("{}", setup_hint(shell));
    Ok(())
}

fn parse_shell(shell: &str) -> Result<Shell> {
    match shell.to_lowercase().as_str() {
        "bash" => Ok(Shell::Bash),
        "zsh" => Ok(Shell::Zsh),
        "fish" => Ok(Shell::Fish),
        _ => Err(anyhow::anyhow!(
            "Unsupported shell: {}. Supported shells: bash, zsh, fish",
            shell
        )),
    }
}

fn completion_script(shell: Shell) -> Result<String> {
    let mut buf = Vec::new();
    generate(shell, &mut Cli::command(), BIN_NAME, &mut buf);
    String::from_utf8(buf).context("Completion script is not valid UTF-8")
}

fn setup_hint(shell: Shell) -> String {
    let install = match shell {
        Shell::Fish => format!(
            "#   {BIN_NAME} completion fish > ~/.config/fish/completions/{BIN_NAME}.fish"
        ),
        Shell::Zsh => format!("#   echo 'eval \"$({BIN_NAME} completion zsh)\"' >> ~/.zshrc"),
        _ => format!("#   echo 'eval \"$({BIN_NAME} completion bash)\"' >> ~/.bashrc"),
    };
    format!(
        "# To enable completion:\n{install}\n#\n\
         # Then tab-complete e.g. `{BIN_NAME} token <public|private>`,\n\
         # `{BIN_NAME} config runtime` or `{BIN_NAME} enable --pin`."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_shell() {
        assert!(handle_completion("powershell-classic").is_err());
    }

    #[test]
    fn test_bash_script_offers_token_kinds() {
        let script = completion_script(Shell::Bash).unwrap();
        assert!(script.contains(BIN_NAME));
        assert!(script.contains("token"));
        assert!(script.contains("public"));
        assert!(script.contains("private"));
    }

    #[test]
    fn test_setup_hint_per_shell() {
        assert!(setup_hint(Shell::Fish).contains("completions/touchid.fish"));
        assert!(setup_hint(Shell::Zsh).contains("~/.zshrc"));
        assert!(setup_hint(Shell::Bash).contains("token <public|private>"));
    }
}
