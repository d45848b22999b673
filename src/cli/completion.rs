//! Shell completion generation for content-export
//!
//! Generates completion scripts for bash, zsh and fish. Values for
//! `--type` and `--language` are completed dynamically by asking the
//! binary itself for the environment's codenames.

use clap::CommandFactory;
use clap_complete::{Shell, generate};

use crate::cli::CliArgs;
use crate::error::{ConfigError, ExportError, Result};

const BIN_NAME: &str = "content-export";

/// Generate shell completion script
///
/// # Arguments
/// * `shell_name` - Shell type (bash, zsh, fish)
///
/// # Returns
/// * `Result<()>` - Success or error
pub fn generate_completion(shell_name: &str) -> Result<()> {
    let shell = parse_shell(shell_name)?;
    print!("{}", completion_script(shell));
    Ok(())
}

/// Parse shell name string to Shell enum
fn parse_shell(shell_name: &str) -> Result<Shell> {
    match shell_name.to_lowercase().as_str() {
        "bash" => Ok(Shell::Bash),
        "zsh" => Ok(Shell::Zsh),
        "fish" => Ok(Shell::Fish),
        _ => Err(ExportError::Config(ConfigError::Generic(format!(
            "Unsupported shell: {shell_name}. Supported shells: bash, zsh, fish"
        )))),
    }
}

/// clap's generated script followed by the dynamic codename completion
fn completion_script(shell: Shell) -> String {
    let mut cmd = CliArgs::command();
    let mut buffer = Vec::new();
    generate(shell, &mut cmd, BIN_NAME, &mut buffer);

    let basic = String::from_utf8_lossy(&buffer);
    let dynamic = match shell {
        Shell::Fish => FISH_CODENAMES,
        Shell::Zsh => ZSH_CODENAMES,
        _ => BASH_CODENAMES,
    };
    format!("{basic}\n{dynamic}")
}

const BASH_CODENAMES: &str = r#"
# Codenames are read from the environment configured for content-export
_content_export_codenames() {
    content-export "$1" --json --no-color -q 2>/dev/null \
        | grep -o '"codename": *"[^"]*"' | sed 's/.*"\([^"]*\)"$/\1/'
}

_content_export_enhanced() {
    local cur prev words cword
    _init_completion || return

    case "$prev" in
        -t|--type)
            COMPREPLY=($(compgen -W "$(_content_export_codenames types)" -- "$cur"))
            return 0
            ;;
        -l|--language)
            COMPREPLY=($(compgen -W "$(_content_export_codenames languages)" -- "$cur"))
            return 0
            ;;
    esac

    _content-export "$@"
}

complete -F _content_export_enhanced content-export
"#;

const ZSH_CODENAMES: &str = r#"
# Codenames are read from the environment configured for content-export
_content_export_codenames() {
    local -a codenames
    codenames=(${(f)"$(content-export "$1" --json --no-color -q 2>/dev/null \
        | grep -o '"codename": *"[^"]*"' | sed 's/.*"\([^"]*\)"$/\1/')"})
    _describe "$1" codenames
}

_content_export_enhanced() {
    case ${words[CURRENT-1]} in
        -t|--type)
            _content_export_codenames types
            return 0
            ;;
        -l|--language)
            _content_export_codenames languages
            return 0
            ;;
    esac

    _content-export "$@"
}

compdef _content_export_enhanced content-export
"#;

const FISH_CODENAMES: &str = r#"
# Codenames are read from the environment configured for content-export
function __content_export_codenames
    content-export $argv[1] --json --no-color -q 2>/dev/null \
        | string match -r '"codename": *"[^"]*"' | string replace -r '.*"([^"]*)"$' '$1'
end

complete -c content-export -n "__fish_seen_subcommand_from export" -s t -l type -f -a "(__content_export_codenames types)" -d "Content type codename"
complete -c content-export -n "__fish_seen_subcommand_from export" -s l -l language -f -a "(__content_export_codenames languages)" -d "Language codename"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shell() {
        assert!(matches!(parse_shell("bash"), Ok(Shell::Bash)));
        assert!(matches!(parse_shell("zsh"), Ok(Shell::Zsh)));
        assert!(matches!(parse_shell("fish"), Ok(Shell::Fish)));
        assert!(parse_shell("invalid").is_err());
    }

    #[test]
    fn test_parse_shell_case_insensitive() {
        assert!(matches!(parse_shell("BASH"), Ok(Shell::Bash)));
        assert!(matches!(parse_shell("Zsh"), Ok(Shell::Zsh)));
        assert!(matches!(parse_shell("FiSh"), Ok(Shell::Fish)));
    }

    #[test]
    fn test_scripts_complete_codenames() {
        let bash = completion_script(Shell::Bash);
        assert!(bash.contains("complete -F _content_export_enhanced content-export"));
        assert!(bash.contains("export"));

        let fish = completion_script(Shell::Fish);
        assert!(fish.contains("__content_export_codenames languages"));
    }
}
