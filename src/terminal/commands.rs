//! Terminal command table.
//!
//! Input is split on whitespace; the first token, lower-cased, selects an
//! entry in [`COMMAND_TABLE`]. Anything that misses the table is free text
//! for the chat backend.

use super::navigation::Section;

/// Text cowsay uses when called without arguments.
pub const DEFAULT_COWSAY_TEXT: &str = "Moo! I love Peter.";

/// Names that are refused with a generic permission error.
pub const RESTRICTED_COMMANDS: &[&str] = &[
    "mkdir", "touch", "rm", "rmdir", "cp", "mv", "chmod", "chown", "nano", "vim",
];

pub const CONNECTION_LOST: &str = "Error: Connection to Neural Link lost. Backend offline.";
pub const SUDO_DENIED: &str = "Permission denied: You are not Peter Guan.";
pub const ALREADY_ROOT: &str = "Directory is already root.";

pub const HELP_TEXT: &str = "\
GNU bash, version 5.2.15(1)-release (peterguan-dev-os)
These shell commands are defined internally. Type 'help' to see this list.

  help     Display this help text
  clear    Clear the terminal screen
  whoami   Print information about the current user
  ls       List directory contents (projects & pages)
  cd       Change directory (navigate to pages)
  cmatrix  Run Matrix screensaver
  cowsay   Make the cow say something
  <text>   Send prompt to AI Assistant (LLM)";

pub const WHOAMI_TEXT: &str = "\
Peter Guan
Full Stack Developer & Quant Researcher
Location: Santa Monica, CA
Contact:  peter@peterguan.com

A developer bridging the gap between high-performance tech and quantitative
finance. Passionate about building 'Hardcore Tools' with modern aesthetics.";

pub const LS_TREE: &str = "\
.
├── about/
└── projects/
    ├── Veru
    ├── MyMD
    ├── Emotional_Support_Agent
    └── peterguan.dev";

/// Handler variant a command name maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Clear,
    Help,
    Whoami,
    Cowsay,
    Matrix,
    Restricted,
    Sudo,
    Ls,
    Cd,
}

/// Lookup table from command name to handler.
pub const COMMAND_TABLE: &[(&str, CommandKind)] = &[
    ("clear", CommandKind::Clear),
    ("help", CommandKind::Help),
    ("whoami", CommandKind::Whoami),
    ("cowsay", CommandKind::Cowsay),
    ("cmatrix", CommandKind::Matrix),
    ("sudo", CommandKind::Sudo),
    ("ls", CommandKind::Ls),
    ("cd", CommandKind::Cd),
];

/// Resolve a lower-cased command name.
pub fn lookup(name: &str) -> Option<CommandKind> {
    COMMAND_TABLE
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, kind)| *kind)
        .or_else(|| RESTRICTED_COMMANDS.contains(&name).then_some(CommandKind::Restricted))
}

/// Where a `cd` lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CdTarget {
    Section(Section),
    Root,
    Missing(String),
}

/// A parsed line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Clear,
    Help,
    Whoami,
    Cowsay(String),
    Matrix,
    Restricted(String),
    Sudo,
    Ls,
    Cd(CdTarget),
    FreeText(String),
}

impl Command {
    /// Parse a line. Returns `None` for blank input.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let mut tokens = input.split_whitespace();
        let name = tokens.next()?.to_lowercase();
        let args: Vec<&str> = tokens.collect();

        let Some(kind) = lookup(&name) else {
            return Some(Command::FreeText(input.to_string()));
        };

        let command = match kind {
            CommandKind::Clear => Command::Clear,
            CommandKind::Help => Command::Help,
            CommandKind::Whoami => Command::Whoami,
            CommandKind::Cowsay => {
                let text = if args.is_empty() {
                    DEFAULT_COWSAY_TEXT.to_string()
                } else {
                    args.join(" ")
                };
                Command::Cowsay(text)
            }
            CommandKind::Matrix => Command::Matrix,
            CommandKind::Restricted => Command::Restricted(name),
            CommandKind::Sudo => Command::Sudo,
            CommandKind::Ls => Command::Ls,
            CommandKind::Cd => Command::Cd(parse_cd_target(args.first().copied())),
        };
        Some(command)
    }

    /// Whether the raw input is echoed as a `user` message.
    pub fn echoes_input(&self) -> bool {
        !matches!(self, Command::Clear | Command::Matrix)
    }
}

fn parse_cd_target(arg: Option<&str>) -> CdTarget {
    let target = arg.map(str::to_lowercase).unwrap_or_else(|| "~".to_string());
    if let Some(section) = Section::from_target(&target) {
        return CdTarget::Section(section);
    }
    match target.as_str() {
        ".." | "~" | "/" | "." => CdTarget::Root,
        _ => CdTarget::Missing(target),
    }
}

pub fn permission_denied(command: &str) -> String {
    format!("bash: {}: permission denied", command)
}

pub fn no_such_directory(target: &str) -> String {
    format!("bash: cd: {}: No such file or directory", target)
}

/// Render `text` in a speech bubble above the cow. The dash rule is two
/// characters wider than the text.
pub fn cowsay(text: &str) -> String {
    let rule = "-".repeat(text.chars().count() + 2);
    format!(
        " {rule}\n< {text} >\n {rule}\n        \\   ^__^\n         \\  (oo)\\_______\n            (__)\\       )\\/\\\n                ||----w |\n                ||     ||"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blank() {
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("   \t "), None);
    }

    #[test]
    fn test_command_name_is_case_insensitive() {
        assert_eq!(Command::parse("  HeLp "), Some(Command::Help));
        assert_eq!(Command::parse("CLEAR"), Some(Command::Clear));
        assert_eq!(
            Command::parse("RM -rf /"),
            Some(Command::Restricted("rm".to_string()))
        );
    }

    #[test]
    fn test_unknown_input_is_free_text() {
        assert_eq!(
            Command::parse("  what does Peter build?  "),
            Some(Command::FreeText("what does Peter build?".to_string()))
        );
        assert_eq!(
            Command::parse("lsblk"),
            Some(Command::FreeText("lsblk".to_string()))
        );
    }

    #[test]
    fn test_cowsay_arguments() {
        assert_eq!(
            Command::parse("cowsay hello   there"),
            Some(Command::Cowsay("hello there".to_string()))
        );
        assert_eq!(
            Command::parse("cowsay"),
            Some(Command::Cowsay(DEFAULT_COWSAY_TEXT.to_string()))
        );
    }

    #[test]
    fn test_cowsay_rule_width() {
        let out = cowsay("hello");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], format!(" {}", "-".repeat(7)));
        assert_eq!(lines[1], "< hello >");
        assert_eq!(lines[2], lines[0]);
        assert_eq!(out, cowsay("hello"));
        assert!(lines.last().unwrap().ends_with("||     ||"));
    }

    #[test]
    fn test_cd_targets() {
        assert_eq!(
            Command::parse("cd Projects/"),
            Some(Command::Cd(CdTarget::Section(Section::Projects)))
        );
        assert_eq!(
            Command::parse("cd about"),
            Some(Command::Cd(CdTarget::Section(Section::About)))
        );
        assert_eq!(Command::parse("cd"), Some(Command::Cd(CdTarget::Root)));
        assert_eq!(Command::parse("cd .."), Some(Command::Cd(CdTarget::Root)));
        assert_eq!(
            Command::parse("cd Nowhere"),
            Some(Command::Cd(CdTarget::Missing("nowhere".to_string())))
        );
        assert_eq!(
            no_such_directory("nowhere"),
            "bash: cd: nowhere: No such file or directory"
        );
    }

    #[test]
    fn test_sudo_is_separate_from_restricted() {
        assert_eq!(lookup("sudo"), Some(CommandKind::Sudo));
        assert_eq!(lookup("chmod"), Some(CommandKind::Restricted));
        assert_eq!(permission_denied("rm"), "bash: rm: permission denied");
    }

    #[test]
    fn test_silent_commands() {
        assert!(!Command::Clear.echoes_input());
        assert!(!Command::Matrix.echoes_input());
        assert!(Command::Ls.echoes_input());
        assert!(Command::FreeText("hi".into()).echoes_input());
    }
}
