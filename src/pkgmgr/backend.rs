//! Native command templates per package-manager backend.
//!
//! Each [`Backend`] knows the verbs and flag spellings of one package
//! manager. Builders return a fresh [`NativeCommand`] per call; nothing is
//! cached. Mutating operations are prefixed with `sudo`, search and info
//! are not.

use super::ExecutionOptions;
use crate::distro::Family;

/// A shell-invocable command plus a one-line explanation for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeCommand {
    pub command: String,
    pub explanation: String,
}

impl NativeCommand {
    fn new(command: String, explanation: impl Into<String>) -> Self {
        Self {
            command,
            explanation: explanation.into(),
        }
    }
}

/// One concrete package-manager command set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// APT - Debian/Ubuntu family
    Apt,
    /// DNF - Fedora/RHEL family
    Dnf,
    /// Pacman - Arch Linux family
    Pacman,
    /// apk - Alpine Linux
    Apk,
}

impl Backend {
    /// Select the backend for a distribution family.
    ///
    /// Suse is classified but has no backend here, so it resolves to
    /// `None` just like unknown families.
    pub fn for_family(family: Family) -> Option<Self> {
        match family {
            Family::Debian => Some(Self::Apt),
            Family::Rhel => Some(Self::Dnf),
            Family::Arch => Some(Self::Pacman),
            Family::Alpine => Some(Self::Apk),
            Family::Suse | Family::Other => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Apt => "apt",
            Self::Dnf => "dnf",
            Self::Pacman => "pacman",
            Self::Apk => "apk",
        }
    }

    /// The "skip the package manager's own prompt" flag, where one exists.
    ///
    /// apk has no confirmation prompt to suppress, so assume-yes never
    /// changes apk commands.
    fn assume_yes_flag(&self) -> Option<&'static str> {
        match self {
            Self::Apt | Self::Dnf => Some("-y"),
            Self::Pacman => Some("--noconfirm"),
            Self::Apk => None,
        }
    }

    pub fn update_all(&self, opts: ExecutionOptions) -> NativeCommand {
        let explanation = format!("Update all packages with {}", self.display_name());
        let command = match self {
            Self::Apt => {
                if opts.assume_yes {
                    "sudo apt update && sudo apt upgrade -y".to_string()
                } else {
                    "sudo apt update && sudo apt upgrade".to_string()
                }
            }
            Self::Dnf => {
                if opts.assume_yes {
                    "sudo dnf upgrade -y".to_string()
                } else {
                    "sudo dnf upgrade".to_string()
                }
            }
            Self::Pacman => {
                if opts.assume_yes {
                    "sudo pacman -Syu --noconfirm".to_string()
                } else {
                    "sudo pacman -Syu".to_string()
                }
            }
            Self::Apk => "sudo apk update && sudo apk upgrade".to_string(),
        };
        NativeCommand::new(command, explanation)
    }

    pub fn install(&self, pkgs: &[String], opts: ExecutionOptions) -> NativeCommand {
        let verb = match self {
            Self::Apt => "install",
            Self::Dnf => "install",
            Self::Pacman => "-S",
            Self::Apk => "add",
        };
        NativeCommand::new(
            self.mutating_command(verb, pkgs, opts),
            format!("Install packages with {}", self.display_name()),
        )
    }

    pub fn remove(&self, pkgs: &[String], opts: ExecutionOptions) -> NativeCommand {
        let verb = match self {
            Self::Apt => "remove",
            Self::Dnf => "remove",
            Self::Pacman => "-R",
            Self::Apk => "del",
        };
        NativeCommand::new(
            self.mutating_command(verb, pkgs, opts),
            format!("Remove packages with {}", self.display_name()),
        )
    }

    pub fn search(&self, query: &str) -> NativeCommand {
        let command = match self {
            Self::Apt => format!("apt search {query}"),
            Self::Dnf => format!("dnf search {query}"),
            Self::Pacman => format!("pacman -Ss {query}"),
            Self::Apk => format!("apk search {query}"),
        };
        NativeCommand::new(
            command,
            format!("Search for packages with {}", self.display_name()),
        )
    }

    pub fn info(&self, name: &str) -> NativeCommand {
        let command = match self {
            Self::Apt => format!("apt show {name}"),
            Self::Dnf => format!("dnf info {name}"),
            Self::Pacman => format!("pacman -Si {name}"),
            Self::Apk => format!("apk info -a {name}"),
        };
        NativeCommand::new(
            command,
            format!("Show package details with {}", self.display_name()),
        )
    }

    /// `sudo <mgr> <verb> [yes-flag] <pkgs...>`
    fn mutating_command(&self, verb: &str, pkgs: &[String], opts: ExecutionOptions) -> String {
        let mut parts: Vec<&str> = vec!["sudo", self.display_name(), verb];
        if opts.assume_yes
            && let Some(flag) = self.assume_yes_flag()
        {
            parts.push(flag);
        }
        parts.extend(pkgs.iter().map(String::as_str));
        parts.join(" ")
    }
}
