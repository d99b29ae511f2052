//! The four lifecycle actions.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Install,
    Start,
    Stop,
    Erase,
}

pub const ALL_ACTIONS: &[Action] = &[Action::Start, Action::Stop, Action::Install, Action::Erase];

/// An action word that isn't one of the four.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown action: {0}")]
pub struct UnknownAction(pub String);

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Install => "install",
            Action::Start => "start",
            Action::Stop => "stop",
            Action::Erase => "erase",
        }
    }

    /// Programs that must be on `PATH` before the action runs for real.
    ///
    /// Tools shipped by the installed packages are left out of `install` and
    /// `erase`: the first puts them there, the second copes without them.
    pub fn required_programs(&self) -> &'static [&'static str] {
        match self {
            Action::Install => &["systemctl", "yum", "truncate"],
            Action::Start => &["systemctl", "losetup", "vgs", "vgcreate", "vgchange"],
            Action::Stop => &["systemctl"],
            Action::Erase => &["systemctl", "yum", "losetup", "find", "rm"],
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_ACTIONS
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}
