//! Description of a single external command and its result.

use crate::errors::{StackError, StackResult};
use std::fmt;

/// An external program call, built up before it is handed to a runner.
///
/// `privileged` marks calls that need root. The runner decides whether that
/// means prefixing `sudo` or running as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub stdin: Option<String>,
    pub privileged: bool,
    /// Indices into `args` that are masked when displayed.
    secret_args: Vec<usize>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            stdin: None,
            privileged: false,
            secret_args: Vec::new(),
        }
    }

    /// Shorthand for a root-only command.
    pub fn privileged(program: impl Into<String>) -> Self {
        Self {
            privileged: true,
            ..Self::new(program)
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// An argument that is passed as-is but shown as `***`.
    pub fn secret_arg(mut self, arg: impl Into<String>) -> Self {
        self.secret_args.push(self.args.len());
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// True when this is `program` invoked with `args` as its leading arguments.
    pub fn matches(&self, program: &str, args: &[&str]) -> bool {
        self.program == program
            && self.args.len() >= args.len()
            && self.args.iter().zip(args).all(|(a, b)| a == b)
    }
}

/// Program and arguments, quoted so the line can be pasted into a shell.
/// Environment values, stdin and secret arguments are left out.
impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&shell_quote(&self.program))?;
        for (i, arg) in self.args.iter().enumerate() {
            if self.secret_args.contains(&i) {
                f.write_str(" ***")?;
            } else {
                write!(f, " {}", shell_quote(arg))?;
            }
        }
        Ok(())
    }
}

/// Quote `word` for a POSIX shell, leaving plain words untouched.
///
/// Words with a NUL byte cannot be passed to a program at all; they are
/// shown Rust-escaped instead.
pub fn shell_quote(word: &str) -> String {
    match shlex::try_quote(word) {
        Ok(quoted) => quoted.into_owned(),
        Err(_) => format!("{word:?}"),
    }
}

/// `--preserve-env=A,B` naming the variables of `invocation`, if it has any.
pub(crate) fn preserve_env_flag(invocation: &Invocation) -> Option<String> {
    if invocation.env.is_empty() {
        return None;
    }
    let keys: Vec<&str> = invocation.env.iter().map(|(k, _)| k.as_str()).collect();
    Some(format!("--preserve-env={}", keys.join(",")))
}

/// Exit status and captured streams of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success() -> Self {
        Self {
            code: Some(0),
            ..Default::default()
        }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    /// Turn a non-zero exit into [`StackError::CommandFailed`].
    pub fn check(self, invocation: &Invocation) -> StackResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(StackError::CommandFailed {
                command: invocation.to_string(),
                code: self.code,
                stderr: self.stderr,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_only_when_needed() {
        let inv = Invocation::privileged("systemctl")
            .args(["stop", "openstack-*"])
            .env("ADMIN_TOKEN", "secret");
        let shown = inv.to_string();
        assert!(shown.starts_with("systemctl stop "));
        assert_ne!(shown, "systemctl stop openstack-*");
        assert_eq!(shlex::split(&shown).unwrap(), ["systemctl", "stop", "openstack-*"]);
        assert!(!shown.contains("secret"));
    }

    #[test]
    fn shell_quote_survives_a_shell_round_trip() {
        for word in ["it's", "", "pa$s\"w", "line1\nline2", "a b\tc"] {
            let quoted = shell_quote(word);
            assert_eq!(shlex::split(&quoted).unwrap(), [word], "{quoted}");
        }
        assert_eq!(shell_quote("nova-volumes"), "nova-volumes");
        assert_eq!(shell_quote("/dev/loop0"), "/dev/loop0");
    }

    #[test]
    fn secret_args_are_masked_but_passed() {
        let inv = Invocation::privileged("openstack-config-set")
            .args(["/etc/keystone/keystone.conf", "DEFAULT", "admin_token"])
            .secret_arg("feedface");
        assert_eq!(inv.args[3], "feedface");
        assert_eq!(
            inv.to_string(),
            "openstack-config-set /etc/keystone/keystone.conf DEFAULT admin_token ***"
        );

        let err = CommandOutput::failure(1, "denied").check(&inv).unwrap_err();
        assert!(!err.to_string().contains("feedface"));
    }

    #[test]
    fn matches_compares_leading_args() {
        let inv = Invocation::new("systemctl").args(["is-active", "--quiet", "mysqld"]);
        assert!(inv.matches("systemctl", &["is-active"]));
        assert!(inv.matches("systemctl", &[]));
        assert!(!inv.matches("systemctl", &["start"]));
        assert!(!inv.matches("yum", &["is-active"]));
    }

    #[test]
    fn check_maps_failure_to_error() {
        let inv = Invocation::new("vgs").arg("nova-volumes");
        let err = CommandOutput::failure(5, "Volume group not found")
            .check(&inv)
            .unwrap_err();
        match err {
            StackError::CommandFailed {
                command,
                code,
                stderr,
            } => {
                assert_eq!(command, "vgs nova-volumes");
                assert_eq!(code, Some(5));
                assert_eq!(stderr, "Volume group not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(CommandOutput::success().check(&inv).is_ok());
    }
}
