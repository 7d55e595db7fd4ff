//! Shell environment export generation for package environments.
//!
//! Exports are collected into an explicit [`Context`] value and serialized to
//! a caller-supplied writer; nothing here reads or mutates process-wide
//! state. The caller hands in a lookup for current variable values so the
//! emitted `deactivate` shell function can restore what it replaces.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Variable naming the active environment root.
pub const ENV_VAR: &str = "TREEPACK_ENV";
/// Colon-joined list of package search roots.
pub const PATH_VAR: &str = "TREEPACK_PATH";

/// Shell dialect the exports are rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Bash,
}

impl Shell {
    /// Detect the dialect from a `$SHELL`-style value. Unset or empty assumes
    /// bash; anything other than bash is rejected rather than guessed at.
    pub fn from_shell_var(value: Option<&OsStr>) -> io::Result<Self> {
        let value = match value {
            Some(v) if !v.is_empty() => v,
            _ => return Ok(Shell::Bash),
        };
        let name = Path::new(value)
            .file_name()
            .unwrap_or(value)
            .to_string_lossy();
        match name.as_ref() {
            "bash" => Ok(Shell::Bash),
            other => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("shell, {other}, is not yet supported"),
            )),
        }
    }
}

/// An ordered set of environment exports plus package search roots, rendered
/// as shell statements the caller evals.
#[derive(Debug)]
pub struct Context {
    shell: Shell,
    exports: BTreeMap<String, String>,
    search_paths: Vec<PathBuf>,
}

impl Context {
    pub fn new(shell: Shell) -> Self {
        Self {
            shell,
            exports: BTreeMap::new(),
            search_paths: Vec::new(),
        }
    }

    pub fn export(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.exports.insert(name.into(), value.into());
    }

    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        self.search_paths.push(path.into());
    }

    /// Writes a `deactivate` function that restores the previous values,
    /// followed by the export statements. `current` supplies the values the
    /// variables hold right now, before activation.
    pub fn write_all<W: Write>(
        &self,
        current: impl Fn(&str) -> Option<String>,
        out: &mut W,
    ) -> io::Result<()> {
        match self.shell {
            Shell::Bash => self.write_bash(current, out),
        }
    }

    fn write_bash<W: Write>(
        &self,
        current: impl Fn(&str) -> Option<String>,
        out: &mut W,
    ) -> io::Result<()> {
        write!(out, "deactivate () {{ echo deactivating; ")?;
        for name in self.exports.keys().map(String::as_str).chain([PATH_VAR]) {
            write!(out, "unset {name}; ")?;
            if let Some(old) = current(name) {
                write!(out, "export {name}={old}; ")?;
            }
        }
        writeln!(out, "unset -f deactivate; }}")?;

        writeln!(out, "echo exporting")?;
        for (name, value) in &self.exports {
            writeln!(out, "export {name}={value}")?;
        }
        let joined = self
            .search_paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(":");
        writeln!(out, "export {PATH_VAR}={joined}")?;
        Ok(())
    }
}

/// The wrapper function users `eval` into their profile so that activation
/// output is applied to the calling shell instead of a child process.
pub fn shell_function(shell: Shell, bin: &Path) -> io::Result<String> {
    match shell {
        Shell::Bash => Ok(format!(
            "pkgenv () {{ IFS=$'\\n'; for x in $({} activate $@); do eval $x; done ; unset IFS; }}\n",
            bin.display()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_bash_from_full_path() {
        let shell = Shell::from_shell_var(Some(OsStr::new("/bin/bash"))).unwrap();
        assert_eq!(shell, Shell::Bash);
        assert_eq!(Shell::from_shell_var(None).unwrap(), Shell::Bash);
    }

    #[test]
    fn rejects_unsupported_shells() {
        let err = Shell::from_shell_var(Some(OsStr::new("/usr/bin/fish"))).unwrap_err();
        assert!(err.to_string().contains("fish"));
    }

    #[test]
    fn bash_emission_exports_and_restores() {
        let mut ctx = Context::new(Shell::Bash);
        ctx.export("PATH", "/proj/bin:/old");
        ctx.export(ENV_VAR, "/proj/venv");
        ctx.add_search_path("/proj");
        ctx.add_search_path("/proj/venv");

        let mut out = Vec::new();
        ctx.write_all(
            |name| match name {
                "PATH" => Some("/old".to_string()),
                _ => None,
            },
            &mut out,
        )
        .unwrap();
        let script = String::from_utf8(out).unwrap();

        assert!(script.contains("deactivate () {"));
        assert!(script.contains("unset PATH; export PATH=/old; "));
        assert!(script.contains("unset TREEPACK_ENV; "));
        assert!(script.contains("export TREEPACK_ENV=/proj/venv\n"));
        assert!(script.contains("export TREEPACK_PATH=/proj:/proj/venv\n"));
        assert!(script.contains("unset -f deactivate; }"));
    }
}
