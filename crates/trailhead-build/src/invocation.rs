//! Compiler command-line construction
use crate::config::Toolchain;
use crate::targets::CompileTarget;
use std::ffi::OsString;
use std::process::Command;

/// A single compiler call: executable plus its arguments, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileInvocation {
    executable: String,
    args: Vec<OsString>,
}

impl CompileInvocation {
    /// Assemble the invocation for `target`
    ///
    /// Argument order is fixed: standard, optimization, warnings, include
    /// paths, source, `-o output`, library paths, libraries, static runtime
    /// flags. Libraries must come after the source that references them.
    pub fn build(target: &CompileTarget, toolchain: &Toolchain) -> Self {
        let mut args: Vec<OsString> = Vec::new();

        args.push(format!("-std={}", toolchain.standard).into());
        args.push(format!("-O{}", toolchain.optimization).into());
        args.extend(toolchain.warnings.iter().map(OsString::from));

        for dir in &toolchain.include_dirs {
            args.push(prefixed("-I", dir.as_os_str()));
        }

        args.push(target.source.clone().into_os_string());
        args.push("-o".into());
        args.push(target.output.clone().into_os_string());

        for dir in &toolchain.lib_dirs {
            args.push(prefixed("-L", dir.as_os_str()));
        }
        for lib in &toolchain.link_libs {
            args.push(format!("-l{}", lib).into());
        }
        args.extend(toolchain.static_runtime.iter().map(OsString::from));

        Self {
            executable: toolchain.compiler.clone(),
            args,
        }
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// A `Command` ready to spawn; the caller sets directory and stdio
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.executable);
        command.args(&self.args);
        command
    }

    /// Space-joined command line for display
    pub fn command_line(&self) -> String {
        std::iter::once(self.executable.clone())
            .chain(self.args.iter().map(|arg| arg.to_string_lossy().into_owned()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn prefixed(flag: &str, value: &std::ffi::OsStr) -> OsString {
    let mut arg = OsString::from(flag);
    arg.push(value);
    arg
}
