use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::cli::LaunchArgs;

/// Everything needed to start one Rain benchmark JVM.
///
/// Arguments are passed through verbatim; nothing here checks that the
/// JVM flags or classpath make sense.
#[derive(Debug, Clone)]
pub(crate) struct LaunchConfig {
    pub(crate) java: PathBuf,
    pub(crate) min_heap: String,
    pub(crate) max_heap: String,
    pub(crate) gc_policy: String,
    pub(crate) jvm_args: Vec<String>,
    pub(crate) classpath: String,
    pub(crate) main_class: String,
    pub(crate) config_file: PathBuf,
    pub(crate) workdir: Option<PathBuf>,
}

impl From<&LaunchArgs> for LaunchConfig {
    fn from(args: &LaunchArgs) -> Self {
        Self {
            java: args.java.clone(),
            min_heap: args.min_heap.clone(),
            max_heap: args.max_heap.clone(),
            gc_policy: args.gc_policy.clone(),
            jvm_args: args.jvm_args.clone(),
            classpath: args.classpath.clone(),
            main_class: args.main_class.clone(),
            config_file: args.config_file.clone(),
            workdir: args.workdir.clone(),
        }
    }
}

impl LaunchConfig {
    /// `<min-heap> <max-heap> <gc> <jvm-args..> -cp <classpath> <main> <config>`
    pub(crate) fn args(&self) -> Vec<OsString> {
        let mut out: Vec<OsString> = vec![
            self.min_heap.clone().into(),
            self.max_heap.clone().into(),
            self.gc_policy.clone().into(),
        ];
        out.extend(self.jvm_args.iter().map(OsString::from));
        out.push("-cp".into());
        out.push(self.classpath.clone().into());
        out.push(self.main_class.clone().into());
        out.push(self.config_file.clone().into_os_string());
        out
    }

    pub(crate) fn command(&self) -> Command {
        let mut cmd = Command::new(&self.java);
        cmd.args(self.args()).stdin(Stdio::null());
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

/// Single-line rendering of a command for logs.
pub(crate) fn command_to_string(cmd: &Command) -> String {
    let prog = cmd.get_program().to_string_lossy();
    let mut out = String::new();
    out.push_str(&quote_for_display(&prog));
    for arg in cmd.get_args() {
        out.push(' ');
        out.push_str(&quote_for_display(&arg.to_string_lossy()));
    }
    out
}

fn quote_for_display(s: &str) -> String {
    // Not a shell-accurate escaper; just makes spaces/specials unambiguous in logs.
    let needs_quotes = s.is_empty()
        || s
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\\'));
    if !needs_quotes {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
