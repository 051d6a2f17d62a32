use async_trait::async_trait;
use tracing::debug;

#[derive(Clone, Debug, Default)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

/// Runs an external program to completion and captures its output.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        path_prefix: Option<&str>,
    ) -> anyhow::Result<CommandResult>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TokioRunner;

#[async_trait]
impl ProcessRunner for TokioRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        path_prefix: Option<&str>,
    ) -> anyhow::Result<CommandResult> {
        let mut command = tokio::process::Command::new(program);
        command.args(args);
        if let Some(prefix) = path_prefix {
            command.env("PATH", prefixed_path(prefix, std::env::var("PATH").ok()));
        }

        debug!(program, ?args, "spawning");
        let output = command.output().await?;
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        Ok(CommandResult {
            stdout,
            stderr,
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}

pub(crate) fn prefixed_path(prefix: &str, current: Option<String>) -> String {
    match current {
        Some(path) if !path.is_empty() => format!("{prefix}:{path}"),
        _ => prefix.to_string(),
    }
}

pub(crate) fn nonempty_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replays canned results and records every invocation.
    #[derive(Default)]
    pub struct StubRunner {
        responses: Mutex<VecDeque<CommandResult>>,
        fallback: Mutex<Option<CommandResult>>,
        pub calls: Mutex<Vec<(String, Vec<String>)>>,
    }

    impl StubRunner {
        pub fn always(stdout: &str) -> Self {
            let runner = Self::default();
            *runner.fallback.lock().unwrap() = Some(ok(stdout));
            runner
        }

        pub fn failing(stderr: &str) -> Self {
            let runner = Self::default();
            *runner.fallback.lock().unwrap() = Some(CommandResult {
                stderr: stderr.to_string(),
                success: false,
                code: Some(1),
                ..CommandResult::default()
            });
            runner
        }

        pub fn push(&self, result: CommandResult) {
            self.responses.lock().unwrap().push_back(result);
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn calls_to(&self, subcommand: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, args)| args.get(1).map(String::as_str) == Some(subcommand))
                .count()
        }
    }

    pub fn ok(stdout: &str) -> CommandResult {
        CommandResult {
            stdout: stdout.to_string(),
            success: true,
            code: Some(0),
            ..CommandResult::default()
        }
    }

    #[async_trait]
    impl ProcessRunner for StubRunner {
        async fn run(
            &self,
            program: &str,
            args: &[String],
            _path_prefix: Option<&str>,
        ) -> anyhow::Result<CommandResult> {
            self.calls
                .lock()
                .unwrap()
                .push((program.to_string(), args.to_vec()));
            if let Some(next) = self.responses.lock().unwrap().pop_front() {
                return Ok(next);
            }
            Ok(self.fallback.lock().unwrap().clone().unwrap_or_default())
        }
    }
}
