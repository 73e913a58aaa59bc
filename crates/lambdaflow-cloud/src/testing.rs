//! Scripted [`CommandRunner`] for tests
//!
//! ```ignore
//! let runner = ScriptedRunner::new()
//!     .on("wrangler --version", Reply::stdout("3.0.0"))
//!     .on("wrangler dns list", Reply::stdout("abc123  A  api.example.com"));
//! ```
//!
//! Rules match on the start of [`CommandSpec::command_line`]; the first
//! matching rule wins. A rule with several replies hands them out in order
//! and then keeps repeating the last one. Unmatched commands succeed with
//! empty output.

use crate::error::{CloudError, Result};
use crate::process::{CommandOutput, CommandRunner, CommandSpec};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// Canned response for a scripted command
#[derive(Debug, Clone)]
pub enum Reply {
    Output(CommandOutput),
    ToolNotFound,
    Timeout,
}

impl Reply {
    pub fn stdout(stdout: impl Into<String>) -> Self {
        Reply::Output(CommandOutput::success(stdout))
    }

    pub fn fail(status: i32, stderr: impl Into<String>) -> Self {
        Reply::Output(CommandOutput::failure(status, stderr))
    }
}

struct Rule {
    prefix: String,
    replies: VecDeque<Reply>,
}

#[derive(Default)]
pub struct ScriptedRunner {
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<CommandSpec>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, prefix: impl Into<String>, reply: Reply) -> Self {
        self.on_sequence(prefix, [reply])
    }

    pub fn on_sequence(self, prefix: impl Into<String>, replies: impl IntoIterator<Item = Reply>) -> Self {
        lock(&self.rules).push(Rule {
            prefix: prefix.into(),
            replies: replies.into_iter().collect(),
        });
        self
    }

    /// Every command run so far, in order
    pub fn calls(&self) -> Vec<CommandSpec> {
        lock(&self.calls).clone()
    }

    /// Command lines run so far, in order
    pub fn command_lines(&self) -> Vec<String> {
        lock(&self.calls).iter().map(CommandSpec::command_line).collect()
    }

    /// How many commands started with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|spec| spec.command_line().starts_with(prefix))
            .count()
    }

    fn reply_for(&self, line: &str) -> Option<Reply> {
        let mut rules = lock(&self.rules);
        let rule = rules.iter_mut().find(|rule| line.starts_with(&rule.prefix))?;
        if rule.replies.len() > 1 {
            rule.replies.pop_front()
        } else {
            rule.replies.front().cloned()
        }
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let line = spec.command_line();
        lock(&self.calls).push(spec.clone());

        match self.reply_for(&line) {
            None => Ok(CommandOutput::success("")),
            Some(Reply::Output(output)) => Ok(output),
            Some(Reply::ToolNotFound) => Err(CloudError::ToolNotFound(spec.program.clone())),
            Some(Reply::Timeout) => Err(CloudError::Timeout(line)),
        }
    }
}
