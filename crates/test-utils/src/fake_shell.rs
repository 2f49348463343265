use std::collections::HashSet;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Mutex;

use pgbackup::exec::{CommandOutput, ExitState, ShellCommand, ShellExecutor};
use pgbackup::lock::ProcessProbe;

/// A scripted stand-in for the PostgreSQL client programs.
///
/// - `psql ... -c "SHOW server_version;"` answers with the configured version.
/// - `psql ... -l` answers with the configured listing.
/// - `pg_dump` / `pg_dumpall` succeed unless told to fail, and create a fake
///   artifact at their `-f` path so publication has something to move.
///
/// Every command is recorded in execution order.
#[derive(Debug, Default)]
pub struct FakeShell {
    version: Option<String>,
    listing: Option<CommandOutput>,
    failing_dumps: HashSet<String>,
    fail_globals: bool,
    executed: Mutex<Vec<ShellCommand>>,
}

impl FakeShell {
    pub fn new() -> Self {
        Self {
            version: Some("16.2".to_string()),
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: Option<&str>) -> Self {
        self.version = version.map(str::to_string);
        self
    }

    pub fn with_listing(mut self, text: impl Into<String>) -> Self {
        self.listing = Some(CommandOutput {
            status: ExitState::Exited(0),
            output: text.into().into_bytes(),
        });
        self
    }

    pub fn with_listing_failure(mut self, code: i32, text: &str) -> Self {
        self.listing = Some(CommandOutput {
            status: ExitState::Exited(code),
            output: text.as_bytes().to_vec(),
        });
        self
    }

    pub fn fail_dump(mut self, database: &str) -> Self {
        self.failing_dumps.insert(database.to_string());
        self
    }

    pub fn fail_globals(mut self) -> Self {
        self.fail_globals = true;
        self
    }

    pub fn executed(&self) -> Vec<ShellCommand> {
        self.executed.lock().unwrap().clone()
    }

    /// Programs run, in order.
    pub fn programs(&self) -> Vec<String> {
        self.executed().into_iter().map(|c| c.program).collect()
    }

    /// Databases `pg_dump` was asked for, in order, plus `globals` for
    /// every `pg_dumpall` call.
    pub fn dumped_units(&self) -> Vec<String> {
        self.executed()
            .iter()
            .filter_map(|c| match c.program.as_str() {
                "pg_dump" => arg_after(c, "-Fd"),
                "pg_dumpall" => Some("globals".to_string()),
                _ => None,
            })
            .collect()
    }

    fn respond(&self, cmd: &ShellCommand) -> CommandOutput {
        match cmd.program.as_str() {
            "psql" if cmd.args.iter().any(|a| a == "SHOW server_version;") => {
                match &self.version {
                    Some(v) => ok(format!("{v}\n")),
                    None => failed(2, "psql: error: connection refused\n"),
                }
            }
            "psql" if cmd.args.iter().any(|a| a == "-l") => self
                .listing
                .clone()
                .unwrap_or_else(|| failed(2, "psql: error: no listing scripted\n")),
            "pg_dump" => {
                let db = arg_after(cmd, "-Fd").unwrap_or_default();
                if self.failing_dumps.contains(&db) {
                    return failed(1, &format!("pg_dump: error: dump of {db} failed\n"));
                }
                let Some(out) = arg_after(cmd, "-f").map(PathBuf::from) else {
                    return failed(1, "pg_dump: error: no output path\n");
                };
                std::fs::create_dir_all(&out).unwrap();
                std::fs::write(out.join("toc.dat"), format!("toc for {db}")).unwrap();
                ok(String::new())
            }
            "pg_dumpall" => {
                if self.fail_globals {
                    return failed(1, "pg_dumpall: error: permission denied\n");
                }
                let Some(out) = arg_after(cmd, "-f").map(PathBuf::from) else {
                    return failed(1, "pg_dumpall: error: no output path\n");
                };
                std::fs::write(&out, "CREATE ROLE app;\n").unwrap();
                ok(String::new())
            }
            other => failed(127, &format!("{other}: command not found\n")),
        }
    }
}

impl ShellExecutor for FakeShell {
    fn execute<'a>(
        &'a self,
        command: &'a ShellCommand,
    ) -> Pin<Box<dyn Future<Output = CommandOutput> + Send + 'a>> {
        Box::pin(async move {
            self.executed.lock().unwrap().push(command.clone());
            self.respond(command)
        })
    }
}

fn arg_after(cmd: &ShellCommand, flag: &str) -> Option<String> {
    cmd.args
        .iter()
        .position(|a| a == flag)
        .and_then(|i| cmd.args.get(i + 1))
        .cloned()
}

fn ok(output: String) -> CommandOutput {
    CommandOutput {
        status: ExitState::Exited(0),
        output: output.into_bytes(),
    }
}

fn failed(code: i32, output: &str) -> CommandOutput {
    CommandOutput {
        status: ExitState::Exited(code),
        output: output.as_bytes().to_vec(),
    }
}

/// Liveness probe with a fixed set of running pids.
#[derive(Debug, Clone)]
pub struct FakeProbe {
    pub pid: i32,
    pub alive: HashSet<i32>,
}

impl FakeProbe {
    pub fn new(pid: i32) -> Self {
        Self {
            pid,
            alive: HashSet::from([pid]),
        }
    }

    pub fn with_alive(mut self, pid: i32) -> Self {
        self.alive.insert(pid);
        self
    }
}

impl ProcessProbe for FakeProbe {
    fn is_alive(&self, pid: i32) -> bool {
        self.alive.contains(&pid)
    }

    fn current_pid(&self) -> i32 {
        self.pid
    }
}
