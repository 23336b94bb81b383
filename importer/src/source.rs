//! Access to the source of truth.
//!
//! The import pipeline only sees [`QuerySource`]: an expression in, a JSON
//! document out. `SshMetalClient` talks to the real thing, `FixtureSource`
//! replays recorded answers and `RetryingSource` adds bounded retries at the
//! boundary without the pipeline knowing about it.

use crate::errors::QueryError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tokio::process::Command;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info};

#[async_trait]
pub trait QuerySource: Send + Sync {
    async fn query(&self, expression: &str) -> Result<Value, QueryError>;
}

#[async_trait]
impl<S: QuerySource + ?Sized> QuerySource for Box<S> {
    async fn query(&self, expression: &str) -> Result<Value, QueryError> {
        (**self).query(expression).await
    }
}

pub const DEFAULT_METAL_COMMAND: &str = "metal view";

pub fn default_ssh_command() -> Vec<String> {
    ["ssh", "-o", "BatchMode=yes"].map(String::from).to_vec()
}

/// Runs `metal view '<expression>'` on the controller over ssh.
#[derive(Clone, Debug)]
pub struct SshMetalClient {
    host: String,
    user: Option<String>,
    ssh_command: Vec<String>,
    metal_command: String,
}

impl SshMetalClient {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            user: None,
            ssh_command: default_ssh_command(),
            metal_command: DEFAULT_METAL_COMMAND.to_owned(),
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Program and leading arguments used to reach the host.
    pub fn with_ssh_command(mut self, ssh_command: Vec<String>) -> Self {
        self.ssh_command = ssh_command;
        self
    }

    pub fn with_metal_command(mut self, metal_command: impl Into<String>) -> Self {
        self.metal_command = metal_command.into();
        self
    }

    fn destination(&self) -> String {
        match &self.user {
            Some(user) => format!("{user}@{}", self.host),
            None => self.host.clone(),
        }
    }

    /// Shell command run on the remote host. Expressions are single-quoted,
    /// so they must not contain a single quote themselves.
    fn remote_command(&self, expression: &str) -> Result<String, QueryError> {
        if expression.contains('\'') {
            return Err(QueryError::Unquotable(expression.to_owned()));
        }
        Ok(format!("{} '{expression}' 2> /dev/null", self.metal_command))
    }
}

#[async_trait]
impl QuerySource for SshMetalClient {
    async fn query(&self, expression: &str) -> Result<Value, QueryError> {
        let remote = self.remote_command(expression)?;
        debug!(">>> {remote}");

        let (program, args) = self
            .ssh_command
            .split_first()
            .ok_or(QueryError::EmptyCommand)?;

        let output = Command::new(program)
            .args(args)
            .arg(self.destination())
            .arg(&remote)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| QueryError::Spawn {
                command: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(QueryError::Failed {
                expression: expression.to_owned(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        serde_json::from_slice(&output.stdout).map_err(|source| QueryError::Parse {
            expression: expression.to_owned(),
            source,
        })
    }
}

/// Recorded responses, keyed by expression.
#[derive(Debug, Default)]
pub struct FixtureSource {
    responses: BTreeMap<String, Value>,
    issued: Mutex<Vec<String>>,
}

impl From<BTreeMap<String, Value>> for FixtureSource {
    fn from(responses: BTreeMap<String, Value>) -> Self {
        Self {
            responses,
            issued: Mutex::default(),
        }
    }
}

impl FixtureSource {
    /// Loads a JSON object mapping expressions to responses.
    pub fn from_file(path: &Path) -> Result<Self, QueryError> {
        let fixture_err = |reason: String| QueryError::Fixture {
            path: path.display().to_string(),
            reason,
        };

        let raw = std::fs::read_to_string(path).map_err(|e| fixture_err(e.to_string()))?;
        let responses: BTreeMap<String, Value> =
            serde_json::from_str(&raw).map_err(|e| fixture_err(e.to_string()))?;

        info!(path = %path.display(), expressions = responses.len(), "Loaded fixture");
        Ok(Self::from(responses))
    }

    /// Expressions queried so far, in order.
    pub fn issued(&self) -> Vec<String> {
        self.issued
            .lock()
            .map(|issued| issued.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl QuerySource for FixtureSource {
    async fn query(&self, expression: &str) -> Result<Value, QueryError> {
        debug!(">>> {expression}");
        if let Ok(mut issued) = self.issued.lock() {
            issued.push(expression.to_owned());
        }

        self.responses
            .get(expression)
            .cloned()
            .ok_or_else(|| QueryError::UnknownExpression(expression.to_owned()))
    }
}

/// Retries transient failures of `S` with exponential backoff and jitter.
/// Responses that are not JSON are never retried.
pub struct RetryingSource<S> {
    inner: S,
    base_ms: u64,
    max_retries: usize,
}

impl<S: QuerySource> RetryingSource<S> {
    const MAX_DELAY: Duration = Duration::from_secs(10);

    pub fn new(inner: S, base_ms: u64, max_retries: usize) -> Self {
        Self {
            inner,
            base_ms,
            max_retries,
        }
    }

    fn strategy(&self) -> impl Iterator<Item = Duration> + use<S> {
        ExponentialBackoff::from_millis(self.base_ms)
            .max_delay(Self::MAX_DELAY)
            .map(jitter)
            .take(self.max_retries)
    }
}

#[async_trait]
impl<S: QuerySource> QuerySource for RetryingSource<S> {
    async fn query(&self, expression: &str) -> Result<Value, QueryError> {
        RetryIf::spawn(
            self.strategy(),
            || async {
                self.inner.query(expression).await.inspect_err(|err| {
                    if err.is_transient() {
                        info!(expression, error = %err, "Retrying query");
                    }
                })
            },
            QueryError::is_transient,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn shell(script: &str) -> SshMetalClient {
        // `sh -c <script> sh <destination> <remote command>`
        SshMetalClient::new("controller").with_ssh_command(vec![
            "sh".to_owned(),
            "-c".to_owned(),
            script.to_owned(),
            "sh".to_owned(),
        ])
    }

    #[test]
    fn test_remote_command_quotes_expression() {
        let client = SshMetalClient::new("10.101.0.46").with_user("root");
        assert_eq!(client.destination(), "root@10.101.0.46");
        assert_eq!(
            client.remote_command("nodes.map(&:name)").unwrap(),
            "metal view 'nodes.map(&:name)' 2> /dev/null"
        );
        assert!(matches!(
            client.remote_command("nodes.x'; rm -rf /'"),
            Err(QueryError::Unquotable(_))
        ));
    }

    #[tokio::test]
    async fn test_ssh_client_parses_stdout() {
        let client = shell(r#"printf '%s' '[{"metadata":{"name":"c1"}}]'"#);
        let value = client.query("assets.chassis").await.unwrap();
        assert_eq!(value, json!([{"metadata": {"name": "c1"}}]));
    }

    #[tokio::test]
    async fn test_ssh_client_passes_destination_and_command() {
        // Echo the remote command back as a JSON string.
        let client = shell(r#"printf '"%s|%s"' "$1" "$2""#).with_user("root");
        let value = client.query("groups.map(&:name)").await.unwrap();
        assert_eq!(
            value,
            json!("root@controller|metal view 'groups.map(&:name)' 2> /dev/null")
        );
    }

    #[tokio::test]
    async fn test_ssh_client_failures() {
        let err = shell("echo unreachable >&2; exit 255").query("assets.pdus").await.unwrap_err();
        match &err {
            QueryError::Failed { stderr, .. } => assert_eq!(stderr, "unreachable"),
            other => panic!("Expected failure, got {other:?}"),
        }
        assert!(err.is_transient());

        let err = shell("echo not json").query("assets.pdus").await.unwrap_err();
        assert!(matches!(err, QueryError::Parse { .. }));
        assert!(!err.is_transient());

        let err = SshMetalClient::new("controller")
            .with_ssh_command(Vec::new())
            .query("assets.pdus")
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::EmptyCommand));
    }

    #[tokio::test]
    async fn test_fixture_source() {
        let source = FixtureSource::from(BTreeMap::from([(
            "groups.map(&:name)".to_owned(),
            json!(["nodes"]),
        )]));

        assert_eq!(source.query("groups.map(&:name)").await.unwrap(), json!(["nodes"]));
        assert!(matches!(
            source.query("nodes.map(&:name)").await,
            Err(QueryError::UnknownExpression(e)) if e == "nodes.map(&:name)"
        ));
        assert_eq!(source.issued(), vec!["groups.map(&:name)", "nodes.map(&:name)"]);
    }

    #[test]
    fn test_fixture_from_missing_file() {
        let err = FixtureSource::from_file(Path::new("/nonexistent/fixture.json")).unwrap_err();
        assert!(matches!(err, QueryError::Fixture { .. }));
    }

    /// Fails transiently `failures` times before answering.
    struct Flaky {
        failures: usize,
        attempts: AtomicUsize,
        permanent: bool,
    }

    #[async_trait]
    impl QuerySource for Flaky {
        async fn query(&self, expression: &str) -> Result<Value, QueryError> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.permanent {
                return Err(QueryError::UnknownExpression(expression.to_owned()));
            }
            if attempt < self.failures {
                return Err(QueryError::Failed {
                    expression: expression.to_owned(),
                    status: "exit status: 255".to_owned(),
                    stderr: String::new(),
                });
            }
            Ok(json!(attempt))
        }
    }

    fn flaky(failures: usize, permanent: bool) -> Flaky {
        Flaky {
            failures,
            attempts: AtomicUsize::new(0),
            permanent,
        }
    }

    #[tokio::test]
    async fn test_retrying_source_recovers() {
        let source = RetryingSource::new(flaky(2, false), 1, 3);
        assert_eq!(source.query("assets.chassis").await.unwrap(), json!(2));
        assert_eq!(source.inner.attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retrying_source_gives_up() {
        let source = RetryingSource::new(flaky(5, false), 1, 2);
        assert!(matches!(
            source.query("assets.chassis").await,
            Err(QueryError::Failed { .. })
        ));
        assert_eq!(source.inner.attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retrying_source_skips_permanent_errors() {
        let source = RetryingSource::new(flaky(0, true), 1, 5);
        assert!(source.query("assets.chassis").await.is_err());
        assert_eq!(source.inner.attempts.load(Ordering::SeqCst), 1);
    }
}
