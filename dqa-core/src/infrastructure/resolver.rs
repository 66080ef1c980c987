// dqa-core/src/infrastructure/resolver.rs

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, instrument};

use crate::domain::conflict::{check_batch, Conflict};
use crate::domain::error::DomainError;
use crate::domain::results::ResultRecord;
use crate::error::DqaError;
use crate::infrastructure::error::{InfrastructureError, ResolverError};
use crate::ports::ConflictResolver;

/// Runs an external program: the conflict batch goes to its stdin as one JSON
/// array, one JSON array of result arrays comes back on stdout.
pub struct ProcessResolver {
    program: String,
    resolvers: Option<String>,
    timeout: Duration,
}

impl ProcessResolver {
    pub fn new(program: impl Into<String>, resolvers: Option<String>, timeout_secs: u64) -> Self {
        Self {
            program: program.into(),
            resolvers,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    fn args(&self) -> Vec<String> {
        self.resolvers
            .iter()
            .map(|path| format!("--resolvers={}", path))
            .collect()
    }
}

/// Decodes resolver output; it must align with the batch that was sent.
pub fn decode_output(sent: usize, stdout: &[u8]) -> Result<Vec<Vec<ResultRecord>>, DqaError> {
    let resolved: Vec<Vec<ResultRecord>> = serde_json::from_slice(stdout).map_err(|e| {
        DomainError::ResolverProtocol(format!("output is not an array of result arrays: {}", e))
    })?;
    check_batch(sent, resolved.len())?;
    Ok(resolved)
}

#[async_trait]
impl ConflictResolver for ProcessResolver {
    #[instrument(skip_all, fields(program = %self.program, conflicts = batch.len()))]
    async fn resolve(&self, batch: &[Conflict]) -> Result<Vec<Vec<ResultRecord>>, DqaError> {
        let input = serde_json::to_vec(batch).map_err(InfrastructureError::Json)?;

        let mut child = Command::new(&self.program)
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ResolverError::Spawn {
                program: self.program.clone(),
                source,
            })
            .map_err(InfrastructureError::from)?;

        // Feed stdin while stdout and stderr drain, so neither side can fill
        // a pipe and stall the other. The timeout covers the whole exchange;
        // dropping the child on expiry kills it.
        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                // A program that exits without reading is judged by its exit status.
                if let Err(e) = stdin.write_all(&input).await {
                    debug!(error = %e, "Resolver closed its input early");
                }
                // Closing stdin signals the end of the batch.
                drop(stdin);
            }
        };
        let exchange = async move {
            let ((), output) = tokio::join!(feed, child.wait_with_output());
            output
        };

        let output = match tokio::time::timeout(self.timeout, exchange).await {
            Ok(output) => output?,
            Err(_) => {
                return Err(InfrastructureError::from(ResolverError::Timeout(
                    self.timeout.as_secs(),
                ))
                .into());
            }
        };

        if !output.status.success() {
            return Err(InfrastructureError::from(ResolverError::Exit {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
            .into());
        }

        debug!(bytes = output.stdout.len(), "Resolver finished");
        let resolved = decode_output(batch.len(), &output.stdout)?;
        info!(
            changed = resolved.iter().filter(|r| !r.is_empty()).count(),
            "Resolver returned results"
        );
        Ok(resolved)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_output() {
        let out = br#"[[], [{"Table": "person", "Field": "person_id", "Rank": "High"}]]"#;
        let resolved = decode_output(2, out).unwrap();
        assert!(resolved[0].is_empty());
        assert_eq!(resolved[1][0].field, "person_id");

        assert!(matches!(
            decode_output(3, out),
            Err(DqaError::Domain(DomainError::ResolverProtocol(_)))
        ));
        assert!(matches!(
            decode_output(1, b"not json"),
            Err(DqaError::Domain(DomainError::ResolverProtocol(_)))
        ));
    }

    #[test]
    fn test_resolvers_argument() {
        let resolver = ProcessResolver::new("resolve.py", Some("/opt/resolvers".into()), 5);
        assert_eq!(resolver.args(), ["--resolvers=/opt/resolvers"]);
        assert!(ProcessResolver::new("resolve.py", None, 5).args().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_echoing_program() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("resolve.sh");
        std::fs::write(&script, "#!/bin/sh\ncat > /dev/null\necho '[[]]'\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let resolver = ProcessResolver::new(script.to_string_lossy(), None, 10);
        let conflict = Conflict::new("person.csv", 0, ResultRecord::default(), ResultRecord::default());
        let resolved = resolver.resolve(&[conflict]).await.unwrap();
        assert_eq!(resolved, vec![Vec::<ResultRecord>::new()]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_program_reports_stderr() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("resolve.sh");
        std::fs::write(&script, "#!/bin/sh\necho 'no resolver for g2-013' >&2\nexit 3\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let resolver = ProcessResolver::new(script.to_string_lossy(), None, 10);
        let err = resolver.resolve(&[]).await.unwrap_err();
        match err {
            DqaError::Infrastructure(InfrastructureError::Resolver(ResolverError::Exit {
                stderr,
                ..
            })) => assert_eq!(stderr, "no resolver for g2-013"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_covers_a_program_that_never_reads() {
        use std::os::unix::fs::PermissionsExt;
        use std::time::Instant;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("resolve.sh");
        std::fs::write(&script, "#!/bin/sh\nexec sleep 30\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        // Far larger than a pipe buffer, so an unbounded write would block.
        let log = ResultRecord {
            finding: "x".repeat(200 * 1024),
            ..Default::default()
        };
        let conflict = Conflict::new("person.csv", 0, log, ResultRecord::default());

        let resolver = ProcessResolver::new(script.to_string_lossy(), None, 1);
        let started = Instant::now();
        let outcome =
            tokio::time::timeout(Duration::from_secs(10), resolver.resolve(&[conflict])).await;

        let err = outcome.expect("resolver call outlived its own timeout").unwrap_err();
        assert!(matches!(
            err,
            DqaError::Infrastructure(InfrastructureError::Resolver(ResolverError::Timeout(1)))
        ));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_program_answering_while_reading_large_batch() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("resolve.sh");
        // Emits a large stderr stream before consuming its input.
        std::fs::write(
            &script,
            "#!/bin/sh\nhead -c 200000 /dev/zero | tr '\\0' x >&2\ncat > /dev/null\necho '[[]]'\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let log = ResultRecord {
            finding: "x".repeat(200 * 1024),
            ..Default::default()
        };
        let conflict = Conflict::new("person.csv", 0, log, ResultRecord::default());

        let resolver = ProcessResolver::new(script.to_string_lossy(), None, 10);
        let resolved = resolver.resolve(&[conflict]).await.unwrap();
        assert_eq!(resolved, vec![Vec::<ResultRecord>::new()]);
    }

    #[tokio::test]
    async fn test_missing_program() {
        let resolver = ProcessResolver::new("/nonexistent/resolve-conflicts", None, 5);
        let err = resolver.resolve(&[]).await.unwrap_err();
        assert!(matches!(
            err,
            DqaError::Infrastructure(InfrastructureError::Resolver(ResolverError::Spawn { .. }))
        ));
    }
}
