//! Active probe execution
//!
//! A probe opens a TCP socket to the target, optionally upgrades it to TLS,
//! and for HTTP(S) profiles sends a minimal `GET` and reads the status
//! line. Network failures never surface to the caller; they are converted
//! into the corresponding passive-style observation.

use crate::checker::{HealthMode, Inner};
use crate::codec::Counter;
use crate::config::{ActiveChecks, CheckKind, CheckType};
use regex::Regex;
use rustls::pki_types::ServerName;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tracing::{debug, warn};
use vigil_core::Target;

/// Longest status line the prober will buffer before giving up on parsing.
const MAX_STATUS_LINE: usize = 512;

/// What a single probe observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProbeOutcome {
    /// TCP (and TLS, when configured) connectivity confirmed
    Connected,
    /// An operation ran into the probe timeout
    Timeout,
    /// A TCP-layer failure (connect, handshake, send or receive)
    TcpFailure,
    /// An HTTP exchange completed; `None` means the status line was
    /// unparseable
    HttpStatus(Option<u16>),
}

/// Probe the given targets with bounded concurrency.
///
/// Targets are partitioned round-robin into `concurrency` packages; all but
/// one run on spawned tasks while the last is absorbed by the calling task.
/// A shutting-down worker stops between items.
pub(crate) async fn check_all(inner: &Arc<Inner>, targets: Vec<Target>) {
    if targets.is_empty() {
        return;
    }

    let concurrency = inner.config.checks.active.concurrency as usize;
    let mut packages = partition(targets, concurrency);

    let own = packages.remove(0);
    let mut handles = Vec::with_capacity(packages.len());
    for package in packages {
        let inner = Arc::clone(inner);
        handles.push(tokio::spawn(async move {
            run_package(&inner, package).await;
        }));
    }

    run_package(inner, own).await;

    for handle in handles {
        if let Err(err) = handle.await {
            warn!(error = %err, "probe task panicked");
        }
    }
}

/// Round-robin partition into at most `concurrency` non-empty packages.
fn partition(targets: Vec<Target>, concurrency: usize) -> Vec<Vec<Target>> {
    let buckets = concurrency.max(1).min(targets.len());
    let mut packages: Vec<Vec<Target>> = vec![Vec::new(); buckets];
    for (i, target) in targets.into_iter().enumerate() {
        packages[i % buckets].push(target);
    }
    packages
}

async fn run_package(inner: &Arc<Inner>, package: Vec<Target>) {
    for target in package {
        if inner.worker_exiting() {
            debug!("worker exiting; aborting probe package");
            break;
        }
        probe(inner, &target).await;
    }
}

/// Probe one target and feed the observation into the state machine.
pub(crate) async fn probe(inner: &Arc<Inner>, target: &Target) {
    let outcome = run_probe(inner, target).await;
    debug!(target = %target, ?outcome, "probe finished");

    let (ip, port, hostname) = (&target.ip, target.port, target.hostname.as_deref());
    let checks = &inner.config.checks;
    let result = match outcome {
        ProbeOutcome::Connected => {
            let threshold = checks.threshold(CheckKind::Active, Counter::Success);
            inner
                .run_report(ip, port, hostname, HealthMode::Healthy, Counter::Success, threshold)
                .await
        }
        ProbeOutcome::Timeout => {
            let threshold = checks.threshold(CheckKind::Active, Counter::TimeoutFailure);
            inner
                .run_report(
                    ip,
                    port,
                    hostname,
                    HealthMode::Unhealthy,
                    Counter::TimeoutFailure,
                    threshold,
                )
                .await
        }
        ProbeOutcome::TcpFailure => {
            let threshold = checks.threshold(CheckKind::Active, Counter::TcpFailure);
            inner
                .run_report(
                    ip,
                    port,
                    hostname,
                    HealthMode::Unhealthy,
                    Counter::TcpFailure,
                    threshold,
                )
                .await
        }
        ProbeOutcome::HttpStatus(status) => inner
            .http_status_report(ip, port, hostname, status, CheckKind::Active)
            .await
            .map(|_| crate::LockOutcome::Ran),
    };

    if let Err(err) = result {
        warn!(target = %target, error = %err, "failed to record probe result");
    }
}

async fn run_probe(inner: &Arc<Inner>, target: &Target) -> ProbeOutcome {
    let active = &inner.config.checks.active;
    let limit = Duration::from_secs_f64(active.timeout);
    let addr = format!("{}:{}", target.ip, target.port);

    let stream = match timeout(limit, TcpStream::connect(&addr)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(err)) => {
            debug!(target = %target, error = %err, "probe connect failed");
            return ProbeOutcome::TcpFailure;
        }
        Err(_) => {
            debug!(target = %target, "probe connect timed out");
            return ProbeOutcome::Timeout;
        }
    };

    match active.check_type {
        CheckType::Tcp => ProbeOutcome::Connected,
        CheckType::Http => http_exchange(stream, target, active, limit).await,
        CheckType::Https => {
            let Some(config) = inner.tls.clone() else {
                // Unreachable: construction builds the config for https
                warn!(target = %target, "https probe without TLS config");
                return ProbeOutcome::TcpFailure;
            };

            let sni = active
                .https_sni
                .clone()
                .or_else(|| target.hostheader.clone())
                .or_else(|| target.hostname.clone());
            let Some(sni) = sni else {
                warn!(target = %target, "https probe has no SNI candidate");
                return ProbeOutcome::TcpFailure;
            };
            let server_name = match ServerName::try_from(sni) {
                Ok(name) => name,
                Err(err) => {
                    warn!(target = %target, error = %err, "invalid SNI server name");
                    return ProbeOutcome::TcpFailure;
                }
            };

            let connector = TlsConnector::from(config);
            match timeout(limit, connector.connect(server_name, stream)).await {
                Ok(Ok(tls_stream)) => http_exchange(tls_stream, target, active, limit).await,
                Ok(Err(err)) => {
                    debug!(target = %target, error = %err, "TLS handshake failed");
                    ProbeOutcome::TcpFailure
                }
                Err(_) => {
                    debug!(target = %target, "TLS handshake timed out");
                    ProbeOutcome::TcpFailure
                }
            }
        }
    }
}

/// Send the probe request and read back the status line.
async fn http_exchange<S>(
    mut stream: S,
    target: &Target,
    active: &ActiveChecks,
    limit: Duration,
) -> ProbeOutcome
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let request = build_request(target, active);

    match timeout(limit, stream.write_all(request.as_bytes())).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            debug!(target = %target, error = %err, "probe send failed");
            return ProbeOutcome::TcpFailure;
        }
        Err(_) => {
            debug!(target = %target, "probe send timed out");
            return ProbeOutcome::Timeout;
        }
    }

    let mut line = Vec::with_capacity(128);
    let mut chunk = [0u8; 128];
    loop {
        match timeout(limit, stream.read(&mut chunk)).await {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => {
                line.extend_from_slice(&chunk[..n]);
                if line.contains(&b'\n') || line.len() >= MAX_STATUS_LINE {
                    break;
                }
            }
            Ok(Err(err)) => {
                debug!(target = %target, error = %err, "probe receive failed");
                return ProbeOutcome::TcpFailure;
            }
            Err(_) => {
                debug!(target = %target, "probe receive timed out");
                return ProbeOutcome::Timeout;
            }
        }
    }

    ProbeOutcome::HttpStatus(parse_status_line(&line))
}

fn build_request(target: &Target, active: &ActiveChecks) -> String {
    let host = target
        .hostheader
        .as_deref()
        .or(target.hostname.as_deref())
        .unwrap_or(&target.ip);

    let mut request = format!("GET {} HTTP/1.1\r\nConnection: close\r\n", active.http_path);
    for header in &active.req_headers {
        request.push_str(header);
        request.push_str("\r\n");
    }
    request.push_str(&format!("Host: {host}\r\n\r\n"));
    request
}

/// Parse the status code out of an HTTP/1.x status line.
fn parse_status_line(line: &[u8]) -> Option<u16> {
    let text = String::from_utf8_lossy(line);
    let re = Regex::new(r"^HTTP/\d+\.\d+\s+(\d+)").ok()?;
    re.captures(&text)?.get(1)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(n: usize) -> Vec<Target> {
        (0..n)
            .map(|i| Target::new(format!("10.0.0.{i}"), 80, None))
            .collect()
    }

    #[test]
    fn test_partition_round_robin() {
        let packages = partition(targets(7), 3);
        assert_eq!(packages.len(), 3);
        assert_eq!(packages[0].len(), 3);
        assert_eq!(packages[1].len(), 2);
        assert_eq!(packages[2].len(), 2);
        assert_eq!(packages[0][0].ip, "10.0.0.0");
        assert_eq!(packages[1][0].ip, "10.0.0.1");
        assert_eq!(packages[2][0].ip, "10.0.0.2");
        assert_eq!(packages[0][1].ip, "10.0.0.3");
    }

    #[test]
    fn test_partition_never_exceeds_targets() {
        let packages = partition(targets(2), 10);
        assert_eq!(packages.len(), 2);
        assert!(packages.iter().all(|p| p.len() == 1));

        let packages = partition(targets(3), 1);
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].len(), 3);
    }

    #[test]
    fn test_build_request_host_fallback() {
        let active = ActiveChecks::default();

        let bare = Target::new("10.0.0.1", 80, None);
        assert_eq!(
            build_request(&bare, &active),
            "GET / HTTP/1.1\r\nConnection: close\r\nHost: 10.0.0.1\r\n\r\n"
        );

        let named = Target::new("10.0.0.1", 80, Some("app.internal".to_string()));
        assert!(build_request(&named, &active).contains("Host: app.internal\r\n"));

        let overridden = named.with_hostheader("api.example.com");
        assert!(build_request(&overridden, &active).contains("Host: api.example.com\r\n"));
    }

    #[test]
    fn test_build_request_custom_headers() {
        let mut active = ActiveChecks::default();
        active.http_path = "/healthz".to_string();
        active.req_headers = vec![
            "User-Agent: vigil".to_string(),
            "X-Probe: 1".to_string(),
        ];

        let request = build_request(&Target::new("10.0.0.1", 80, None), &active);
        assert_eq!(
            request,
            "GET /healthz HTTP/1.1\r\nConnection: close\r\nUser-Agent: vigil\r\nX-Probe: 1\r\nHost: 10.0.0.1\r\n\r\n"
        );
    }

    #[test]
    fn test_parse_status_line() {
        assert_eq!(parse_status_line(b"HTTP/1.1 200 OK\r\n"), Some(200));
        assert_eq!(parse_status_line(b"HTTP/1.0 503 Unavailable\r\n"), Some(503));
        assert_eq!(parse_status_line(b"HTTP/2.0 204\r\n"), Some(204));
        assert_eq!(parse_status_line(b"SSH-2.0-OpenSSH_9.6\r\n"), None);
        assert_eq!(parse_status_line(b""), None);
        assert_eq!(parse_status_line(b"HTTP/1.1"), None);
    }
}
