//! Probe-side TLS assembly
//!
//! Parses the configured client identity out of in-memory PEM strings and
//! builds the rustls client config used for HTTPS probes. The SNI server
//! name is chosen per probe, so one config serves every target.

use crate::{Error, Result};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use rustls_pemfile::{certs, private_key};
use std::sync::Arc;

/// Client identity presented during TLS probes.
pub(crate) type ClientIdentity = (Vec<CertificateDer<'static>>, PrivateKeyDer<'static>);

/// Parse a PEM certificate chain from an in-memory string.
pub(crate) fn parse_cert_chain(pem: &str) -> Result<Vec<CertificateDer<'static>>> {
    let mut reader = pem.as_bytes();
    let chain = certs(&mut reader)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::Tls(format!("failed to parse ssl_cert: {e}")))?;

    if chain.is_empty() {
        return Err(Error::Tls("no certificates found in ssl_cert".to_string()));
    }

    Ok(chain)
}

/// Parse a PEM private key from an in-memory string.
pub(crate) fn parse_private_key(pem: &str) -> Result<PrivateKeyDer<'static>> {
    let mut reader = pem.as_bytes();
    private_key(&mut reader)
        .map_err(|e| Error::Tls(format!("failed to parse ssl_key: {e}")))?
        .ok_or_else(|| Error::Tls("no private key found in ssl_key".to_string()))
}

/// Build the client config used for HTTPS probes.
pub(crate) fn client_config(
    verify_certificate: bool,
    identity: Option<ClientIdentity>,
) -> Result<Arc<ClientConfig>> {
    let builder = ClientConfig::builder();

    let builder = if verify_certificate {
        let mut roots = RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        builder.with_root_certificates(roots)
    } else {
        builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(NoVerify))
    };

    let config = match identity {
        Some((chain, key)) => builder
            .with_client_auth_cert(chain, key)
            .map_err(|e| Error::Tls(format!("invalid client identity: {e}")))?,
        None => builder.with_no_client_auth(),
    };

    Ok(Arc::new(config))
}

/// Certificate verifier that accepts any peer.
///
/// Installed when `https_verify_certificate` is off.
#[derive(Debug)]
struct NoVerify;

impl ServerCertVerifier for NoVerify {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        rustls::crypto::ring::default_provider()
            .signature_verification_algorithms
            .supported_schemes()
    }
}
