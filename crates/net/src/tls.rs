// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client-side TLS configuration for the slave's connection to a master.
//!
//! Defaults to verifying the peer certificate against the platform's
//! native root store. `insecure_skip_verify` exists for development
//! against self-signed masters and logs loudly every time it is used --
//! it must never be the default in a deployed configuration.

use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TlsError {
    #[error("failed to load native root certificates: {0}")]
    Roots(std::io::Error),
    #[error("tls configuration error: {0}")]
    Config(#[from] rustls::Error),
}

/// Build a `rustls` client configuration. When `insecure_skip_verify` is
/// set, peer certificates are accepted unconditionally -- a warning is
/// logged at construction time so the mode can never be silently active.
pub fn client_tls_config(insecure_skip_verify: bool) -> Result<rustls::ClientConfig, TlsError> {
    if insecure_skip_verify {
        tracing::warn!("TLS certificate verification is DISABLED for this connection");
        let config = rustls::ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(NoVerify))
            .with_no_client_auth();
        return Ok(config);
    }

    let mut roots = rustls::RootCertStore::empty();
    let native = rustls_native_certs::load_native_certs();
    for err in &native.errors {
        tracing::warn!(error = %err, "error loading a native root certificate");
    }
    for cert in native.certs {
        // Individual malformed roots are skipped rather than failing the
        // whole store: a single bad system certificate shouldn't prevent
        // every outbound connection from working.
        let _ = roots.add(cert);
    }
    if roots.is_empty() {
        return Err(TlsError::Roots(std::io::Error::other(
            "no usable native root certificates found",
        )));
    }

    Ok(rustls::ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth())
}

#[derive(Debug)]
struct NoVerify;

impl rustls::client::danger::ServerCertVerifier for NoVerify {
    fn verify_server_cert(
        &self,
        _end_entity: &rustls::pki_types::CertificateDer<'_>,
        _intermediates: &[rustls::pki_types::CertificateDer<'_>],
        _server_name: &rustls::pki_types::ServerName<'_>,
        _ocsp_response: &[u8],
        _now: rustls::pki_types::UnixTime,
    ) -> Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        rustls::crypto::ring::default_provider()
            .signature_verification_algorithms
            .supported_schemes()
    }
}

#[cfg(test)]
#[path = "tls_tests.rs"]
mod tests;
