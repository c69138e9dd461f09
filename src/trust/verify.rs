//! Certificate signature verification.

use log::trace;
use x509_cert::Certificate;

use crate::errors::{Error, Result};
use crate::key::PublicKey;
use crate::signature::{SignatureAlgorithm, VerifyingKey};
use crate::tbs::tbs_certificate_der;

/// Verifies the signature of `cert` with the public key of its issuer.
///
/// The scheme comes from `cert.signatureAlgorithm`; the signed message is
/// `DER(tbsCertificate)`.
pub fn verify_certificate_signature(cert: &Certificate, issuer_key: &PublicKey) -> Result<()> {
    let algorithm = SignatureAlgorithm::from_algorithm_identifier(&cert.signature_algorithm)?;
    let verifier = VerifyingKey::new(issuer_key.clone(), algorithm)?;

    let signature = cert
        .signature
        .as_bytes()
        .ok_or_else(|| Error::malformed("certificate signature has unused bits"))?;
    let digest = algorithm.hash().digest(&tbs_certificate_der(cert)?);

    trace!(
        "verifying {} certificate signature of {} bytes",
        algorithm.label(),
        signature.len()
    );
    verifier.verify_digest(&digest, signature)
}
