//! Error types.

use const_oid::ObjectIdentifier;

/// Alias for [`core::result::Result`] with the `emrtd-zk` crate's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// SOD is not a DER encoded CMS `ContentInfo` carrying `SignedData`.
    #[error("malformed SOD: {reason}")]
    MalformedSod {
        /// Why the SOD was rejected.
        reason: &'static str,
    },

    /// `SignedData.certificates` holds no X.509 certificate.
    #[error("no certificate found in SOD")]
    NoCertificateFound,

    /// `encapContentInfo.eContent` is absent.
    #[error("encapsulated content is missing")]
    MissingEncapsulatedContent,

    /// `SignedData.signerInfos` is empty.
    #[error("no signer info found in SignedData")]
    NoSignerInfo,

    /// The signer info carries no signed attributes.
    #[error("no signed attributes found in SignerInfo")]
    NoSignedAttributes,

    /// Generic structural problem with an input buffer.
    #[error("malformed input: {reason}")]
    MalformedInput {
        /// Description of the problem.
        reason: String,
    },

    /// ASN.1 DER decoding or encoding failed.
    #[error("ASN.1 error: {0}")]
    Asn1(#[from] der::Error),

    /// SubjectPublicKeyInfo could not be interpreted.
    #[error("SPKI error: {0}")]
    Spki(#[from] spki::Error),

    /// Bundle envelope could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Base64 field of the bundle envelope is invalid.
    #[error("base64 error")]
    Base64(#[from] base64ct::Error),

    /// Public key algorithm OID is neither RSA nor EC.
    #[error("unsupported public key algorithm: {oid}")]
    UnsupportedPublicKeyAlgorithm {
        /// The offending OID.
        oid: ObjectIdentifier,
    },

    /// Signature algorithm OID or parameters are not supported.
    #[error("unsupported signature algorithm: {oid}")]
    UnsupportedSignatureAlgorithm {
        /// The offending OID.
        oid: ObjectIdentifier,
    },

    /// Digest algorithm OID is not supported.
    #[error("unsupported digest algorithm: {oid}")]
    UnsupportedDigestAlgorithm {
        /// The offending OID.
        oid: ObjectIdentifier,
    },

    /// Elliptic curve could not be identified or has no known order.
    #[error("unsupported elliptic curve")]
    UnsupportedCurve,

    /// Active authentication key or flag is not supported.
    #[error("unsupported active authentication algorithm: {reason}")]
    UnsupportedAlgorithm {
        /// Description of the problem.
        reason: String,
    },

    /// The canonical public key does not occur inside the TBS certificate.
    #[error("public key not found in TBS certificate")]
    KeyNotFoundInTbs,

    /// The Active Authentication key does not occur inside DG15.
    #[error("public key not found in DG15")]
    KeyNotFoundInDg15,

    /// The `notAfter` UTCTime does not occur inside the TBS certificate.
    #[error("expiration time not found in TBS certificate")]
    ExpirationNotFound,

    /// A digest does not occur inside the buffer it should be embedded in.
    #[error("digest not found in {container}")]
    DigestNotFound {
        /// Name of the searched buffer.
        container: &'static str,
    },

    /// The slave certificate has no AuthorityKeyIdentifier key identifier.
    #[error("slave certificate does not have AuthorityKeyIdentifier extension")]
    MissingAuthorityKeyIdentifier,

    /// A CSCA candidate has no SubjectKeyIdentifier.
    #[error("CSCA does not have SubjectKeyIdentifier extension")]
    MissingSubjectKeyIdentifier,

    /// No CSCA in the pool issued the slave certificate.
    #[error("no matching issuer found in CSCA set")]
    NoMatchingIssuer,

    /// Signature verification failed.
    #[error("verification error")]
    Verification,

    /// Merkle tree depth cannot hold the requested leaves.
    #[error("invalid tree depth {depth} for {leaves} leaves")]
    InvalidTreeDepth {
        /// Requested depth.
        depth: usize,
        /// Number of leaves.
        leaves: usize,
    },

    /// Two leaves map onto the same path of the tree.
    #[error("leaf collision at tree depth {depth}")]
    LeafCollision {
        /// Tree depth at which the keys collide.
        depth: usize,
    },

    /// Merkle proof could not be produced.
    #[error("proof generation failed: key is not in the tree")]
    ProofGenerationFailed,

    /// Input buffer is shorter than the operation requires.
    #[error("input too short: need at least {min} bytes, got {len}")]
    InputTooShort {
        /// Minimum required length.
        min: usize,
        /// Actual length.
        len: usize,
    },

    /// Poseidon hasher rejected its inputs.
    #[error("poseidon error: {0}")]
    Poseidon(#[from] light_poseidon::PoseidonError),

    /// Circuit is not present in the manifest.
    #[error("circuit {name} not found")]
    CircuitNotFound {
        /// Derived circuit name.
        name: String,
    },
}

/// Coarse classification of [`Error`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// DER/ASN.1 decode failure, truncated buffers, missing structure nodes.
    MalformedInput,
    /// Unknown or unsupported algorithm, curve or OID.
    UnsupportedAlgorithm,
    /// Required byte substring is absent from the serialized TBS certificate.
    OffsetNotFound,
    /// Issuer not found or chain signature invalid.
    TrustChainFailure,
    /// Merkle inclusion proof could not be produced.
    ProofGenerationFailure,
    /// Input shorter than the operation requires.
    InputTooShort,
}

impl Error {
    /// Returns the taxonomy bucket of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MalformedSod { .. }
            | Error::NoCertificateFound
            | Error::MissingEncapsulatedContent
            | Error::NoSignerInfo
            | Error::NoSignedAttributes
            | Error::MalformedInput { .. }
            | Error::Asn1(_)
            | Error::Spki(_)
            | Error::Json(_)
            | Error::Base64(_)
            | Error::Poseidon(_)
            | Error::InvalidTreeDepth { .. }
            | Error::LeafCollision { .. }
            | Error::CircuitNotFound { .. } => ErrorKind::MalformedInput,
            Error::UnsupportedPublicKeyAlgorithm { .. }
            | Error::UnsupportedSignatureAlgorithm { .. }
            | Error::UnsupportedDigestAlgorithm { .. }
            | Error::UnsupportedCurve
            | Error::UnsupportedAlgorithm { .. } => ErrorKind::UnsupportedAlgorithm,
            Error::KeyNotFoundInTbs
            | Error::KeyNotFoundInDg15
            | Error::ExpirationNotFound
            | Error::DigestNotFound { .. } => ErrorKind::OffsetNotFound,
            Error::MissingAuthorityKeyIdentifier
            | Error::MissingSubjectKeyIdentifier
            | Error::NoMatchingIssuer
            | Error::Verification => ErrorKind::TrustChainFailure,
            Error::ProofGenerationFailed => ErrorKind::ProofGenerationFailure,
            Error::InputTooShort { .. } => ErrorKind::InputTooShort,
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedInput {
            reason: reason.into(),
        }
    }
}

impl From<pkcs1::Error> for Error {
    fn from(err: pkcs1::Error) -> Self {
        match err {
            pkcs1::Error::Asn1(err) => Error::Asn1(err),
            other => Error::malformed(other.to_string()),
        }
    }
}

impl From<Error> for signature::Error {
    fn from(err: Error) -> Self {
        Self::from_source(err)
    }
}
