//! Registration circuit inputs.
//!
//! [`RegistrationCircuit`] derives everything the prover needs from a
//! [`DocumentBundle`]: the circuit name selecting the compiled artifact, the
//! private inputs and the metadata the registration contract checks.
//!
//! ```no_run
//! use emrtd_zk::circuit::{CircuitManifest, RegistrationCircuit};
//! use emrtd_zk::document::DocumentBundle;
//! use emrtd_zk::merkle::Proof;
//!
//! # fn run(bundle: &DocumentBundle, proof: &Proof, manifest: &CircuitManifest) -> emrtd_zk::Result<()> {
//! let circuit = RegistrationCircuit::new(bundle)?;
//! let entry = manifest.find(&circuit.name()?.to_string())?;
//! let inputs = circuit.inputs(&[0x2a; 31], proof, 80)?;
//! # let _ = (entry, inputs.to_json()?);
//! # Ok(())
//! # }
//! ```

mod chunks;
mod inputs;
mod manifest;
mod name;

pub use self::chunks::{
    join_chunks, pad_bits_to_fixed_blocks, split_to_chunks, ChunkedParams, EC_CHUNK_BITS,
    RSA_CHUNK_BITS,
};
pub use self::inputs::RegistrationInputs;
pub use self::manifest::{CircuitEntry, CircuitManifest};
pub use self::name::{
    aa_sig_type, chunk_count, digest_shift, doc_type_code, sig_type, AaParams, CircuitName,
};

use alloc::vec::Vec;
use log::debug;
use serde::Serialize;

use crate::config::AaConfig;
use crate::dispatcher::{certificate_dispatcher, DispatcherTag};
use crate::document::DocumentBundle;
use crate::errors::Result;
use crate::hash::HashAlgorithm;
use crate::key::PublicKey;
use crate::merkle::Proof;
use crate::signature::normalize_signature;
use crate::sod::Sod;

/// Values the registration contract checks next to the proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationMetadata {
    /// Offset of the document signer key in its TBS certificate.
    pub key_offset: usize,
    /// Offset of `notAfter` in the TBS certificate.
    pub expiration_offset: usize,
    /// Dispatcher of the document signer certificate.
    #[serde(serialize_with = "serdect::slice::serialize_hex_lower_or_bin")]
    pub certificate_dispatcher: DispatcherTag,
    /// Dispatcher of the Active Authentication data.
    #[serde(serialize_with = "serdect::slice::serialize_hex_lower_or_bin")]
    pub aa_dispatcher: DispatcherTag,
    /// Document signer key limbs.
    pub pk_chunked: Vec<alloc::string::String>,
    /// SOD signature limbs.
    pub sig_chunked: Vec<alloc::string::String>,
    /// Limbs per value.
    pub chunk_number: usize,
    /// EC field size in bits, zero for RSA.
    pub ec_field_size: usize,
}

/// A document prepared for the registration circuit.
#[derive(Debug, Clone)]
pub struct RegistrationCircuit<'a> {
    bundle: &'a DocumentBundle,
    sod: Sod,
}

impl<'a> RegistrationCircuit<'a> {
    /// Parses the SOD of `bundle`.
    pub fn new(bundle: &'a DocumentBundle) -> Result<Self> {
        Ok(Self {
            bundle,
            sod: bundle.sod()?,
        })
    }

    /// Parsed SOD.
    pub fn sod(&self) -> &Sod {
        &self.sod
    }

    /// Digest of the data group hashes and of the signed attributes.
    pub fn hash_algorithm(&self) -> Result<HashAlgorithm> {
        self.sod.signer_digest_algorithm()
    }

    fn shift_of(&self, data: &[u8], container: &[u8], name: &'static str) -> Result<usize> {
        let digest = self.hash_algorithm()?.digest(data);
        digest_shift(container, &digest, name)
    }

    /// Bit position of the DG1 digest in the encapsulated content.
    pub fn dg1_shift_bits(&self) -> Result<usize> {
        self.shift_of(
            self.bundle.dg1_bytes(),
            self.sod.encapsulated_content()?,
            "encapsulatedContent",
        )
    }

    /// Bit position of the DG15 digest in the encapsulated content.
    pub fn dg15_shift_bits(&self) -> Result<Option<usize>> {
        self.bundle
            .dg15_bytes()
            .map(|dg15| self.shift_of(dg15, self.sod.encapsulated_content()?, "encapsulatedContent"))
            .transpose()
    }

    /// Bit position of the encapsulated content digest in the signed
    /// attributes.
    pub fn encap_content_shift_bits(&self) -> Result<usize> {
        self.shift_of(
            self.sod.encapsulated_content()?,
            &self.sod.signed_attributes()?,
            "signedAttributes",
        )
    }

    /// Active Authentication part of the circuit name.
    pub fn aa_params(&self) -> Result<Option<AaParams>> {
        let (dg15, key) = match (self.bundle.dg15_bytes(), self.bundle.aa_public_key()?) {
            (Some(dg15), Some(key)) => (dg15, key),
            _ => return Ok(None),
        };
        let key_offset = self.bundle.aa_key_offset()?.unwrap_or_default();
        Ok(Some(AaParams {
            sig_type: aa_sig_type(&key)?,
            dg15_shift_bits: self.dg15_shift_bits()?.unwrap_or_default(),
            dg15_chunks: chunk_count(dg15.len(), self.hash_algorithm()?),
            key_shift_bits: key_offset * 8,
        }))
    }

    /// Name of the circuit this document registers with.
    pub fn name(&self) -> Result<CircuitName> {
        let hash = self.hash_algorithm()?;
        let name = CircuitName {
            sig_type: sig_type(
                &self.sod.signer_signature_algorithm()?,
                &self.sod.slave_public_key()?,
            )?,
            hash_bits: hash.bits(),
            doc_type: doc_type_code(self.bundle.doc_type()),
            ec_chunks: chunk_count(self.sod.encapsulated_content()?.len(), hash),
            ec_shift_bits: self.encap_content_shift_bits()?,
            dg1_shift_bits: self.dg1_shift_bits()?,
            aa: self.aa_params()?,
        };
        debug!("registration circuit {name}");
        Ok(name)
    }

    /// SOD signature normalized for the document signer key.
    pub fn normalized_signature(&self, key: &PublicKey) -> Result<Vec<u8>> {
        normalize_signature(
            self.sod.signature()?,
            &self.sod.signer_signature_algorithm()?,
            key.curve(),
        )
    }

    /// Document signer key and SOD signature in limb form.
    pub fn chunked_params(&self) -> Result<ChunkedParams> {
        let key = self.sod.slave_public_key()?;
        ChunkedParams::for_key(&key, &self.normalized_signature(&key)?)
    }

    /// Private circuit inputs.
    ///
    /// `proof` is the inclusion proof of the issuing CSCA, its siblings are
    /// padded to `depth`.
    pub fn inputs(
        &self,
        sk_identity: &[u8],
        proof: &Proof,
        depth: usize,
    ) -> Result<RegistrationInputs> {
        let chunked = self.chunked_params()?;
        let (root, branches) = RegistrationInputs::merkle_fields(proof, depth);
        Ok(RegistrationInputs {
            dg1: self.bundle.dg1_bytes().to_vec(),
            dg15: self.bundle.dg15_bytes().map(<[u8]>::to_vec),
            signed_attributes: self.sod.signed_attributes()?,
            encapsulated_content: self.sod.encapsulated_content()?.to_vec(),
            pubkey: chunked.pub_key,
            signature: chunked.signature,
            sk_identity: RegistrationInputs::sk_identity_decimal(sk_identity)?,
            slave_merkle_root: root,
            slave_merkle_inclusion_branches: branches,
        })
    }

    /// Contract-side values of the registration.
    pub fn metadata(&self, config: &AaConfig) -> Result<RegistrationMetadata> {
        let slave_bits = self.sod.slave_public_key()?.bits();
        let chunked = self.chunked_params()?;
        Ok(RegistrationMetadata {
            key_offset: self.sod.x509_key_offset()?,
            expiration_offset: self.sod.expiration_offset()?,
            certificate_dispatcher: certificate_dispatcher(self.sod.slave_certificate()?)?,
            aa_dispatcher: self.bundle.aa_data_type(slave_bits, config)?,
            pk_chunked: chunked.pub_key,
            sig_chunked: chunked.signature,
            chunk_number: chunked.chunk_number,
            ec_field_size: chunked.ec_field_size,
        })
    }
}
