#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # Usage
//!
//! Authenticate a scanned passport against a CSCA master list and derive
//! the registration circuit inputs:
//!
//! ```no_run
//! use emrtd_zk::circuit::RegistrationCircuit;
//! use emrtd_zk::config::Config;
//! use emrtd_zk::document::DocumentBundle;
//! use emrtd_zk::merkle::csca_tree;
//! use emrtd_zk::trust::{resolve_issuer, CscaSet};
//!
//! # fn run(bundle: DocumentBundle, master_list: &[u8]) -> emrtd_zk::Result<()> {
//! let config = Config::default();
//! let cscas = CscaSet::from_bytes(master_list)?;
//!
//! let sod = bundle.sod()?;
//! sod.verify_signer()?;
//! let csca = resolve_issuer(sod.slave_certificate()?, &cscas, &config.trust)?;
//!
//! let tree = csca_tree(&cscas, config.merkle.depth, config.merkle.hasher)?;
//! let proof = tree.prove_inclusion(&emrtd_zk::merkle::csca_leaf(csca).0)?;
//!
//! let circuit = RegistrationCircuit::new(&bundle)?;
//! let inputs = circuit.inputs(&[0x01; 31], &proof, config.merkle.depth)?;
//! println!("{}: {}", circuit.name()?, inputs.to_json()?);
//! # Ok(())
//! # }
//! ```
//!
//! # Logging
//!
//! Decisions are reported through the [`log`] facade: `debug!` for selected
//! algorithms, issuers and circuits, `trace!` for offsets and `warn!` for
//! permissive fallbacks. The crate never installs a logger.

#[cfg(doctest)]
pub struct ReadmeDoctests;

extern crate alloc;

pub use num_bigint::BigUint;

mod algorithms;
pub mod circuit;
pub mod config;
pub mod curve;
pub mod dg1;
pub mod dispatcher;
pub mod document;
pub mod encoding;
pub mod errors;
pub mod hash;
pub mod key;
pub mod merkle;
pub mod oid;
pub mod poseidon;
pub mod signature;
pub mod sod;
pub mod tbs;
pub mod traits;
pub mod trust;

pub use cms;
pub use der;
pub use x509_cert;

pub use crate::{
    config::Config,
    document::{DocType, DocumentBundle},
    errors::{Error, ErrorKind, Result},
    hash::HashAlgorithm,
    key::{EcPublicKey, PublicKey, RsaPublicKey},
    sod::Sod,
};

#[cfg(feature = "hazmat")]
pub mod hazmat;
