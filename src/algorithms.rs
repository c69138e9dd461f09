//! Useful algorithms related to RSA, ECDSA and ISO/IEC 9796-2.

pub(crate) mod ecdsa;
pub(crate) mod iso9796;
pub(crate) mod mgf;
pub(crate) mod pad;
pub(crate) mod pkcs1v15;
pub(crate) mod pss;
pub(crate) mod rsa;
