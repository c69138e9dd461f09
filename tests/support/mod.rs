//! Synthetic documents and certificates for integration tests.
//!
//! WARNING: the keys produced here are small, deterministic and generated
//! for test speed only.

#![allow(dead_code)]

use std::str::FromStr;
use std::time::Duration;

use cms::cert::{CertificateChoices, IssuerAndSerialNumber};
use cms::content_info::{CmsVersion, ContentInfo};
use cms::signed_data::{
    CertificateSet, EncapsulatedContentInfo, SignedData, SignerIdentifier, SignerInfo, SignerInfos,
};
use der::asn1::{Any, BitString, Null, ObjectIdentifier, OctetString, SetOfVec, UtcTime};
use der::{Decode, Encode, Sequence, Tag};
use hex_literal::hex;
use emrtd_zk::curve::NamedCurve;
use emrtd_zk::hash::HashAlgorithm;
use emrtd_zk::key::EcPublicKey;
use emrtd_zk::oid;
use emrtd_zk::signature::encode_ecdsa_der;
use emrtd_zk::traits::PublicKeyParts;
use emrtd_zk::{BigUint, RsaPublicKey};
use num_bigint::{ModInverse, RandPrime};
use num_traits::One;
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;
use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use x509_cert::attr::Attribute;
use x509_cert::certificate::{Certificate, TbsCertificate, Version};
use x509_cert::ext::pkix::{AuthorityKeyIdentifier, SubjectKeyIdentifier};
use x509_cert::ext::Extension;
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::time::{Time, Validity};

pub const ID_CONTENT_TYPE: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.3");

/// `2025-01-01T00:00:00Z` and `2035-01-01T00:00:00Z`.
pub const NOT_BEFORE: u64 = 1_735_689_600;
pub const NOT_AFTER: u64 = 2_051_222_400;

pub const TD3_MRZ: &str = "P<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<<<<\
                           L898902C36UTO7408122F1204159ZE184226B<<<<<10";

/// RSA key pair with `e = 65537`.
#[derive(Clone, Debug)]
pub struct RsaKeyPair {
    pub public: RsaPublicKey,
    pub d: BigUint,
}

impl RsaKeyPair {
    pub fn generate(seed: u8, bits: usize) -> Self {
        let mut rng = ChaCha8Rng::from_seed([seed; 32]);
        let e = BigUint::from(65537u32);
        loop {
            let p: BigUint = rng.gen_prime(bits / 2);
            let q: BigUint = rng.gen_prime(bits / 2);
            let n = &p * &q;
            if p == q || n.bits() != bits {
                continue;
            }
            let phi = (&p - BigUint::one()) * (&q - BigUint::one());
            if let Some(d) = (&e).mod_inverse(&phi).and_then(|d| d.to_biguint()) {
                let public = RsaPublicKey::new(n, e).unwrap();
                return Self { public, d };
            }
        }
    }

    /// `sha256WithRSAEncryption` signature of `msg`.
    pub fn sign(&self, msg: &[u8]) -> Vec<u8> {
        self.sign_digest(HashAlgorithm::Sha256, &HashAlgorithm::Sha256.digest(msg))
    }

    pub fn sign_digest(&self, hash: HashAlgorithm, digest: &[u8]) -> Vec<u8> {
        let k = self.public.size();
        let prefix = hash.asn1_prefix();
        let t_len = prefix.len() + digest.len();
        let mut em = vec![0xFF; k];
        em[0] = 0;
        em[1] = 1;
        em[k - t_len - 1] = 0;
        em[k - t_len..k - digest.len()].copy_from_slice(prefix);
        em[k - digest.len()..].copy_from_slice(digest);

        let s = BigUint::from_bytes_be(&em).modpow(&self.d, self.public.n());
        left_pad(&s.to_bytes_be(), k)
    }

    pub fn spki(&self) -> SubjectPublicKeyInfoOwned {
        let n = self.public.n().to_bytes_be();
        let e = self.public.e().to_bytes_be();
        let key = pkcs1::RsaPublicKey {
            modulus: pkcs1::UintRef::new(&n).unwrap(),
            public_exponent: pkcs1::UintRef::new(&e).unwrap(),
        };
        SubjectPublicKeyInfoOwned {
            algorithm: AlgorithmIdentifierOwned {
                oid: oid::RSA_ENCRYPTION,
                parameters: Some(Any::encode_from(&Null).unwrap()),
            },
            subject_public_key: BitString::from_bytes(&key.to_der().unwrap()).unwrap(),
        }
    }
}

/// Modulus of [`RsaKeyPair::pinned`].
pub const PINNED_MODULUS: [u8; 256] = hex!(
    "92459d71481c4f8da31917e14d873572fc616e6edbd4d18e437da951934ad1b9"
    "19574152ea04b3ca059466ae04e606362ed0d02da548b07d3543468123db0c8c"
    "bd4c1003933c050902f93e152913cb1d0b1b5599937ab92a15a68f2b96214876"
    "3fd617787b2cca3fbdcfc57fd002545f1ca7ab68e40bf8a8295b965466842715"
    "c198b4013b76b1c9e34ec58cf19dd967a2db8e38e9d5ad4e2b6ca903acf986b6"
    "6b2e0282292f7c2848dffbd2f20c1dcd8afc334a526ffaf212930cb136a009ae"
    "d8eba047dd597d959516fbb0fef8bf4829559a13f79276e93b46d6a947d0b2d0"
    "fce96a36d519fb5e39c8005b73ef08cc1b0e0546b93400f4a79d5f565d98acbf"
);

const PINNED_PRIVATE_EXPONENT: [u8; 256] = hex!(
    "0689d1175abb553d0610dd95e722c79b5bb7b939805f1b7ce9fc6880aa7e5a30"
    "9576e6871fc9d5058f494a6bb5f1584ebcb9fdcc448aa2c4fe0803534b7883af"
    "98d89910a7d8b37aeb249c07531e3ce28ff8095403992544c1d1ffad59992445"
    "90e5ef87a5ade35e850c100e7e0c549c29ca3ee9c1e3dd1a1b3b2a559c7d84c7"
    "ad626d31402cc3d7b5af913e5b82173af00d5b64e7e0efa63895a46ebcf59f0c"
    "a97c4f12f99303be10cb140e86362ed30951c697a0bf94242448c20713807dcc"
    "79a4613093e8de9c1a7cffcfd65a3da3622a7c2b5c24b54edb0e82cc12f70e05"
    "ac9280f60d5378431e289bb0417adb4ae164ec0d71c23188d49b90180b74de91"
);

impl RsaKeyPair {
    /// Fixed 2048 bit key, so TBS layouts and index keys can be compared
    /// against precomputed values.
    pub fn pinned() -> Self {
        let n = BigUint::from_bytes_be(&PINNED_MODULUS);
        let public = RsaPublicKey::new(n, BigUint::from(65537u32)).unwrap();
        Self {
            public,
            d: BigUint::from_bytes_be(&PINNED_PRIVATE_EXPONENT),
        }
    }
}

/// Key able to sign certificates and SOD signer infos with SHA-256.
pub trait SigningKey {
    fn public_key_info(&self) -> SubjectPublicKeyInfoOwned;
    /// `signatureAlgorithm` of certificates signed with this key.
    fn certificate_algorithm(&self) -> AlgorithmIdentifierOwned;
    /// `signatureAlgorithm` of signer infos signed with this key.
    fn signer_info_algorithm(&self) -> AlgorithmIdentifierOwned;
    fn sign_message(&self, msg: &[u8]) -> Vec<u8>;
}

impl SigningKey for RsaKeyPair {
    fn public_key_info(&self) -> SubjectPublicKeyInfoOwned {
        self.spki()
    }

    fn certificate_algorithm(&self) -> AlgorithmIdentifierOwned {
        sha256_with_rsa()
    }

    fn signer_info_algorithm(&self) -> AlgorithmIdentifierOwned {
        AlgorithmIdentifierOwned {
            oid: oid::RSA_ENCRYPTION,
            parameters: Some(Any::encode_from(&Null).unwrap()),
        }
    }

    fn sign_message(&self, msg: &[u8]) -> Vec<u8> {
        self.sign(msg)
    }
}

/// Private scalar of [`EcFixture::csca_key`].
pub const EC_CSCA_SCALAR: [u8; 32] =
    hex!("3bc76aae5cb55c446a59dcc0b4eabfcbab4c0a0cb42d3cbfe928076fa4511811");

/// Private scalar of [`EcFixture::signer_key`].
pub const EC_SIGNER_SCALAR: [u8; 32] =
    hex!("4a068129ab66f17999605e64fc45d02725c0c59adf191d3937857bb29e011e18");

/// ECDSA key pair.
#[derive(Clone, Debug)]
pub struct EcKeyPair {
    pub public: EcPublicKey,
    pub d: BigUint,
}

impl EcKeyPair {
    pub fn new(curve: NamedCurve, scalar: &[u8]) -> Self {
        let d = BigUint::from_bytes_be(scalar);
        let arithmetic = curve.arithmetic();
        let q = arithmetic.mul(&d, arithmetic.generator());
        Self {
            public: EcPublicKey::new(curve, q).unwrap(),
            d,
        }
    }

    pub fn curve(&self) -> NamedCurve {
        self.public.curve()
    }

    /// `(r, s)` over `digest` with a nonce derived from the key and the
    /// digest. `s` is always taken from the upper half of the group order,
    /// as some document signers do.
    pub fn sign_digest(&self, digest: &[u8]) -> (BigUint, BigUint) {
        let curve = self.curve();
        let arithmetic = curve.arithmetic();
        let n = arithmetic.n();

        let mut seed = self.d.to_bytes_be();
        seed.extend_from_slice(digest);
        let k = BigUint::from_bytes_be(&HashAlgorithm::Sha256.digest(&seed)) % n;

        let point = arithmetic.mul(&k, arithmetic.generator());
        let (x, _) = point.coordinates().unwrap();
        let r = x % n;
        let excess = (digest.len() * 8).saturating_sub(curve.order_bits());
        let e = (BigUint::from_bytes_be(digest) >> excess) % n;
        let k_inv = (&k).mod_inverse(n).and_then(|v| v.to_biguint()).unwrap();
        let s = (k_inv * ((e + &r * &self.d) % n)) % n;
        let s_neg = n - &s;
        (r, std::cmp::max(s, s_neg))
    }

    pub fn spki(&self) -> SubjectPublicKeyInfoOwned {
        SubjectPublicKeyInfoOwned {
            algorithm: AlgorithmIdentifierOwned {
                oid: oid::ID_EC_PUBLIC_KEY,
                parameters: Some(Any::encode_from(&self.curve().oid()).unwrap()),
            },
            subject_public_key: BitString::from_bytes(&self.public.to_sec1_bytes().unwrap())
                .unwrap(),
        }
    }
}

impl SigningKey for EcKeyPair {
    fn public_key_info(&self) -> SubjectPublicKeyInfoOwned {
        self.spki()
    }

    fn certificate_algorithm(&self) -> AlgorithmIdentifierOwned {
        AlgorithmIdentifierOwned {
            oid: oid::ECDSA_WITH_SHA256,
            parameters: None,
        }
    }

    fn signer_info_algorithm(&self) -> AlgorithmIdentifierOwned {
        self.certificate_algorithm()
    }

    /// DER `Ecdsa-Sig-Value` over the SHA-256 digest of `msg`.
    fn sign_message(&self, msg: &[u8]) -> Vec<u8> {
        let (r, s) = self.sign_digest(&HashAlgorithm::Sha256.digest(msg));
        encode_ecdsa_der(&r, &s).unwrap()
    }
}

pub fn left_pad(bytes: &[u8], len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len - bytes.len()];
    out.extend_from_slice(bytes);
    out
}

fn sha256_with_rsa() -> AlgorithmIdentifierOwned {
    AlgorithmIdentifierOwned {
        oid: oid::SHA256_WITH_RSA,
        parameters: Some(Any::encode_from(&Null).unwrap()),
    }
}

fn extension<T: Encode + der::oid::AssociatedOid>(value: &T) -> Extension {
    Extension {
        extn_id: T::OID,
        critical: false,
        extn_value: OctetString::new(value.to_der().unwrap()).unwrap(),
    }
}

/// Certificate template.
#[derive(Clone, Debug)]
pub struct CertSpec {
    pub subject: Name,
    pub issuer: Name,
    pub serial: u8,
    pub spki: SubjectPublicKeyInfoOwned,
    pub ski: Option<Vec<u8>>,
    pub aki: Option<Vec<u8>>,
}

impl CertSpec {
    /// Signs the certificate with `issuer_key`.
    pub fn sign(&self, issuer_key: &impl SigningKey) -> Certificate {
        let mut extensions = Vec::new();
        if let Some(ski) = &self.ski {
            extensions.push(extension(&SubjectKeyIdentifier(
                OctetString::new(ski.clone()).unwrap(),
            )));
        }
        if let Some(aki) = &self.aki {
            extensions.push(extension(&AuthorityKeyIdentifier {
                key_identifier: Some(OctetString::new(aki.clone()).unwrap()),
                authority_cert_issuer: None,
                authority_cert_serial_number: None,
            }));
        }

        let tbs = TbsCertificate {
            version: Version::V3,
            serial_number: SerialNumber::new(&[self.serial]).unwrap(),
            signature: issuer_key.certificate_algorithm(),
            issuer: self.issuer.clone(),
            validity: Validity {
                not_before: Time::UtcTime(
                    UtcTime::from_unix_duration(Duration::from_secs(NOT_BEFORE)).unwrap(),
                ),
                not_after: Time::UtcTime(
                    UtcTime::from_unix_duration(Duration::from_secs(NOT_AFTER)).unwrap(),
                ),
            },
            subject: self.subject.clone(),
            subject_public_key_info: self.spki.clone(),
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: if extensions.is_empty() {
                None
            } else {
                Some(extensions)
            },
        };

        let signature = issuer_key.sign_message(&tbs.to_der().unwrap());
        Certificate {
            tbs_certificate: tbs,
            signature_algorithm: issuer_key.certificate_algorithm(),
            signature: BitString::from_bytes(&signature).unwrap(),
        }
    }
}

/// Self-signed CSCA.
pub fn csca(name: &str, key: &impl SigningKey, ski: &[u8]) -> Certificate {
    let name = Name::from_str(name).unwrap();
    CertSpec {
        subject: name.clone(),
        issuer: name,
        serial: 1,
        spki: key.public_key_info(),
        ski: Some(ski.to_vec()),
        aki: Some(ski.to_vec()),
    }
    .sign(key)
}

/// Document signer issued by `issuer`.
pub fn document_signer(
    issuer: &Certificate,
    issuer_key: &impl SigningKey,
    aki: &[u8],
    key: &impl SigningKey,
) -> Certificate {
    CertSpec {
        subject: Name::from_str("CN=Document Signer,C=UT").unwrap(),
        issuer: issuer.tbs_certificate.subject.clone(),
        serial: 2,
        spki: key.public_key_info(),
        ski: Some(vec![0xD5; 20]),
        aki: Some(aki.to_vec()),
    }
    .sign(issuer_key)
}

#[derive(Sequence)]
struct DataGroupHash {
    number: u8,
    hash: OctetString,
}

#[derive(Sequence)]
struct LdsSecurityObject {
    version: u8,
    hash_algorithm: AlgorithmIdentifierOwned,
    hashes: Vec<DataGroupHash>,
}

/// DER `LDSSecurityObject` over SHA-256 data group hashes.
pub fn lds_security_object(groups: &[(u8, &[u8])]) -> Vec<u8> {
    LdsSecurityObject {
        version: 0,
        hash_algorithm: AlgorithmIdentifierOwned {
            oid: oid::ID_SHA256,
            parameters: None,
        },
        hashes: groups
            .iter()
            .map(|(number, bytes)| DataGroupHash {
                number: *number,
                hash: OctetString::new(HashAlgorithm::Sha256.digest(bytes)).unwrap(),
            })
            .collect(),
    }
    .to_der()
    .unwrap()
}

fn attribute(oid: ObjectIdentifier, value: Any) -> Attribute {
    Attribute {
        oid,
        values: SetOfVec::try_from(vec![value]).unwrap(),
    }
}

/// EF.SOD signed by `signer_key`, carrying `signer` as `certificates[0]`.
pub fn sod(signer: &Certificate, signer_key: &impl SigningKey, groups: &[(u8, &[u8])]) -> Vec<u8> {
    let lds = lds_security_object(groups);
    let signed_attrs = SetOfVec::try_from(vec![
        attribute(ID_CONTENT_TYPE, Any::encode_from(&oid::ID_LDS_SECURITY_OBJECT).unwrap()),
        attribute(
            oid::ID_MESSAGE_DIGEST,
            Any::encode_from(&OctetString::new(HashAlgorithm::Sha256.digest(&lds)).unwrap())
                .unwrap(),
        ),
    ])
    .unwrap();
    let signature = signer_key.sign_message(&signed_attrs.to_der().unwrap());

    let sha256 = AlgorithmIdentifierOwned {
        oid: oid::ID_SHA256,
        parameters: None,
    };
    let signer_info = SignerInfo {
        version: CmsVersion::V1,
        sid: SignerIdentifier::IssuerAndSerialNumber(IssuerAndSerialNumber {
            issuer: signer.tbs_certificate.issuer.clone(),
            serial_number: signer.tbs_certificate.serial_number.clone(),
        }),
        digest_alg: sha256.clone(),
        signed_attrs: Some(signed_attrs),
        signature_algorithm: signer_key.signer_info_algorithm(),
        signature: OctetString::new(signature).unwrap(),
        unsigned_attrs: None,
    };

    let signed_data = SignedData {
        version: CmsVersion::V3,
        digest_algorithms: SetOfVec::try_from(vec![sha256]).unwrap(),
        encap_content_info: EncapsulatedContentInfo {
            econtent_type: oid::ID_LDS_SECURITY_OBJECT,
            econtent: Some(Any::new(Tag::OctetString, lds).unwrap()),
        },
        certificates: Some(
            CertificateSet(SetOfVec::try_from(vec![CertificateChoices::Certificate(signer.clone())]).unwrap()),
        ),
        crls: None,
        signer_infos: SignerInfos(SetOfVec::try_from(vec![signer_info]).unwrap()),
    };

    let content_info = ContentInfo {
        content_type: oid::ID_SIGNED_DATA,
        content: Any::encode_from(&signed_data).unwrap(),
    };
    wrap(0x77, &content_info.to_der().unwrap())
}

/// ICAO master list holding `certs`.
pub fn master_list(certs: &[Certificate]) -> Vec<u8> {
    let mut list = Vec::new();
    for cert in certs {
        list.extend_from_slice(&cert.to_der().unwrap());
    }

    #[derive(Sequence)]
    struct MasterList {
        version: u8,
        cert_list: Any,
    }
    let body = MasterList {
        version: 0,
        cert_list: Any::new(Tag::Set, list).unwrap(),
    }
    .to_der()
    .unwrap();

    let signed_data = SignedData {
        version: CmsVersion::V3,
        digest_algorithms: SetOfVec::new(),
        encap_content_info: EncapsulatedContentInfo {
            econtent_type: oid::ID_CSCA_MASTER_LIST,
            econtent: Some(Any::new(Tag::OctetString, body).unwrap()),
        },
        certificates: None,
        crls: None,
        signer_infos: SignerInfos(SetOfVec::new()),
    };
    ContentInfo {
        content_type: oid::ID_SIGNED_DATA,
        content: Any::encode_from(&signed_data).unwrap(),
    }
    .to_der()
    .unwrap()
}

/// Prepends a one byte tag and a DER length.
pub fn wrap(tag: u8, body: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    let len = body.len();
    if len < 0x80 {
        out.push(len as u8);
    } else if len <= 0xFF {
        out.extend_from_slice(&[0x81, len as u8]);
    } else {
        out.extend_from_slice(&[0x82, (len >> 8) as u8, len as u8]);
    }
    out.extend_from_slice(body);
    out
}

/// DG1 of the ICAO TD3 specimen.
pub fn td3_dg1() -> Vec<u8> {
    wrap(0x61, &wrap_mrz(TD3_MRZ))
}

fn wrap_mrz(mrz: &str) -> Vec<u8> {
    let mut out = vec![0x5F, 0x1F, mrz.len() as u8];
    out.extend_from_slice(mrz.as_bytes());
    out
}

/// DG15 holding `key`.
pub fn dg15(key: &RsaKeyPair) -> Vec<u8> {
    wrap(0x6F, &key.spki().to_der().unwrap())
}

/// Full fixture: three CSCAs, a document signer issued by the second one
/// and a passport SOD over DG1.
pub struct Fixture {
    pub csca_keys: Vec<RsaKeyPair>,
    pub cscas: Vec<Certificate>,
    pub signer_key: RsaKeyPair,
    pub signer: Certificate,
    pub dg1: Vec<u8>,
    pub sod: Vec<u8>,
}

pub const SKIS: [[u8; 20]; 3] = [[0xA1; 20], [0xB2; 20], [0xC3; 20]];

impl Fixture {
    pub fn new() -> Self {
        let csca_keys: Vec<_> = (0..3).map(|i| RsaKeyPair::generate(10 + i, 1024)).collect();
        let cscas: Vec<_> = ["CN=CSCA A,C=UT", "CN=CSCA B,C=UT", "CN=CSCA C,C=UT"]
            .iter()
            .zip(&csca_keys)
            .zip(&SKIS)
            .map(|((name, key), ski)| csca(name, key, ski))
            .collect();

        let signer_key = RsaKeyPair::generate(1, 2048);
        let signer = document_signer(&cscas[1], &csca_keys[1], &SKIS[1], &signer_key);
        let dg1 = td3_dg1();
        let sod = sod(&signer, &signer_key, &[(1, &dg1)]);

        Self {
            csca_keys,
            cscas,
            signer_key,
            signer,
            dg1,
            sod,
        }
    }
}

pub const EC_CSCA_SKI: [u8; 20] = [0xE1; 20];

/// X and Y of the [`EcFixture`] document signer key.
pub const EC_SIGNER_X: [u8; 32] =
    hex!("0b6ad9dc421fe4dc129f455509dae9799e90778e8c0407ca5b8dd6b2a2cce56f");
pub const EC_SIGNER_Y: [u8; 32] =
    hex!("574433654d8aaccd3f66c9b66c5aab7b91b372971422fde1c0f321a1542012af");

/// P-256 fixture: a CSCA, a document signer it issued with ECDSA and a
/// passport SOD over DG1 signed by the document signer.
pub struct EcFixture {
    pub csca_key: EcKeyPair,
    pub csca: Certificate,
    pub signer_key: EcKeyPair,
    pub signer: Certificate,
    pub dg1: Vec<u8>,
    pub sod: Vec<u8>,
}

impl EcFixture {
    pub fn new() -> Self {
        let csca_key = EcKeyPair::new(NamedCurve::P256, &EC_CSCA_SCALAR);
        let csca = csca("CN=CSCA EC,C=UT", &csca_key, &EC_CSCA_SKI);
        let signer_key = EcKeyPair::new(NamedCurve::P256, &EC_SIGNER_SCALAR);
        let signer = document_signer(&csca, &csca_key, &EC_CSCA_SKI, &signer_key);
        let dg1 = td3_dg1();
        let sod = sod(&signer, &signer_key, &[(1, &dg1)]);

        Self {
            csca_key,
            csca,
            signer_key,
            signer,
            dg1,
            sod,
        }
    }
}

/// Decodes a certificate, for round trips through DER.
pub fn reparse(cert: &Certificate) -> Certificate {
    Certificate::from_der(&cert.to_der().unwrap()).unwrap()
}

/// ISO/IEC 9796-2 style Active Authentication signature whose recovered
/// message ends in `trailer`.
pub fn aa_signature(key: &RsaKeyPair, trailer: &[u8]) -> Vec<u8> {
    let k = key.public.size();
    let mut m = vec![0x5A; k - 1];
    m[0] = 0x6A;
    let end = m.len();
    m[end - trailer.len()..].copy_from_slice(trailer);
    let s = BigUint::from_bytes_be(&m).modpow(&key.d, key.public.n());
    left_pad(&s.to_bytes_be(), k)
}

/// Fixture documents with Active Authentication.
pub struct AaDocument {
    pub aa_key: RsaKeyPair,
    pub dg15: Vec<u8>,
    pub aa_signature: Vec<u8>,
    pub sod: Vec<u8>,
}

impl AaDocument {
    pub fn new(fx: &Fixture) -> Self {
        let aa_key = RsaKeyPair::generate(77, 1024);
        let dg15 = dg15(&aa_key);
        let aa_signature = aa_signature(&aa_key, &[0xBC]);
        let sod = sod(&fx.signer, &fx.signer_key, &[(1, &fx.dg1), (15, &dg15)]);
        Self {
            aa_key,
            dg15,
            aa_signature,
            sod,
        }
    }
}
