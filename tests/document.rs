//! Document bundles: persistence envelope and Active Authentication views.

mod support;

use std::sync::OnceLock;

use emrtd_zk::config::{AaConfig, HashFlagPolicy};
use emrtd_zk::document::PersonDetails;
use emrtd_zk::errors::ErrorKind;
use emrtd_zk::{DocType, DocumentBundle, PublicKey};
use support::{AaDocument, Fixture};

fn fixture() -> &'static Fixture {
    static FIXTURE: OnceLock<Fixture> = OnceLock::new();
    FIXTURE.get_or_init(Fixture::new)
}

fn aa_bundle(fx: &Fixture, aa: &AaDocument) -> DocumentBundle {
    DocumentBundle::new(
        aa.sod.clone(),
        fx.dg1.clone(),
        Some(aa.dg15.clone()),
        Some(vec![0x6B, 0x03, 0x5C, 0x01, 0x00]),
        Some(aa.aa_signature.clone()),
    )
    .unwrap()
}

#[test]
fn passport_details_from_mrz() {
    let fx = fixture();
    let bundle = DocumentBundle::new(fx.sod.clone(), fx.dg1.clone(), None, None, None).unwrap();
    assert_eq!(bundle.doc_type(), DocType::Passport);

    let details = bundle.person_details();
    assert_eq!(details.last_name.as_deref(), Some("ERIKSSON"));
    assert_eq!(details.first_name.as_deref(), Some("ANNA MARIA"));
    assert_eq!(details.document_number.as_deref(), Some("L898902C3"));
    assert_eq!(details.birth_date.as_deref(), Some("740812"));
    assert_eq!(details.expiry_date.as_deref(), Some("120415"));
    assert_eq!(details.gender.as_deref(), Some("F"));
    assert_eq!(details.nationality.as_deref(), Some("UTO"));
}

#[test]
fn envelope_round_trip() {
    let fx = fixture();
    let aa = AaDocument::new(fx);
    let bundle = aa_bundle(fx, &aa).with_person_details(PersonDetails {
        passport_image_raw: Some("aGVsbG8=".into()),
        ..PersonDetails::default()
    });

    let json = bundle.to_json().unwrap();
    let restored = DocumentBundle::from_json(&json).unwrap();
    assert_eq!(restored, bundle);
    assert_eq!(restored.sod_bytes(), aa.sod.as_slice());
    assert_eq!(restored.dg15_bytes(), Some(aa.dg15.as_slice()));
    assert_eq!(restored.aa_signature(), Some(aa.aa_signature.as_slice()));
    assert_eq!(
        restored.person_details().passport_image_raw.as_deref(),
        Some("aGVsbG8=")
    );
}

#[test]
fn unknown_version_is_malformed() {
    let fx = fixture();
    let bundle = DocumentBundle::new(fx.sod.clone(), fx.dg1.clone(), None, None, None).unwrap();
    let json = bundle.to_json().unwrap().replace("\"version\":1", "\"version\":7");
    let err = DocumentBundle::from_json(&json).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedInput);
}

#[test]
fn rsa_active_authentication() {
    let fx = fixture();
    let aa = AaDocument::new(fx);
    let bundle = aa_bundle(fx, &aa);

    match bundle.aa_public_key().unwrap() {
        Some(PublicKey::Rsa(key)) => assert_eq!(key, aa.aa_key.public),
        other => panic!("unexpected AA key {other:?}"),
    }
    assert_eq!(bundle.aa_signature_normalized().unwrap(), aa.aa_signature);
    assert_eq!(
        bundle.aa_public_key_bytes(&AaConfig::default()).unwrap(),
        Some(aa.aa_key.public.modulus_bytes())
    );
    let offset = bundle.aa_key_offset().unwrap().unwrap();
    let modulus = aa.aa_key.public.modulus_bytes();
    assert_eq!(&aa.dg15[offset..offset + modulus.len()], modulus.as_slice());
}

#[test]
fn unknown_hash_flag_follows_policy() {
    let fx = fixture();
    let aa = AaDocument::new(fx);
    let bundle = DocumentBundle::new(
        aa.sod.clone(),
        fx.dg1.clone(),
        Some(aa.dg15.clone()),
        None,
        Some(support::aa_signature(&aa.aa_key, &[0x99])),
    )
    .unwrap();

    let compatible = AaConfig::default();
    assert_eq!(
        bundle.aa_data_type(2048, &compatible).unwrap(),
        emrtd_zk::dispatcher::dispatcher_tag("P_RSA_SHA256_2688")
    );

    let strict = AaConfig {
        hash_flag_policy: HashFlagPolicy::Strict,
        ..AaConfig::default()
    };
    let err = bundle.aa_data_type(2048, &strict).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedAlgorithm);
}
