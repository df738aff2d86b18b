#![allow(clippy::unwrap_used, clippy::expect_used)]

use keywrap_crypto::CryptoError;
use keywrap_logger::log_init;
use openssl::rand::rand_bytes;

use crate::{Keystore, KeystoreError, WrappingAlgorithm};

fn assert_not_found(keystore: &Keystore, name: &str, kek: &[u8]) {
    assert!(
        matches!(
            keystore.get(name, kek).unwrap_err(),
            KeystoreError::KeyNotFound(_)
        ),
        "getting {name} should fail with KeyNotFound"
    );
}

#[test]
fn test_keystore_round_trip() {
    log_init(option_env!("RUST_LOG"));
    let kek = b"Test kek, len 16";
    let key = b"I am an encrypted key.";

    let mut keystore = Keystore::new();
    assert_not_found(&keystore, "keyname", kek);

    keystore.set("keyname", key, kek).unwrap();
    assert!(keystore.contains("keyname"));
    assert_eq!(keystore.len(), 1);
    assert_eq!(
        keystore.algorithm("keyname"),
        Some(WrappingAlgorithm::Rfc5649)
    );
    assert_eq!(*keystore.get("keyname", kek).unwrap(), key.to_vec());

    keystore.delete("keyname").unwrap();
    assert!(keystore.is_empty());
    assert_not_found(&keystore, "keyname", kek);
    assert!(matches!(
        keystore.delete("keyname").unwrap_err(),
        KeystoreError::KeyNotFound(_)
    ));
}

#[test]
fn test_keystore_round_trip_table() {
    let cases: [(&str, &[u8], &[u8]); 4] = [
        ("8ByteKey", b"12345678", b"0123456789ABCDEF"),
        ("16ByteKey", b"16 Byte long key", b"16 Byte long kek"),
        ("7ByteKey", b"1234567", b"0123456789ABCDEF"),
        ("9ByteKey", b"123456789", b"0123456789ABCDEF"),
    ];

    for (name, value, kek) in cases {
        let mut keystore = Keystore::new();
        assert_not_found(&keystore, name, kek);

        keystore.set(name, value, kek).unwrap();
        assert_eq!(
            *keystore.get(name, kek).unwrap(),
            value.to_vec(),
            "round trip of {name}"
        );
        assert_eq!(
            keystore.wrapped_key(name).unwrap().len(),
            value.len().div_ceil(8) * 8 + 8
        );

        keystore.delete(name).unwrap();
        assert_not_found(&keystore, name, kek);
    }
}

#[test]
fn test_keystore_round_trip_random() {
    let kek = b"0123456789ABCDEF";
    let mut random_key = [0_u8; 256];

    for len in 1..random_key.len() {
        rand_bytes(&mut random_key).unwrap();
        let value = &random_key[..len];

        let mut keystore = Keystore::new();
        assert_not_found(&keystore, "keyname", kek);
        keystore.set("keyname", value, kek).unwrap();
        assert_eq!(
            *keystore.get("keyname", kek).unwrap(),
            value,
            "round trip of {len} bytes"
        );
        keystore.delete("keyname").unwrap();
        assert_not_found(&keystore, "keyname", kek);
    }
}

#[test]
fn test_keystore_get_errors() {
    let mut keystore = Keystore::new();
    keystore
        .set("present", b"test", b"0123456789012345")
        .unwrap();

    assert!(matches!(
        keystore.get("", &[]).unwrap_err(),
        KeystoreError::InvalidInput(_)
    ));
    assert!(matches!(
        keystore.get("not present", &[]).unwrap_err(),
        KeystoreError::Crypto(CryptoError::InvalidKeyLength(_))
    ));
    assert_not_found(&keystore, "not present", b"0123456789012345");
    assert!(matches!(
        keystore
            .get("present", b"this key is not 16 bytes long")
            .unwrap_err(),
        KeystoreError::Crypto(CryptoError::InvalidKeyLength(_))
    ));
    // wrong KEK of the right size
    let err = keystore.get("present", b"012345678901234-").unwrap_err();
    assert!(err.is_integrity_failure(), "{err}");

    // the entry survives failed reads
    assert_eq!(
        *keystore.get("present", b"0123456789012345").unwrap(),
        b"test".to_vec()
    );
}

#[test]
fn test_keystore_set() {
    let cases: [(&str, &[u8], &[u8]); 5] = [
        ("16ByteKey", b"16 Byte long key", b"16 Byte long kek"),
        ("8ByteKey", b"12345678", b"0123456789ABCDEF"),
        ("7ByteKey", b"1234567", b"0123456789ABCDEF"),
        ("9ByteKey", b"123456789", b"0123456789ABCDEF"),
        (
            "AES256Kek",
            b"a key wrapped under a 256-bit KEK",
            b"0123456789ABCDEF0123456789ABCDEF",
        ),
    ];

    let mut keystore = Keystore::new();
    for (name, value, kek) in cases {
        keystore.set(name, value, kek).unwrap();
    }
    assert_eq!(keystore.len(), cases.len());
    for (name, value, kek) in cases {
        assert_eq!(*keystore.get(name, kek).unwrap(), value.to_vec());
    }
}

#[test]
fn test_keystore_overwrite() {
    let kek = [0x01_u8; 24];
    let other_kek = [0x02_u8; 24];

    let mut keystore = Keystore::new();
    keystore.set("rotating", b"first value", &kek).unwrap();
    keystore.set("rotating", b"second value", &other_kek).unwrap();
    assert_eq!(keystore.len(), 1);

    // the previous KEK no longer opens the entry
    assert!(keystore.get("rotating", &kek).unwrap_err().is_integrity_failure());
    assert_eq!(
        *keystore.get("rotating", &other_kek).unwrap(),
        b"second value".to_vec()
    );
}

#[test]
fn test_keystore_tampered_entry() {
    log_init(option_env!("RUST_LOG"));
    let kek = [0x5C_u8; 32];
    let mut keystore = Keystore::new();
    keystore.set("victim", b"0123456789abcdef0123", &kek).unwrap();

    let wrapped = keystore.wrapped_key("victim").unwrap().to_vec();
    for bit in 0..wrapped.len() * 8 {
        let mut tampered = wrapped.clone();
        tampered[bit / 8] ^= 1_u8 << (bit % 8);
        keystore
            .import_wrapped("victim", WrappingAlgorithm::Rfc5649, tampered)
            .unwrap();
        assert!(
            keystore.get("victim", &kek).unwrap_err().is_integrity_failure(),
            "bit {bit} flipped"
        );
    }

    // truncated storage
    keystore
        .import_wrapped(
            "victim",
            WrappingAlgorithm::Rfc5649,
            wrapped[..wrapped.len() - 1].to_vec(),
        )
        .unwrap();
    assert!(matches!(
        keystore.get("victim", &kek).unwrap_err(),
        KeystoreError::Crypto(CryptoError::InvalidWrappedLength(_))
    ));
}

#[test]
fn test_keystore_import_rfc_vectors() {
    let mut keystore = Keystore::new();

    // RFC 3394 4.1
    keystore
        .import_wrapped(
            "kw",
            WrappingAlgorithm::Rfc3394,
            hex::decode("1FA68B0A8112B447AEF34BD8FB5A7B829D3E862371D2CFE5").unwrap(),
        )
        .unwrap();
    assert_eq!(
        hex::encode(
            keystore
                .get("kw", &hex::decode("000102030405060708090A0B0C0D0E0F").unwrap())
                .unwrap()
                .as_slice()
        ),
        "00112233445566778899aabbccddeeff"
    );

    // RFC 5649 section 6, 7 octets
    keystore
        .import_wrapped(
            "kwp",
            WrappingAlgorithm::Rfc5649,
            hex::decode("afbeb0f07dfbf5419200f2ccb50bb24f").unwrap(),
        )
        .unwrap();
    let kek = hex::decode("5840df6e29b02af1ab493b705bf16ea1ae8338f4dcc176a8").unwrap();
    assert_eq!(
        hex::encode(keystore.get("kwp", &kek).unwrap().as_slice()),
        "466f7250617369"
    );

    // the same blob read with the wrong algorithm
    keystore
        .import_wrapped(
            "mislabelled",
            WrappingAlgorithm::Rfc3394,
            hex::decode("138bdeaa9b8fa7fc61f97742e72248ee5ae6ae5360d1ae6a5f54f373fa543b6a")
                .unwrap(),
        )
        .unwrap();
    assert!(keystore.get("mislabelled", &kek).unwrap_err().is_integrity_failure());

    assert!(matches!(
        keystore
            .import_wrapped("", WrappingAlgorithm::Rfc5649, vec![0; 16])
            .unwrap_err(),
        KeystoreError::InvalidInput(_)
    ));
    assert!(matches!(
        keystore
            .import_wrapped("empty", WrappingAlgorithm::Rfc5649, vec![])
            .unwrap_err(),
        KeystoreError::InvalidInput(_)
    ));
}
