#![no_main]

use lattice_sig::ml_dsa_44;
use lattice_sig::Error;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Split the input into a 'fuzzy' public key and a 'fuzzy' signed message
    let split = data.len().min(ml_dsa_44::PK_LEN);
    let (pk, sm) = data.split_at(split);

    // Arbitrary bytes must never panic, and must never open
    match ml_dsa_44::open(sm, pk) {
        Ok(_) => panic!("forged signature accepted"),
        Err(Error::InvalidKeyLength { .. } | Error::InvalidSignatureLength { .. } | Error::SignatureRejected) => {}
        Err(e) => panic!("unexpected error {e:?}"),
    }

    // A 'fuzzy' private key either decodes and signs, or is rejected
    if data.len() >= ml_dsa_44::SK_LEN {
        let (sk, msg) = data.split_at(ml_dsa_44::SK_LEN);
        match ml_dsa_44::sign(msg, sk) {
            Ok(sm) => assert_eq!(&sm[ml_dsa_44::SIG_LEN..], msg),
            Err(Error::MalformedKey) => {}
            Err(e) => panic!("unexpected error {e:?}"),
        }
    }
});
