// Known-answer tests against stored vectors: deterministic key generation, deterministic
// signing of a 256-byte message with an empty context, and a context-bound signature.
#![cfg(not(feature = "randomized-signing"))]

use hex::decode;
use lattice_sig::traits::{KeyGen, Signer, Verifier};
use lattice_sig::{ml_dsa_44, ml_dsa_65, ml_dsa_87, Error};
use serde_json::Value;
use std::fs;


// ----- EXTRACT I/O VALUES FROM THE STORED VECTORS -----

struct Golden {
    seed: Vec<u8>,
    message: Vec<u8>,
    pk: Vec<u8>,
    sk: Vec<u8>,
    sm: Vec<u8>,
    ctx_message: Vec<u8>,
    ctx: Vec<u8>,
    ctx_sig: Vec<u8>,
}

fn get_golden(set: &str) -> Golden {
    let data = fs::read_to_string("./tests/golden/vectors.json").expect("Unable to read file");
    let json: Value = serde_json::from_str(&data).expect("Malformed vector file");
    let field = |name: &str| decode(json[set][name].as_str().expect("missing field")).expect("bad hex");
    Golden {
        seed: field("seed"),
        message: field("message"),
        pk: field("pk"),
        sk: field("sk"),
        sm: field("sm"),
        ctx_message: field("ctx_message"),
        ctx: field("ctx"),
        ctx_sig: field("ctx_sig"),
    }
}


macro_rules! golden_test {
    ($name:ident, $set:ident) => {
        #[test]
        fn $name() {
            let g = get_golden(stringify!($set));

            // Key generation from the stored seed
            let (pk, sk) = $set::keygen(&g.seed).unwrap();
            assert_eq!(pk.to_vec(), g.pk);
            assert_eq!(sk.to_vec(), g.sk);

            // Deterministic signing with an empty context
            let sm = $set::sign(&g.message, &sk).unwrap();
            assert_eq!(sm, g.sm);
            assert_eq!($set::open(&g.sm, &g.pk).unwrap(), g.message);

            // Any change to the first signature byte must be caught
            let mut bad = g.sm.clone();
            bad[0] = bad[0].wrapping_add(1);
            assert_eq!($set::open(&bad, &g.pk), Err(Error::SignatureRejected));

            // Context-bound signature through the typed surface
            let (tpk, tsk) = $set::KG::keygen_from_seed(&g.seed).unwrap();
            let sig = tsk.try_sign_deterministic(&g.ctx_message, &g.ctx).unwrap();
            assert_eq!(sig.to_vec(), g.ctx_sig);
            assert!(tpk.verify(&g.ctx_message, &sig, &g.ctx));
            assert!(!tpk.verify(&g.ctx_message, &sig, &[]));
        }
    };
}

golden_test!(test_golden_44, ml_dsa_44);
golden_test!(test_golden_65, ml_dsa_65);
golden_test!(test_golden_87, ml_dsa_87);
