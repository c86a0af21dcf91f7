#![no_main]
use lattice_sig::traits::{KeyGen, SerDes, Signer, Verifier};
use lattice_sig::{ml_dsa_44, ml_dsa_65, ml_dsa_87};
use libfuzzer_sys::fuzz_target;


fn fuzz_verify_for_params<S, V>(data: &[u8], keypair: &(V, S), ctx: &[u8])
where
    S: Signer,
    V: Verifier<Signature = S::Signature>,
{
    let (pk, sk) = keypair;

    if let Ok(sig) = sk.try_sign_deterministic(data, ctx) {
        assert!(pk.verify(data, &sig, ctx));

        // Modified message should not verify
        if !data.is_empty() {
            let mut modified_msg = data.to_vec();
            modified_msg[0] ^= 1;
            assert!(!pk.verify(&modified_msg, &sig, ctx));
        }

        // Modified context should not verify
        let mut modified_ctx = ctx.to_vec();
        modified_ctx.push(1);
        assert!(!pk.verify(data, &sig, &modified_ctx));
    }
}


fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // Static keypairs for speed
    let seed = [42u8; 32];
    let ml_dsa_44_keypair = ml_dsa_44::KG::keygen_from_seed(&seed).unwrap();
    let ml_dsa_65_keypair = ml_dsa_65::KG::keygen_from_seed(&seed).unwrap();
    let ml_dsa_87_keypair = ml_dsa_87::KG::keygen_from_seed(&seed).unwrap();

    let ctx_len = (data[0] as usize) % 8;
    let (ctx, msg) = data.split_at(ctx_len.min(data.len()));

    fuzz_verify_for_params(msg, &ml_dsa_44_keypair, ctx);
    fuzz_verify_for_params(msg, &ml_dsa_65_keypair, ctx);
    fuzz_verify_for_params(msg, &ml_dsa_87_keypair, ctx);

    // A 'fuzzy' signature of the right shape is rejected, not panicked on
    let (pk, _) = &ml_dsa_44_keypair;
    if data.len() >= ml_dsa_44::SIG_LEN {
        let sig: [u8; ml_dsa_44::SIG_LEN] = data[..ml_dsa_44::SIG_LEN].try_into().unwrap();
        let _ = pk.try_verify(&data[ml_dsa_44::SIG_LEN..], &sig, &[]);
    }

    // Public key serialization round trip
    let (pk, sk) = &ml_dsa_65_keypair;
    if let Ok(sig) = sk.try_sign_deterministic(msg, ctx) {
        let pk_bytes = pk.clone().into_bytes();
        let recovered_pk = ml_dsa_65::PublicKey::try_from_bytes(&pk_bytes).unwrap();
        assert!(recovered_pk.verify(msg, &sig, ctx));
    }
});
