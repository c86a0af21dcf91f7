#![no_main]
use lattice_sig::traits::{KeyGen, SerDes, Signer, Verifier};
use lattice_sig::{ml_dsa_44, ml_dsa_65, ml_dsa_87};
use libfuzzer_sys::fuzz_target;
use rand_chacha::ChaCha20Rng;
use rand_core::{CryptoRngCore, SeedableRng};


// Deterministic RNG from the leading input bytes
fn create_rng(seed_data: &[u8]) -> ChaCha20Rng {
    let mut seed = [0u8; 32];
    let len = seed_data.len().min(32);
    seed[..len].copy_from_slice(&seed_data[..len]);
    ChaCha20Rng::from_seed(seed)
}


fn fuzz_signer_for_params<S, V>(data: &[u8], rng: &mut impl CryptoRngCore, keypair: &(V, S), ctx: &[u8])
where
    S: Signer<PublicKey = V>,
    V: Verifier<Signature = S::Signature> + SerDes + Clone,
    <S as Signer>::Signature: PartialEq,
    <V as SerDes>::ByteArray: PartialEq,
{
    let (pk, sk) = keypair;

    if let Ok(sig1) = sk.try_sign_with_rng(rng, data, ctx) {
        assert!(pk.verify(data, &sig1, ctx));

        // Hedged signatures differ, and both verify
        if let Ok(sig2) = sk.try_sign_with_rng(rng, data, ctx) {
            assert!(sig1 != sig2);
            assert!(pk.verify(data, &sig2, ctx));
        }

        let derived_pk = sk.get_public_key();
        assert!(derived_pk.clone().into_bytes() == pk.clone().into_bytes());
        assert!(derived_pk.verify(data, &sig1, ctx));
    }

    // Deterministic signatures repeat
    let d1 = sk.try_sign_deterministic(data, ctx);
    let d2 = sk.try_sign_deterministic(data, ctx);
    if let (Ok(d1), Ok(d2)) = (d1, d2) {
        assert!(d1 == d2);
        assert!(pk.verify(data, &d1, ctx));
    }
}


fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let mut rng = create_rng(data);
    let ml_dsa_44_keypair = ml_dsa_44::KG::try_keygen_with_rng(&mut rng).unwrap();
    let ml_dsa_65_keypair = ml_dsa_65::KG::try_keygen_with_rng(&mut rng).unwrap();
    let ml_dsa_87_keypair = ml_dsa_87::KG::try_keygen_with_rng(&mut rng).unwrap();

    // First byte picks the context length
    let ctx_len = (data[0] as usize) % 8;
    let (ctx, msg) = data.split_at(ctx_len.min(data.len()));

    fuzz_signer_for_params(msg, &mut rng, &ml_dsa_44_keypair, ctx);
    fuzz_signer_for_params(msg, &mut rng, &ml_dsa_65_keypair, ctx);
    fuzz_signer_for_params(msg, &mut rng, &ml_dsa_87_keypair, ctx);
});
