use coursepay::application::signature::SignatureVerifier;
use coursepay::config::{PaymentConfig, Secret};
use coursepay::domain::payment::PaymentCallback;
use coursepay::error::CoursePayError;
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ITERATIONS: usize = 200;

fn random_id(rng: &mut StdRng, prefix: &str) -> String {
    let len = rng.gen_range(4..24);
    let body: String = (0..len).map(|_| rng.sample(Alphanumeric) as char).collect();
    format!("{prefix}_{body}")
}

/// Returns `s` with the character at `index` replaced by a different one.
fn mutate(s: &str, index: usize, rng: &mut StdRng) -> String {
    let mut chars: Vec<char> = s.chars().collect();
    let original = chars[index];
    let replacement = loop {
        let c = rng.sample(Alphanumeric) as char;
        if c != original {
            break c;
        }
    };
    chars[index] = replacement;
    chars.into_iter().collect()
}

#[test]
fn test_genuine_signatures_verify() {
    let mut rng = StdRng::seed_from_u64(7);
    let verifier = SignatureVerifier::new(&PaymentConfig::new(Secret::new("s3cr3t"), "INR"));

    for _ in 0..ITERATIONS {
        let order = random_id(&mut rng, "order");
        let payment = random_id(&mut rng, "pay");
        let signature = verifier.sign(&order, &payment);

        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        verifier
            .verify(&PaymentCallback::new(order, payment, signature))
            .unwrap();
    }
}

#[test]
fn test_single_character_mutations_are_rejected() {
    let mut rng = StdRng::seed_from_u64(42);
    let verifier = SignatureVerifier::new(&PaymentConfig::new(Secret::new("s3cr3t"), "INR"));

    for _ in 0..ITERATIONS {
        let order = random_id(&mut rng, "order");
        let payment = random_id(&mut rng, "pay");
        let signature = verifier.sign(&order, &payment);

        let callbacks = [
            PaymentCallback::new(
                mutate(&order, rng.gen_range(0..order.len()), &mut rng),
                payment.clone(),
                signature.clone(),
            ),
            PaymentCallback::new(
                order.clone(),
                mutate(&payment, rng.gen_range(0..payment.len()), &mut rng),
                signature.clone(),
            ),
            PaymentCallback::new(
                order.clone(),
                payment.clone(),
                mutate(&signature, rng.gen_range(0..signature.len()), &mut rng),
            ),
        ];

        for callback in &callbacks {
            assert!(matches!(
                verifier.verify(callback),
                Err(CoursePayError::InvalidSignature)
            ));
        }
    }
}

#[test]
fn test_other_secret_is_rejected() {
    let mut rng = StdRng::seed_from_u64(3);
    let ours = SignatureVerifier::new(&PaymentConfig::new(Secret::new("ours"), "INR"));
    let theirs = SignatureVerifier::new(&PaymentConfig::new(Secret::new("theirs"), "INR"));

    for _ in 0..ITERATIONS {
        let order = random_id(&mut rng, "order");
        let payment = random_id(&mut rng, "pay");
        let forged = theirs.sign(&order, &payment);
        assert!(ours.verify(&PaymentCallback::new(order, payment, forged)).is_err());
    }
}

#[test]
fn test_uppercase_or_truncated_signature_is_rejected() {
    let verifier = SignatureVerifier::new(&PaymentConfig::new(Secret::new("s3cr3t"), "INR"));
    let signature = verifier.sign("order_1", "pay_1");

    let upper = signature.to_uppercase();
    assert_ne!(upper, signature);
    assert!(verifier
        .verify(&PaymentCallback::new("order_1", "pay_1", upper))
        .is_err());
    assert!(verifier
        .verify(&PaymentCallback::new("order_1", "pay_1", &signature[..63]))
        .is_err());
    assert!(verifier
        .verify(&PaymentCallback::new("order_1", "pay_1", format!("{signature}0")))
        .is_err());
    assert!(verifier
        .verify(&PaymentCallback::new("order_1", "pay_1", ""))
        .is_err());
}
