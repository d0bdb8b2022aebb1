//! Sender-side stealth derivation, recipient-side scanning, and the
//! deposit lifecycle that gates announcement of a prepared stealth output.

use crate::curve::{CurvePoint, Scalar};
use crate::field::FieldElement;
use crate::hash::{commit, nullifier, nullifier_hash};
use crate::keys::meta_address::MetaAddress;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

const STEALTH_TAG: &[u8] = b"zVault-stealth-v1";
/// Upper bound on a note's amount in satoshis: 21,000,000 BTC expressed in
/// sats (`21 * 10^14`), matching the recipient-side scan bounds check.
pub const MAX_AMOUNT_SATS: u64 = 2_100_000_000_000_000;

/// What the sender emits to the Announcement layer for one outgoing note.
#[derive(Clone, Copy, Debug)]
pub struct StealthOutput {
    pub ephemeral_pub: CurvePoint,
    pub amount: u64,
    pub commitment: FieldElement,
}

/// Sample a fresh ephemeral scalar and derive a stealth output for the
/// given recipient meta-address and amount (spec §4.3, sender side).
pub fn derive_stealth_output(meta: &MetaAddress, amount: u64) -> (Scalar, StealthOutput) {
    let e = sample_ephemeral_scalar();
    let output = derive_stealth_output_with_scalar(meta, amount, &e);
    (e, output)
}

/// Same derivation with an explicit ephemeral scalar, for deterministic
/// tests and for callers that already sampled `e` elsewhere.
pub fn derive_stealth_output_with_scalar(
    meta: &MetaAddress,
    amount: u64,
    e: &Scalar,
) -> StealthOutput {
    let ephemeral_pub = CurvePoint::generator().mul(e);
    let shared = meta.viewing_pub.mul(e);
    let k = tagged_scalar(&shared);
    let stealth_pub = meta.spending_pub.add(&CurvePoint::generator().mul(&k));
    let commitment = commit(stealth_pub.x_field_element(), FieldElement::from_u64(amount));

    StealthOutput {
        ephemeral_pub,
        amount,
        commitment,
    }
}

fn sample_ephemeral_scalar() -> Scalar {
    let mut rng = rand::thread_rng();
    loop {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        let scalar = Scalar::from_be_bytes_mod_order(&bytes);
        if !scalar.is_zero() {
            return scalar;
        }
    }
}

fn tagged_scalar(shared_point: &CurvePoint) -> Scalar {
    // The identity can only occur if e*V or viewingPriv*E collapses to zero,
    // which requires a zero scalar; both derivations guard against that.
    let compressed = shared_point
        .compress()
        .expect("shared secret point is never the identity for nonzero scalars");
    let mut hasher = Sha256::new();
    hasher.update(compressed);
    hasher.update(STEALTH_TAG);
    let t: [u8; 32] = hasher.finalize().into();
    Scalar::from_be_bytes_mod_order(&t)
}

/// A note recovered by a recipient-side scan: everything needed to spend,
/// minus the spending key itself (that's supplied separately, since the
/// viewing key alone cannot derive it).
#[derive(Clone, Debug)]
pub struct ScannedNote {
    pub stealth_pub: CurvePoint,
    pub amount: u64,
    pub commitment: FieldElement,
    pub k_prime: Scalar,
}

/// Recipient-side scan of one announcement against a viewing key (spec
/// §4.3 steps 1-5). Returns `None` on amount-bounds violation or commitment
/// mismatch — scanning never errors, it only accepts or skips.
pub fn scan_announcement(
    viewing_priv: &Scalar,
    spending_pub: &CurvePoint,
    ephemeral_pub: &CurvePoint,
    amount: u64,
    commitment: FieldElement,
) -> Option<ScannedNote> {
    if amount == 0 || amount > MAX_AMOUNT_SATS {
        return None;
    }

    let shared = ephemeral_pub.mul(viewing_priv);
    let k_prime = tagged_scalar(&shared);
    let stealth_pub = spending_pub.add(&CurvePoint::generator().mul(&k_prime));

    let expected = commit(stealth_pub.x_field_element(), FieldElement::from_u64(amount));
    if expected != commitment {
        return None;
    }

    Some(ScannedNote {
        stealth_pub,
        amount,
        commitment,
        k_prime,
    })
}

/// Complete the derivation with the spending key: only the spending key
/// holder can do this (the viewing key alone yields `stealth_pub` but no
/// scalar whose multiple produces it).
pub fn derive_stealth_priv(spending_priv: &Scalar, k_prime: &Scalar) -> Scalar {
    *spending_priv + *k_prime
}

/// `nullifier` and `nullifier_hash` for a spendable note, per spec §4.3
/// step 7.
pub fn derive_nullifier(stealth_priv: &Scalar, leaf_index: u64) -> (FieldElement, FieldElement) {
    let stealth_priv_fe = FieldElement::from_be_bytes_mod_order(&stealth_priv.to_be_bytes());
    let n = nullifier(stealth_priv_fe, FieldElement::from_u64(leaf_index));
    (n, nullifier_hash(n))
}

/// Relay mode: the indexer briefly custodies the ephemeral private scalar
/// between preparing a stealth output and posting its announcement, then
/// zeroizes it. Self-custody mode: the caller receives an encoded
/// `StealthData` blob and the indexer never sees the scalar.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StealthMode {
    Relay,
    SelfCustody,
}

/// Lifecycle of a prepared stealth deposit, carried over from the relay
/// flow almost verbatim and generalized from Bitcoin-specific language:
/// "confirmed" here means an external deposit watcher (out of scope for
/// this crate) reported enough confirmations, not that this crate verified
/// them itself.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StealthDepositStatus {
    Pending,
    Detected,
    Confirming,
    Confirmed,
    Announcing,
    Announced,
    Expired,
    Failed,
}

/// Default window a prepared-but-unseen deposit stays valid for.
pub const STEALTH_DEPOSIT_TTL_SECS: u64 = 24 * 60 * 60;

#[derive(Clone, Serialize, Deserialize)]
pub struct StealthDepositRecord {
    pub id: String,
    pub mode: StealthMode,
    pub meta_address_hex: String,
    pub ephemeral_pub_hex: String,
    /// Only populated in relay mode, and zeroized once `Announced`.
    pub ephemeral_priv_hex: Option<String>,
    pub commitment_hex: String,
    pub amount_sats: Option<u64>,
    pub status: StealthDepositStatus,
    pub created_at: u64,
    pub expires_at: u64,
}

impl StealthDepositRecord {
    pub fn new(
        id: String,
        mode: StealthMode,
        meta_address_hex: String,
        ephemeral_pub_hex: String,
        ephemeral_priv_hex: Option<String>,
        commitment_hex: String,
        created_at: u64,
    ) -> Self {
        Self {
            id,
            mode,
            meta_address_hex,
            ephemeral_pub_hex,
            ephemeral_priv_hex,
            commitment_hex,
            amount_sats: None,
            status: StealthDepositStatus::Pending,
            created_at,
            expires_at: created_at + STEALTH_DEPOSIT_TTL_SECS,
        }
    }

    pub fn is_expired(&self, now: u64) -> bool {
        self.status == StealthDepositStatus::Pending && now >= self.expires_at
    }

    pub fn mark_detected(&mut self, amount_sats: u64) {
        self.status = StealthDepositStatus::Detected;
        self.amount_sats = Some(amount_sats);
    }

    pub fn mark_confirming(&mut self) {
        self.status = StealthDepositStatus::Confirming;
    }

    pub fn mark_confirmed(&mut self) {
        self.status = StealthDepositStatus::Confirmed;
    }

    pub fn mark_announcing(&mut self) {
        self.status = StealthDepositStatus::Announcing;
    }

    /// Once announced, a relay-mode record's ephemeral private key serves
    /// no further purpose and must not linger in the store.
    pub fn mark_announced(&mut self) {
        self.status = StealthDepositStatus::Announced;
        if let Some(ref mut hex) = self.ephemeral_priv_hex {
            hex.zeroize();
        }
        self.ephemeral_priv_hex = None;
    }

    pub fn mark_failed(&mut self) {
        self.status = StealthDepositStatus::Failed;
        if let Some(ref mut hex) = self.ephemeral_priv_hex {
            hex.zeroize();
        }
        self.ephemeral_priv_hex = None;
    }

    pub fn can_announce(&self) -> bool {
        self.status == StealthDepositStatus::Confirmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::Scalar;

    fn test_meta_address() -> MetaAddress {
        let spending_priv = Scalar::from_be_bytes_mod_order(&[11u8; 32]);
        let viewing_priv = Scalar::from_be_bytes_mod_order(&[22u8; 32]);
        MetaAddress {
            spending_pub: CurvePoint::generator().mul(&spending_priv),
            viewing_pub: CurvePoint::generator().mul(&viewing_priv),
        }
    }

    #[test]
    fn sender_and_recipient_derive_the_same_stealth_pub() {
        let meta = test_meta_address();
        let spending_priv = Scalar::from_be_bytes_mod_order(&[11u8; 32]);
        let viewing_priv = Scalar::from_be_bytes_mod_order(&[22u8; 32]);

        let e = Scalar::from_be_bytes_mod_order(&[77u8; 32]);
        let amount = 100_000u64;
        let output = derive_stealth_output_with_scalar(&meta, amount, &e);

        let scanned = scan_announcement(
            &viewing_priv,
            &meta.spending_pub,
            &output.ephemeral_pub,
            amount,
            output.commitment,
        )
        .expect("scan must match the sender's commitment");

        let stealth_priv = derive_stealth_priv(&spending_priv, &scanned.k_prime);
        assert_eq!(CurvePoint::generator().mul(&stealth_priv), scanned.stealth_pub);
    }

    #[test]
    fn wrong_viewing_key_finds_nothing() {
        let meta = test_meta_address();
        let e = Scalar::from_be_bytes_mod_order(&[3u8; 32]);
        let amount = 50_000u64;
        let output = derive_stealth_output_with_scalar(&meta, amount, &e);

        let wrong_viewing_priv = Scalar::from_be_bytes_mod_order(&[99u8; 32]);
        let scanned = scan_announcement(
            &wrong_viewing_priv,
            &meta.spending_pub,
            &output.ephemeral_pub,
            amount,
            output.commitment,
        );
        assert!(scanned.is_none());
    }

    #[test]
    fn amount_out_of_bounds_is_skipped() {
        let meta = test_meta_address();
        let viewing_priv = Scalar::from_be_bytes_mod_order(&[22u8; 32]);
        let e = Scalar::from_be_bytes_mod_order(&[5u8; 32]);
        let output = derive_stealth_output_with_scalar(&meta, MAX_AMOUNT_SATS + 1, &e);

        let scanned = scan_announcement(
            &viewing_priv,
            &meta.spending_pub,
            &output.ephemeral_pub,
            MAX_AMOUNT_SATS + 1,
            output.commitment,
        );
        assert!(scanned.is_none());
    }

    #[test]
    fn deposit_lifecycle_clears_ephemeral_key_on_announce() {
        let mut record = StealthDepositRecord::new(
            "dep-1".into(),
            StealthMode::Relay,
            "meta".into(),
            "eph-pub".into(),
            Some("eph-priv".into()),
            "commit".into(),
            0,
        );
        record.mark_detected(1_000);
        record.mark_confirming();
        record.mark_confirmed();
        assert!(record.can_announce());
        record.mark_announcing();
        record.mark_announced();
        assert!(record.ephemeral_priv_hex.is_none());
        assert_eq!(record.status, StealthDepositStatus::Announced);
    }
}
