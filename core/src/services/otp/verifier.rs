//! OTP verification state machine

use chrono::{DateTime, Utc};

use crate::domain::entities::OtpRecord;
use crate::errors::OtpFailure;

use super::codes;

/// Check `submitted` against `record` at instant `now`
///
/// Checks short-circuit in a fixed order so a record that is already lost
/// keeps giving the same terminal answer:
/// 1. attempts exhausted
/// 2. expired
/// 3. already verified
/// 4. digest comparison
///
/// Only step 4 mutates the record: a match sets `is_verified` and
/// `verified_at`, a mismatch consumes one attempt. The caller persists.
pub fn verify(
    record: &mut OtpRecord,
    submitted: &str,
    now: DateTime<Utc>,
) -> Result<(), OtpFailure> {
    if record.is_exhausted() {
        return Err(OtpFailure::AttemptsExhausted);
    }
    if record.is_expired_at(now) {
        return Err(OtpFailure::Expired);
    }
    if record.is_verified {
        return Err(OtpFailure::AlreadyVerified);
    }

    if codes::code_matches(submitted, &record.code_salt, &record.code_hash) {
        record.is_verified = true;
        record.verified_at = Some(now);
        Ok(())
    } else {
        record.attempts += 1;
        Err(OtpFailure::Mismatch {
            remaining: record.remaining_attempts(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::OtpState;
    use chrono::Duration;

    fn record_for(code: &str, max_attempts: u32, now: DateTime<Utc>) -> OtpRecord {
        let salt = codes::generate_salt();
        let hash = codes::hash_code(code, &salt);
        OtpRecord::issue("session-1", hash, salt, max_attempts, 5, now)
    }

    #[test]
    fn test_scenario_three_mismatches_then_success() {
        let now = Utc::now();
        let mut otp = record_for("123456", 5, now);

        for expected in [4, 3, 2] {
            assert_eq!(
                verify(&mut otp, "000000", now),
                Err(OtpFailure::Mismatch { remaining: expected })
            );
        }

        assert_eq!(verify(&mut otp, "123456", now), Ok(()));
        assert!(otp.is_verified);
        assert_eq!(otp.verified_at, Some(now));
        assert_eq!(otp.state_at(now), OtpState::Verified);

        assert_eq!(
            verify(&mut otp, "123456", now),
            Err(OtpFailure::AlreadyVerified)
        );
    }

    #[test]
    fn test_verified_record_never_mutates_again() {
        let now = Utc::now();
        let mut otp = record_for("123456", 5, now);
        verify(&mut otp, "123456", now).unwrap();
        let snapshot = otp.clone();

        for submitted in ["123456", "000000", "999999"] {
            let later = now + Duration::seconds(30);
            assert_eq!(
                verify(&mut otp, submitted, later),
                Err(OtpFailure::AlreadyVerified)
            );
            assert_eq!(otp, snapshot);
        }
    }

    #[test]
    fn test_exhaustion_beats_correct_code() {
        let now = Utc::now();
        let mut otp = record_for("123456", 5, now);

        for _ in 0..5 {
            assert!(matches!(
                verify(&mut otp, "000000", now),
                Err(OtpFailure::Mismatch { .. })
            ));
        }
        assert_eq!(otp.attempts, 5);

        assert_eq!(
            verify(&mut otp, "123456", now),
            Err(OtpFailure::AttemptsExhausted)
        );
        assert_eq!(otp.attempts, 5);
        assert!(!otp.is_verified);
    }

    #[test]
    fn test_last_mismatch_reports_zero_remaining() {
        let now = Utc::now();
        let mut otp = record_for("123456", 2, now);
        assert_eq!(
            verify(&mut otp, "000000", now),
            Err(OtpFailure::Mismatch { remaining: 1 })
        );
        assert_eq!(
            verify(&mut otp, "000000", now),
            Err(OtpFailure::Mismatch { remaining: 0 })
        );
        assert_eq!(
            verify(&mut otp, "000000", now),
            Err(OtpFailure::AttemptsExhausted)
        );
    }

    #[test]
    fn test_expired_even_on_first_correct_attempt() {
        let now = Utc::now();
        let mut otp = record_for("123456", 5, now);
        let after = otp.expires_at + Duration::seconds(1);

        assert_eq!(verify(&mut otp, "123456", after), Err(OtpFailure::Expired));
        assert_eq!(otp.attempts, 0);
        assert!(!otp.is_verified);
    }

    #[test]
    fn test_exactly_at_expiry_is_still_valid() {
        let now = Utc::now();
        let mut otp = record_for("123456", 5, now);
        let at = otp.expires_at;
        assert_eq!(verify(&mut otp, "123456", at), Ok(()));
    }

    #[test]
    fn test_exhaustion_checked_before_expiry() {
        let now = Utc::now();
        let mut otp = record_for("123456", 1, now);
        let _ = verify(&mut otp, "000000", now);
        let after = otp.expires_at + Duration::minutes(1);
        assert_eq!(
            verify(&mut otp, "123456", after),
            Err(OtpFailure::AttemptsExhausted)
        );
    }
}
