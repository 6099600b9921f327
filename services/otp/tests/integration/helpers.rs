use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use vouch_otp::domain::clock::Clock;
use vouch_otp::domain::code::CodeGenerator;
use vouch_otp::domain::repository::{ChallengeStore, IdentityProvider, Notifier};
use vouch_otp::domain::types::{
    Challenge, ChallengePurpose, ClaimOutcome, EmailAddress, NewChallenge, OtpCode,
};
use vouch_otp::error::OtpServiceError;
use vouch_otp::usecase::issue::IssueChallengeUseCase;
use vouch_otp::usecase::verify::VerifyChallengeUseCase;

type Key = (EmailAddress, ChallengePurpose);

// ── MockChallengeStore ───────────────────────────────────────────────────────

/// In-memory store. Clones share rows. The claim check and the write happen
/// under one lock acquisition, mirroring the single conditional UPDATE.
#[derive(Clone, Default)]
pub struct MockChallengeStore {
    rows: Arc<Mutex<HashMap<Key, Challenge>>>,
    inspections: Arc<AtomicUsize>,
    fail_writes: bool,
}

impl MockChallengeStore {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every write reports a persistence failure.
    pub fn unavailable() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn row(&self, email: &str, purpose: ChallengePurpose) -> Option<Challenge> {
        let key = (EmailAddress::parse(email).unwrap(), purpose);
        self.rows.lock().unwrap().get(&key).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Number of diagnostic reads issued through `inspect`.
    pub fn inspections(&self) -> usize {
        self.inspections.load(Ordering::SeqCst)
    }

    pub fn insert(&self, challenge: Challenge) {
        let key = (challenge.email.clone(), challenge.purpose);
        self.rows.lock().unwrap().insert(key, challenge);
    }

    fn check_writable(&self) -> Result<(), OtpServiceError> {
        if self.fail_writes {
            return Err(anyhow::anyhow!("store unavailable").into());
        }
        Ok(())
    }
}

impl ChallengeStore for MockChallengeStore {
    async fn upsert(&self, challenge: &NewChallenge) -> Result<Uuid, OtpServiceError> {
        self.check_writable()?;
        let id = Uuid::new_v4();
        self.insert(Challenge {
            id,
            email: challenge.email.clone(),
            purpose: challenge.purpose,
            code: challenge.code.clone(),
            created_at: challenge.created_at,
            expires_at: challenge.expires_at,
            consumed_at: None,
        });
        Ok(id)
    }

    async fn claim_if_valid(
        &self,
        email: &EmailAddress,
        purpose: ChallengePurpose,
        code: &OtpCode,
        now: DateTime<Utc>,
    ) -> Result<ClaimOutcome, OtpServiceError> {
        self.check_writable()?;
        // Give concurrent claimers a chance to line up on the lock.
        tokio::task::yield_now().await;
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&(email.clone(), purpose)) {
            Some(row) if row.code == *code && row.is_claimable(now) => {
                row.consumed_at = Some(now);
                Ok(ClaimOutcome::Won)
            }
            _ => Ok(ClaimOutcome::Lost),
        }
    }

    async fn inspect(
        &self,
        email: &EmailAddress,
        purpose: ChallengePurpose,
    ) -> Result<Option<Challenge>, OtpServiceError> {
        self.inspections.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(&(email.clone(), purpose))
            .cloned())
    }

    async fn purge_stale(&self, cutoff: DateTime<Utc>) -> Result<u64, OtpServiceError> {
        self.check_writable()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|_, c| {
            !(c.consumed_at.is_some_and(|at| at < cutoff) || c.expires_at < cutoff)
        });
        Ok((before - rows.len()) as u64)
    }
}

// ── MockNotifier ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Delivery {
    pub destination: String,
    pub code: String,
    pub purpose: ChallengePurpose,
}

#[derive(Clone, Default)]
pub struct MockNotifier {
    pub sent: Arc<Mutex<Vec<Delivery>>>,
    fail: bool,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.sent.lock().unwrap().clone()
    }

    /// Code from the most recent delivery.
    pub fn last_code(&self) -> String {
        self.sent
            .lock()
            .unwrap()
            .last()
            .map(|d| d.code.clone())
            .expect("nothing delivered")
    }
}

impl Notifier for MockNotifier {
    async fn send(
        &self,
        destination: &EmailAddress,
        code: &OtpCode,
        purpose: ChallengePurpose,
    ) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("relay rejected message");
        }
        self.sent.lock().unwrap().push(Delivery {
            destination: destination.as_str().to_owned(),
            code: code.as_str().to_owned(),
            purpose,
        });
        Ok(())
    }
}

// ── MockIdentityProvider ─────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockIdentityProvider {
    pub confirmed: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn confirmed_emails(&self) -> Vec<String> {
        self.confirmed.lock().unwrap().clone()
    }
}

impl IdentityProvider for MockIdentityProvider {
    async fn confirm_email(&self, email: &EmailAddress) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("identity service unavailable");
        }
        self.confirmed.lock().unwrap().push(email.as_str().to_owned());
        Ok(())
    }
}

// ── ManualClock ──────────────────────────────────────────────────────────────

/// Clock that only moves when told to. Clones share the same instant.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(
                Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap(),
            )),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// ── ScriptedCodes ────────────────────────────────────────────────────────────

/// Hands out codes from a script, repeating the last one when exhausted.
#[derive(Clone)]
pub struct ScriptedCodes {
    script: Arc<Mutex<VecDeque<&'static str>>>,
    last: Arc<Mutex<&'static str>>,
}

impl ScriptedCodes {
    pub fn new(codes: &[&'static str]) -> Self {
        let first = *codes.first().expect("at least one code");
        Self {
            script: Arc::new(Mutex::new(codes.iter().copied().collect())),
            last: Arc::new(Mutex::new(first)),
        }
    }
}

impl CodeGenerator for ScriptedCodes {
    fn generate(&self) -> OtpCode {
        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            *last = next;
        }
        OtpCode::new(*last)
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub const TTL_SECS: i64 = 300;

/// Issuer + verifier wired to the same store and clock.
pub struct Harness {
    pub store: MockChallengeStore,
    pub notifier: MockNotifier,
    pub identity: MockIdentityProvider,
    pub clock: ManualClock,
    pub issuer: IssueChallengeUseCase<MockChallengeStore, MockNotifier, ScriptedCodes, ManualClock>,
    pub verifier: VerifyChallengeUseCase<MockChallengeStore, MockIdentityProvider, ManualClock>,
}

impl Harness {
    pub fn new(codes: &[&'static str]) -> Self {
        let store = MockChallengeStore::empty();
        let notifier = MockNotifier::new();
        let identity = MockIdentityProvider::new();
        let clock = ManualClock::new();
        Self {
            issuer: IssueChallengeUseCase {
                challenges: store.clone(),
                notifier: notifier.clone(),
                codes: ScriptedCodes::new(codes),
                clock: clock.clone(),
                ttl: Duration::seconds(TTL_SECS),
            },
            verifier: VerifyChallengeUseCase {
                challenges: store.clone(),
                identity: identity.clone(),
                clock: clock.clone(),
            },
            store,
            notifier,
            identity,
            clock,
        }
    }
}

pub fn email(raw: &str) -> EmailAddress {
    EmailAddress::parse(raw).unwrap()
}
