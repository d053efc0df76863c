use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::user::SignedIn;

static MOBILE_AGENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Android|webOS|iPhone|iPad|iPod|BlackBerry|IEMobile|Opera Mini")
        .expect("static regex")
});

/// How a sign-in is completed for a given device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignInMode {
    /// The token is handed back in the same response.
    Popup,
    /// The token is parked under a one-time code, collected on next startup.
    Redirect,
}

impl SignInMode {
    pub fn for_user_agent(user_agent: Option<&str>) -> Self {
        match user_agent {
            Some(ua) if MOBILE_AGENT.is_match(ua) => SignInMode::Redirect,
            _ => SignInMode::Popup,
        }
    }
}

/// Sign-ins waiting for their redirect to complete.
///
/// Codes are single use and expire after the configured time-to-live.
#[derive(Clone)]
pub struct PendingSignIns {
    inner: Arc<Mutex<HashMap<String, (SignedIn, Instant)>>>,
    ttl: Duration,
}

impl PendingSignIns {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl: Duration::from_secs(ttl_secs),
        }
    }

    /// Parks a completed sign-in and returns the code to redeem it with.
    pub fn issue(&self, signed_in: SignedIn) -> String {
        let code = uuid::Uuid::new_v4().simple().to_string();
        let mut pending = self.lock();
        let ttl = self.ttl;
        pending.retain(|_, (_, at)| at.elapsed() < ttl);
        pending.insert(code.clone(), (signed_in, Instant::now()));
        code
    }

    /// Takes the sign-in parked under `code`, if it exists and is still fresh.
    pub fn redeem(&self, code: &str) -> Option<SignedIn> {
        let (signed_in, at) = self.lock().remove(code)?;
        (at.elapsed() < self.ttl).then_some(signed_in)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, (SignedIn, Instant)>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::SessionUser;

    fn signed_in() -> SignedIn {
        SignedIn {
            token: "t".to_string(),
            user: SessionUser {
                id: "u".to_string(),
                email: "u@example.com".to_string(),
                display_name: None,
            },
        }
    }

    #[test]
    fn mobile_agents_use_redirect() {
        let iphone = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)";
        let desktop = "Mozilla/5.0 (X11; Linux x86_64) Firefox/120.0";
        let mode = SignInMode::for_user_agent;
        assert_eq!(mode(Some(iphone)), SignInMode::Redirect);
        assert_eq!(mode(Some("opera mini/8")), SignInMode::Redirect);
        assert_eq!(mode(Some(desktop)), SignInMode::Popup);
        assert_eq!(mode(None), SignInMode::Popup);
    }

    #[test]
    fn codes_are_single_use() {
        let pending = PendingSignIns::new(60);
        let code = pending.issue(signed_in());
        assert!(pending.redeem(&code).is_some());
        assert!(pending.redeem(&code).is_none());
        assert!(pending.redeem("unknown").is_none());
    }

    #[test]
    fn expired_codes_are_refused() {
        let pending = PendingSignIns::new(0);
        let code = pending.issue(signed_in());
        assert!(pending.redeem(&code).is_none());
    }
}
