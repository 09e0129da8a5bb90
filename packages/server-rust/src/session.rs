//! Anti-replay process tokens.
//!
//! Each rendering of a form issues a fresh token into the session and
//! embeds it as the hidden `process` input. A post is honoured only when it
//! echoes the token currently in the session, so reloading a submitted page
//! or replaying an old post does nothing.

use std::collections::BTreeMap;

use rand::distr::Alphanumeric;
use rand::Rng;

use crate::context::RequestContext;

/// Session key and form input name of the token.
pub const PROCESS_KEY: &str = "process";

/// Token length in characters.
pub const TOKEN_LEN: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessToken(String);

impl ProcessToken {
    /// A random alphanumeric token.
    #[must_use]
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::rng())
    }

    #[must_use]
    pub fn generate_with(rng: &mut impl Rng) -> Self {
        let token = (0..TOKEN_LEN)
            .map(|_| char::from(rng.sample(Alphanumeric)))
            .collect();
        Self(token)
    }

    /// Generates a token and stores it in `session`, replacing any other.
    pub fn issue(session: &mut BTreeMap<String, String>) -> Self {
        let token = Self::generate();
        session.insert(PROCESS_KEY.to_string(), token.0.clone());
        token
    }

    /// The token the session currently expects.
    #[must_use]
    pub fn from_session(session: &BTreeMap<String, String>) -> Option<Self> {
        session.get(PROCESS_KEY).map(|t| Self(t.clone()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Whether the request posts the token the session expects.
///
/// A session without a token accepts nothing.
#[must_use]
pub fn is_valid_post(ctx: &RequestContext) -> bool {
    match (ProcessToken::from_session(&ctx.session), ctx.posted(PROCESS_KEY)) {
        (Some(expected), Some(posted)) => expected.as_str() == posted,
        _ => false,
    }
}
