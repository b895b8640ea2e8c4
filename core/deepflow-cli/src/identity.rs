//! Identity taken from the environment.
//!
//! Sign-in happens outside this tool; whatever did it exports the user id
//! (and optionally an access token) before invoking `deepflow`.

use std::env;

use async_trait::async_trait;
use deepflow_core::{IdentityProvider, UserIdentity};
use tokio::sync::watch;

pub const USER_ID_ENV: &str = "DEEPFLOW_USER_ID";
pub const ACCESS_TOKEN_ENV: &str = "DEEPFLOW_ACCESS_TOKEN";

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Reads `DEEPFLOW_USER_ID` on every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvIdentity;

impl EnvIdentity {
    pub fn access_token() -> Option<String> {
        non_empty_var(ACCESS_TOKEN_ENV)
    }
}

#[async_trait]
impl IdentityProvider for EnvIdentity {
    async fn current_user(&self) -> Option<UserIdentity> {
        non_empty_var(USER_ID_ENV).map(UserIdentity::new)
    }

    fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>> {
        // The environment doesn't change under a running process.
        let (_tx, rx) = watch::channel(non_empty_var(USER_ID_ENV).map(UserIdentity::new));
        rx
    }
}
