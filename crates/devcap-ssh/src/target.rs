use crate::session::SshError;

/// Remote endpoint in `[user@]host` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshTarget {
    pub user: String,
    pub host: String,
}

impl SshTarget {
    /// Parse a `[user@]host` argument.
    ///
    /// A missing user part falls back to the local login name from `$USER`
    /// or `$LOGNAME`.
    pub fn parse(arg: &str) -> Result<Self, SshError> {
        let local_user = std::env::var("USER")
            .or_else(|_| std::env::var("LOGNAME"))
            .ok();
        Self::parse_with_fallback(arg, local_user)
    }

    fn parse_with_fallback(arg: &str, local_user: Option<String>) -> Result<Self, SshError> {
        let (user, host) = match arg.split_once('@') {
            Some((user, host)) => (user.to_string(), host.to_string()),
            None => {
                let user = local_user.ok_or_else(|| {
                    SshError::BadTarget(
                        "no user given and $USER/$LOGNAME are unset".to_string(),
                    )
                })?;
                (user, arg.to_string())
            }
        };

        if user.is_empty() || host.is_empty() {
            return Err(SshError::BadTarget(format!(
                "expected [user@]host, got: {arg}"
            )));
        }

        Ok(Self { user, host })
    }

    /// The `user@host` login string passed to the ssh client.
    pub fn login(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }
}
