//! SMS provider credentials, read from the environment.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub const TWILIO_ACCOUNT_SID: &str = "TWILIO_ACCOUNT_SID";
pub const TWILIO_AUTH_TOKEN: &str = "TWILIO_AUTH_TOKEN";
pub const TWILIO_FROM: &str = "TWILIO_FROM";
pub const TWILIO_TO: &str = "TWILIO_TO";

/// Every variable a run needs, in the order they are reported when missing.
pub const CREDENTIAL_VARS: [&str; 4] = [
    TWILIO_ACCOUNT_SID,
    TWILIO_AUTH_TOKEN,
    TWILIO_FROM,
    TWILIO_TO,
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("Missing environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("Failed to read .env file: {0}")]
    DotEnv(String),
}

/// Twilio account credentials plus the fixed sender and recipient.
#[derive(Clone)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
    pub from: String,
    pub to: String,
}

impl fmt::Debug for TwilioCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwilioCredentials")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

/// Load variables from a `.env` file in the working directory or a parent,
/// if there is one. Returns the file that was loaded.
///
/// Variables already set in the process environment win. A missing file is
/// fine; one that exists but cannot be read or parsed is an error.
pub fn load_dotenv() -> Result<Option<PathBuf>, CredentialsError> {
    dotenv_outcome(dotenvy::dotenv())
}

fn dotenv_outcome(
    result: Result<PathBuf, dotenvy::Error>,
) -> Result<Option<PathBuf>, CredentialsError> {
    match result {
        Ok(path) => Ok(Some(path)),
        Err(dotenvy::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CredentialsError::DotEnv(e.to_string())),
    }
}

/// Process environment lookup, for [`credentials_from_lookup`].
pub fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Read credentials through an arbitrary lookup.
///
/// Empty values count as missing. All missing names are reported together.
pub fn credentials_from_lookup<F>(lookup: F) -> Result<TwilioCredentials, CredentialsError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut missing = Vec::new();
    let values = CREDENTIAL_VARS.map(|name| {
        let value = lookup(name).filter(|v| !v.trim().is_empty());
        if value.is_none() {
            missing.push(name);
        }
        value.unwrap_or_default()
    });

    if !missing.is_empty() {
        return Err(CredentialsError::Missing(missing));
    }

    let [account_sid, auth_token, from, to] = values;
    Ok(TwilioCredentials {
        account_sid,
        auth_token,
        from,
        to,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_all_credentials_present() {
        let vars = env(&[
            (TWILIO_ACCOUNT_SID, "AC123"),
            (TWILIO_AUTH_TOKEN, "secret"),
            (TWILIO_FROM, "+15550001"),
            (TWILIO_TO, "+15550002"),
        ]);
        let creds = credentials_from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(creds.account_sid, "AC123");
        assert_eq!(creds.auth_token, "secret");
        assert_eq!(creds.from, "+15550001");
        assert_eq!(creds.to, "+15550002");
    }

    #[test]
    fn test_missing_recipient_reports_exactly_one() {
        let vars = env(&[
            (TWILIO_ACCOUNT_SID, "AC123"),
            (TWILIO_AUTH_TOKEN, "secret"),
            (TWILIO_FROM, "+15550001"),
        ]);
        let err = credentials_from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert_eq!(err, CredentialsError::Missing(vec![TWILIO_TO]));
        assert_eq!(err.to_string(), "Missing environment variables: TWILIO_TO");
    }

    #[test]
    fn test_empty_values_count_as_missing() {
        let vars = env(&[
            (TWILIO_ACCOUNT_SID, ""),
            (TWILIO_AUTH_TOKEN, "secret"),
            (TWILIO_FROM, "  "),
            (TWILIO_TO, "+15550002"),
        ]);
        let err = credentials_from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert_eq!(
            err,
            CredentialsError::Missing(vec![TWILIO_ACCOUNT_SID, TWILIO_FROM])
        );
    }

    #[test]
    fn test_nothing_set_reports_all_in_order() {
        let err = credentials_from_lookup(|_| None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing environment variables: TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN, TWILIO_FROM, TWILIO_TO"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let creds = TwilioCredentials {
            account_sid: "AC123".to_string(),
            auth_token: "super-secret".to_string(),
            from: "+1".to_string(),
            to: "+2".to_string(),
        };
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_missing_dotenv_is_not_an_error() {
        let not_found = dotenvy::Error::Io(io::Error::new(io::ErrorKind::NotFound, "no .env"));
        assert_eq!(dotenv_outcome(Err(not_found)), Ok(None));
    }

    #[test]
    fn test_malformed_dotenv_is_reported() {
        let parse = dotenvy::Error::LineParse("TWILIO_TO +1555".to_string(), 9);
        assert!(matches!(
            dotenv_outcome(Err(parse)),
            Err(CredentialsError::DotEnv(_))
        ));

        let denied = dotenvy::Error::Io(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert!(matches!(
            dotenv_outcome(Err(denied)),
            Err(CredentialsError::DotEnv(_))
        ));
    }

    #[test]
    fn test_loaded_dotenv_path_is_returned() {
        let path = PathBuf::from("/srv/showtime/.env");
        assert_eq!(dotenv_outcome(Ok(path.clone())), Ok(Some(path)));
    }
}
