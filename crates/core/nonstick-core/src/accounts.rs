//! Host account lookup.
//!
//! After authentication the engine only knows a login name, which is mutable.
//! Downstream systems receive the numeric account id instead, and the consent
//! step maps that id back to an account to populate identity claims.

use std::collections::HashMap;
use thiserror::Error;

/// A host account record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub uid: u32,
    pub login: String,
    pub display_name: String,
}

impl Account {
    pub fn new(uid: u32, login: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            uid,
            login: login.into(),
            display_name: display_name.into(),
        }
    }

    /// The stable subject identifier handed to the authorization server.
    pub fn subject(&self) -> String {
        self.uid.to_string()
    }

    /// Given and family name, when the display name is exactly two words
    /// separated by a single space.
    pub fn name_parts(&self) -> Option<(&str, &str)> {
        let mut parts = self.display_name.split(' ');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(given), Some(family), None) => Some((given, family)),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("no account found for {0:?}")]
    NotFound(String),

    #[error("subject {0:?} is not a numeric account id")]
    InvalidSubject(String),

    #[error("account database error: {0}")]
    System(String),
}

/// Resolves accounts by login name or by subject.
pub trait AccountDirectory: Send + Sync {
    fn by_login(&self, login: &str) -> Result<Account, LookupError>;

    fn by_subject(&self, subject: &str) -> Result<Account, LookupError>;
}

fn parse_subject(subject: &str) -> Result<u32, LookupError> {
    subject
        .parse()
        .map_err(|_| LookupError::InvalidSubject(subject.to_string()))
}

/// The host user database.
#[cfg(unix)]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAccounts;

#[cfg(unix)]
impl SystemAccounts {
    fn account(user: nix::unistd::User) -> Account {
        let gecos = user.gecos.to_string_lossy();
        // The first GECOS field is the full name; the rest is office/phone data.
        let display_name = gecos.split(',').next().unwrap_or_default().to_string();
        Account {
            uid: user.uid.as_raw(),
            login: user.name,
            display_name,
        }
    }
}

#[cfg(unix)]
impl AccountDirectory for SystemAccounts {
    fn by_login(&self, login: &str) -> Result<Account, LookupError> {
        nix::unistd::User::from_name(login)
            .map_err(|e| LookupError::System(e.to_string()))?
            .map(Self::account)
            .ok_or_else(|| LookupError::NotFound(login.to_string()))
    }

    fn by_subject(&self, subject: &str) -> Result<Account, LookupError> {
        let uid = nix::unistd::Uid::from_raw(parse_subject(subject)?);
        nix::unistd::User::from_uid(uid)
            .map_err(|e| LookupError::System(e.to_string()))?
            .map(Self::account)
            .ok_or_else(|| LookupError::NotFound(subject.to_string()))
    }
}

/// A fixed, in-memory account table.
#[derive(Debug, Clone, Default)]
pub struct StaticAccounts {
    by_uid: HashMap<u32, Account>,
}

impl StaticAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, account: Account) -> Self {
        self.by_uid.insert(account.uid, account);
        self
    }
}

impl AccountDirectory for StaticAccounts {
    fn by_login(&self, login: &str) -> Result<Account, LookupError> {
        self.by_uid
            .values()
            .find(|account| account.login == login)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(login.to_string()))
    }

    fn by_subject(&self, subject: &str) -> Result<Account, LookupError> {
        let uid = parse_subject(subject)?;
        self.by_uid
            .get(&uid)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(subject.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_parts_requires_exactly_two_words() {
        assert_eq!(
            Account::new(1000, "jdoe", "Jane Doe").name_parts(),
            Some(("Jane", "Doe"))
        );
        assert_eq!(Account::new(1000, "jdoe", "Jane").name_parts(), None);
        assert_eq!(Account::new(1000, "jdoe", "Jane Q Doe").name_parts(), None);
        assert_eq!(Account::new(1000, "jdoe", "Jane  Doe").name_parts(), None);
        assert_eq!(Account::new(1000, "jdoe", "").name_parts(), None);
    }

    #[test]
    fn test_subject_is_uid() {
        assert_eq!(Account::new(1234, "alice", "Alice").subject(), "1234");
    }

    #[test]
    fn test_static_lookup() {
        let accounts = StaticAccounts::new()
            .with_account(Account::new(1000, "jdoe", "Jane Doe"))
            .with_account(Account::new(1001, "alice", "Alice Smith"));

        assert_eq!(accounts.by_login("alice").unwrap().uid, 1001);
        assert_eq!(accounts.by_subject("1000").unwrap().login, "jdoe");
        assert!(matches!(
            accounts.by_login("mallory"),
            Err(LookupError::NotFound(_))
        ));
        assert!(matches!(
            accounts.by_subject("jdoe"),
            Err(LookupError::InvalidSubject(_))
        ));
        assert!(matches!(
            accounts.by_subject("4242"),
            Err(LookupError::NotFound(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_lookup_root() {
        let root = SystemAccounts.by_subject("0").unwrap();
        assert_eq!(root.uid, 0);
        assert_eq!(SystemAccounts.by_login(&root.login).unwrap().uid, 0);
    }
}
