use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Numeric chat participant identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Privilege held by a user. Admin and moderator are independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Moderator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Moderator => "moderator",
        }
    }

    /// Plural form used in replies ("removed from admins")
    pub fn plural(&self) -> &'static str {
        match self {
            Role::Admin => "admins",
            Role::Moderator => "moderators",
        }
    }

    /// Noun with article ("is already an admin")
    pub fn with_article(&self) -> &'static str {
        match self {
            Role::Admin => "an admin",
            Role::Moderator => "a moderator",
        }
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "moderator" => Ok(Role::Moderator),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_parse() {
        assert_eq!("111".parse::<UserId>(), Ok(UserId(111)));
        assert_eq!("-1001".parse::<UserId>(), Ok(UserId(-1001)));
        assert!("abc".parse::<UserId>().is_err());
        assert!("".parse::<UserId>().is_err());
    }

    #[test]
    fn test_role_parse_is_exact() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("moderator".parse::<Role>(), Ok(Role::Moderator));
        assert!("Admin".parse::<Role>().is_err());
        assert!("mod".parse::<Role>().is_err());
    }
}
