//! The remote content API, as seen by the producers.
//!
//! Producers only need one capability from the API: send a named method with a set
//! of parameters and get the decoded `response` payload back. [`HttpApi`] is the
//! production implementation; tests plug their own [`Api`] in.
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde_json::Value;

use self::error::ApiError;

pub mod error;
mod http;

pub use http::HttpApi;

/// Request parameters, kept ordered so requests are reproducible in logs.
pub type Params = BTreeMap<String, String>;

pub trait Api {
    fn request(&self, method: &str, params: &Params) -> Result<Value, ApiError>;
}

impl<A: Api + ?Sized> Api for &A {
    fn request(&self, method: &str, params: &Params) -> Result<Value, ApiError> {
        (**self).request(method, params)
    }
}

impl<A: Api + ?Sized> Api for Box<A> {
    fn request(&self, method: &str, params: &Params) -> Result<Value, ApiError> {
        (**self).request(method, params)
    }
}

/// Whose content a producer walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    /// The account the access token belongs to.
    Current,
    User(i64),
    Group(i64),
}

impl Owner {
    /// Base parameter set identifying this owner.
    pub fn params(self) -> Params {
        let mut params = Params::new();
        match self {
            Self::Current => {}
            Self::User(id) => {
                params.insert("uid".into(), id.to_string());
            }
            Self::Group(id) => {
                params.insert("gid".into(), id.to_string());
            }
        }
        params
    }
}

impl From<Option<i64>> for Owner {
    fn from(user: Option<i64>) -> Self {
        user.map_or(Self::Current, Self::User)
    }
}

impl Display for Owner {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Current => write!(f, "current user"),
            Self::User(id) => write!(f, "user {id}"),
            Self::Group(id) => write!(f, "group {id}"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::Owner;

    #[test]
    fn owner_params() {
        assert!(Owner::Current.params().is_empty());
        assert_eq!(Owner::User(7).params().get("uid").map(String::as_str), Some("7"));
        assert_eq!(Owner::Group(9).params().get("gid").map(String::as_str), Some("9"));
        assert_eq!(Owner::from(None), Owner::Current);
    }
}
