//! Shared utilities and strongly-typed common values for workspace crates.
//!
//! ```rust
//! use pcommon::{ChatId, CompanyId, MetadataMap, OrganizationId};
//!
//! let chat = ChatId::from("chat-1");
//! let organization = OrganizationId::new("org-1");
//! let company = CompanyId::new("company-1");
//! let mut metadata = MetadataMap::new();
//! metadata.insert("tenant".to_string(), "acme".to_string());
//!
//! assert_eq!(chat.as_str(), "chat-1");
//! assert_eq!(organization.to_string(), "org-1");
//! assert_eq!(company.as_str(), "company-1");
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use pcommon::BoxFuture;
    //!
    //! fn str_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = str_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Shared metadata and cross-crate identifier newtypes.
    //!
    //! ```rust
    //! use pcommon::{ChatId, OrganizationId};
    //!
    //! let chat = ChatId::new("chat-42");
    //! let organization = OrganizationId::from("org-42");
    //!
    //! assert_eq!(chat.to_string(), "chat-42");
    //! assert_eq!(organization.as_str(), "org-42");
    //! ```

    use std::collections::HashMap;
    use std::fmt::{Display, Formatter};

    pub type MetadataMap = HashMap<String, String>;

    macro_rules! string_id {
        ($name:ident) => {
            #[derive(Debug, Clone, PartialEq, Eq, Hash)]
            pub struct $name(String);

            impl $name {
                pub fn new(value: impl Into<String>) -> Self {
                    Self(value.into())
                }

                pub fn as_str(&self) -> &str {
                    self.0.as_str()
                }
            }

            impl Display for $name {
                fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<String> for $name {
                fn from(value: String) -> Self {
                    Self(value)
                }
            }

            impl From<&str> for $name {
                fn from(value: &str) -> Self {
                    Self(value.to_string())
                }
            }
        };
    }

    string_id!(ChatId);
    string_id!(OrganizationId);
    string_id!(CompanyId);
}

pub use context::{ChatId, CompanyId, MetadataMap, OrganizationId};
pub use future::BoxFuture;

#[cfg(test)]
mod tests {
    use super::{ChatId, CompanyId, OrganizationId};

    #[test]
    fn id_newtypes_round_trip_strings() {
        let chat = ChatId::new("chat-1");
        let organization = OrganizationId::from("org-1");
        let company = CompanyId::from("company-1".to_string());

        assert_eq!(chat.as_str(), "chat-1");
        assert_eq!(organization.as_str(), "org-1");
        assert_eq!(company.as_str(), "company-1");
        assert_eq!(chat.to_string(), "chat-1");
    }

    #[test]
    fn id_newtypes_are_usable_as_map_keys() {
        let mut seen = std::collections::HashMap::new();
        seen.insert(ChatId::new("chat-1"), 1_u32);

        assert_eq!(seen.get(&ChatId::from("chat-1")), Some(&1));
        assert_eq!(seen.get(&ChatId::from("chat-2")), None);
    }
}
