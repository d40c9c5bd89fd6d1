//! Namespace grammar.
//!
//! Declarations refer to handlers by dotted strings:
//!
//! | reference              | meaning                                        |
//! |------------------------|------------------------------------------------|
//! | `key`, `this.key`      | a member of the owning entity                  |
//! | `Entity.key`           | a member of another entity                     |
//! | `Entity.context.key`   | a key in a named collection of another entity  |
//!
//! [`qualify`] rewrites the first two forms into `Owner.key`; [`tokenize`]
//! splits a qualified reference into a [`Namespace`].

use std::fmt;

use daedalus_core::{Context, LinkError, LinkResult};

/// The token naming the owning entity.
pub const SELF_TOKEN: &str = "this";

/// A tokenized, fully-qualified reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    entity: String,
    context: Option<Context>,
    key: String,
}

impl Namespace {
    /// Returns the target entity identity.
    #[must_use]
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Returns the collection named by the reference, if any.
    #[must_use]
    pub const fn context(&self) -> Option<Context> {
        self.context
    }

    /// Returns the member key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.context {
            Some(context) => write!(f, "{}.{}.{}", self.entity, context, self.key),
            None => write!(f, "{}.{}", self.entity, self.key),
        }
    }
}

/// Qualifies a reference relative to its owning entity.
///
/// Bare keys and `this.` references become `Owner.key`; references naming
/// another entity are returned unchanged.
///
/// # Errors
///
/// Returns [`LinkError::InvalidDeclaration`] if the reference has an empty
/// segment or is the bare self token.
///
/// # Example
///
/// ```
/// use daedalus_linker::namespace::qualify;
///
/// assert_eq!(qualify("find", "UserController").unwrap(), "UserController.find");
/// assert_eq!(qualify("this.find", "UserController").unwrap(), "UserController.find");
/// assert_eq!(
///     qualify("AuthService.filters.isAuth", "UserController").unwrap(),
///     "AuthService.filters.isAuth"
/// );
/// ```
pub fn qualify(reference: &str, owner: &str) -> LinkResult<String> {
    if reference.split('.').any(str::is_empty) {
        return Err(LinkError::invalid_declaration(
            owner,
            format!("reference '{reference}' has an empty segment"),
        ));
    }

    match reference.split_once('.') {
        None if reference == SELF_TOKEN => Err(LinkError::invalid_declaration(
            owner,
            format!("reference '{SELF_TOKEN}' names no member"),
        )),
        None => Ok(format!("{owner}.{reference}")),
        Some((SELF_TOKEN, rest)) => Ok(format!("{owner}.{rest}")),
        Some(_) => Ok(reference.to_string()),
    }
}

/// Qualifies a reference and splits it into a [`Namespace`].
///
/// # Errors
///
/// Returns [`LinkError::InvalidDeclaration`] if the reference is malformed,
/// names an unknown collection, or has more than three segments.
pub fn tokenize(reference: &str, owner: &str) -> LinkResult<Namespace> {
    let qualified = qualify(reference, owner)?;
    let segments: Vec<&str> = qualified.split('.').collect();

    let (entity, context, key) = match segments.as_slice() {
        [entity, key] => (*entity, None, *key),
        [entity, context, key] => {
            let context = Context::from_segment(context).ok_or_else(|| {
                LinkError::invalid_declaration(
                    owner,
                    format!("reference '{reference}' names unknown collection '{context}'"),
                )
            })?;
            (*entity, Some(context), *key)
        }
        _ => {
            return Err(LinkError::invalid_declaration(
                owner,
                format!("reference '{reference}' has too many segments"),
            ))
        }
    };

    Ok(Namespace {
        entity: entity.to_string(),
        context,
        key: key.to_string(),
    })
}
