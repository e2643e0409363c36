#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros for the Courier infrastructure.
//!
//! Every crate in the workspace declares exactly one error enum, and this crate
//! keeps those enums uniform: same derives, same context plumbing, same
//! conversions.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! courier-derive = { path = "../infra/derive" }
//! thiserror = "2"
//! ```

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for defining crate-level error enums.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` unless already present.
/// * **Context Support**: Generates a companion `...Ext` trait that adds `.context()`
///   to any `Result` that can be converted into this error type.
/// * **Standard Conversions**: Implements `From<T>` for variants containing a source field,
///   enabling the `?` operator for upstream errors.
/// * **Internal Fallback**: Provides `From<&'static str>` and `From<String>` when an
///   `Internal` variant is present.
/// * **Accessor**: Adds `attached_context()` returning the context string, if any.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum** with **named-field** variants only.
/// 2. Variants that support context include a `context: Option<Cow<'static, str>>` field.
/// 3. Variants wrapping external errors include a `source` field (or a field marked
///    `#[source]`/`#[from]`) and must also carry the context field.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[courier_derive::courier_error]
/// pub enum PrefsError {
///     #[error("I/O failure{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read(path: &std::path::Path) -> Result<String, PrefsError> {
///     std::fs::read_to_string(path).context("Reading preferences")
/// }
/// ```
#[proc_macro_attribute]
pub fn courier_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}
