//! Proc macros for Sieve.
//!
//! - [`Record`] - Generate the typed accessor and field schema used by
//!   Sieve filter, sort and search builders
//!
//! Most users enable the `derive` feature of `sieve` and import the macro
//! from there instead of depending on this crate directly.

mod record;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `sieve::Record` for a struct with named fields.
///
/// Only fields carrying a kind are exposed; everything else is invisible to
/// criteria and reported as unknown when a builder validates a field path.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `String` | Any `AsRef<str>` field |
/// | `Number` | A primitive numeric field (`Copy`, converted with `Number::from`) |
/// | `Timestamp` | A field implementing `IntoTimestamp` |
/// | `Enum` | A field implementing `Discriminant` |
/// | `Bool` | A `bool` field |
/// | `ty = "..."` | Same as the bare kind, as a string |
/// | `skip` | Exclude the field |
/// | `rename = "..."` | Expose the field under another path |
///
/// # Generated Code
///
/// 1. A `pub const` per exposed field holding its path (`User::AGE`)
/// 2. `Record::field_value`, matching paths to borrowed values
/// 3. `Record::field_kind`, the static schema used for validation
///
/// # Example
///
/// ```ignore
/// use sieve::{Record, Specification};
///
/// #[derive(Record)]
/// struct User {
///     #[field(String)]
///     name: String,
///
///     #[field(Number, rename = "years")]
///     age: u8,
///
///     #[field(skip)]
///     password_hash: String,
/// }
///
/// let mut spec = Specification::<User>::new();
/// spec.filter_mut().and_gte(User::YEARS, 18)?;
/// ```
#[proc_macro_derive(Record, attributes(field))]
pub fn record_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::record_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
