//! Parsing of `#[field(...)]` attributes.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Expr, ExprLit, Ident, Lit, LitStr, Meta, Result, Token,
};

const EXPECTED_KINDS: &str = "String, Number, Timestamp, Enum, Bool";

/// Kind of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Timestamp,
    Enum,
    Bool,
}

impl FieldType {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "String" | "string" => Some(FieldType::String),
            "Number" | "number" => Some(FieldType::Number),
            "Timestamp" | "timestamp" => Some(FieldType::Timestamp),
            "Enum" | "enum" | "enumeration" => Some(FieldType::Enum),
            "Bool" | "bool" | "boolean" => Some(FieldType::Bool),
            _ => None,
        }
    }

    /// Parses a bare kind such as `#[field(Number)]`.
    pub fn from_ident(ident: &Ident) -> Result<Self> {
        Self::from_name(&ident.to_string()).ok_or_else(|| {
            Error::new(
                ident.span(),
                format!("unknown field kind '{ident}', expected one of: {EXPECTED_KINDS}"),
            )
        })
    }

    /// Parses a quoted kind such as `#[field(ty = "enum")]`.
    pub fn from_lit(lit: &LitStr) -> Result<Self> {
        let name = lit.value();
        Self::from_name(&name).ok_or_else(|| {
            Error::new(
                lit.span(),
                format!("unknown field kind '{name}', expected one of: {EXPECTED_KINDS}"),
            )
        })
    }

    /// The matching `::sieve::FieldKind` path.
    pub fn kind_tokens(self) -> TokenStream {
        match self {
            FieldType::String => quote! { ::sieve::FieldKind::String },
            FieldType::Number => quote! { ::sieve::FieldKind::Number },
            FieldType::Timestamp => quote! { ::sieve::FieldKind::Timestamp },
            FieldType::Enum => quote! { ::sieve::FieldKind::Enum },
            FieldType::Bool => quote! { ::sieve::FieldKind::Bool },
        }
    }
}

/// Contents of one `#[field(...)]` attribute.
#[derive(Debug, Clone)]
pub struct FieldAttr {
    pub ty: Option<FieldType>,
    pub skip: bool,
    /// Field path exposed to criteria, if not the Rust field name.
    pub rename: Option<String>,
    pub span: Span,
}

impl Default for FieldAttr {
    fn default() -> Self {
        FieldAttr {
            ty: None,
            skip: false,
            rename: None,
            span: Span::call_site(),
        }
    }
}

impl FieldAttr {
    fn set_type(&mut self, ty: FieldType, span: Span) -> Result<()> {
        if self.ty.is_some() {
            return Err(Error::new(span, "field kind given more than once"));
        }
        self.ty = Some(ty);
        self.span = span;
        Ok(())
    }
}

fn string_value<'a>(expr: &'a Expr, key: &str) -> Result<&'a LitStr> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s),
        _ => Err(Error::new(expr.span(), format!("{key} must be a string literal"))),
    }
}

impl Parse for FieldAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();
        let items: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in items {
            match &meta {
                Meta::Path(path) if path.is_ident("skip") => attr.skip = true,
                Meta::Path(path) => {
                    let ident = path.get_ident().ok_or_else(|| {
                        Error::new(path.span(), format!("expected {EXPECTED_KINDS} or skip"))
                    })?;
                    attr.set_type(FieldType::from_ident(ident)?, ident.span())?;
                }
                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    let name = string_value(&nv.value, "rename")?;
                    if name.value().is_empty() {
                        return Err(Error::new(name.span(), "rename must not be empty"));
                    }
                    attr.rename = Some(name.value());
                }
                Meta::NameValue(nv) if nv.path.is_ident("ty") => {
                    let lit = string_value(&nv.value, "ty")?;
                    attr.set_type(FieldType::from_lit(lit)?, lit.span())?;
                }
                Meta::NameValue(nv) => {
                    return Err(Error::new(
                        nv.path.span(),
                        "unknown key, expected rename or ty",
                    ));
                }
                Meta::List(list) => {
                    return Err(Error::new(
                        list.span(),
                        format!(
                            "unexpected list, expected {EXPECTED_KINDS}, skip, rename = \"...\" or ty = \"...\""
                        ),
                    ));
                }
            }
        }

        if attr.skip && (attr.ty.is_some() || attr.rename.is_some()) {
            return Err(Error::new(
                attr.span,
                "skip cannot be combined with a kind or rename",
            ));
        }

        Ok(attr)
    }
}

/// Reads the `#[field(...)]` attribute of a struct field.
///
/// More than one `#[field]` attribute on the same field is an error.
pub fn parse_field_attrs(attrs: &[Attribute]) -> Result<FieldAttr> {
    let mut found: Option<FieldAttr> = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("field")) {
        if found.is_some() {
            return Err(Error::new(attr.span(), "duplicate #[field] attribute"));
        }
        found = Some(attr.parse_args::<FieldAttr>()?);
    }
    Ok(found.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(tokens: &str) -> Result<FieldAttr> {
        syn::parse_str::<FieldAttr>(tokens)
    }

    #[test]
    fn bare_kinds() {
        assert_eq!(parse("String").unwrap().ty, Some(FieldType::String));
        assert_eq!(parse("number").unwrap().ty, Some(FieldType::Number));
        assert_eq!(parse("Timestamp").unwrap().ty, Some(FieldType::Timestamp));
        assert_eq!(parse("Enum").unwrap().ty, Some(FieldType::Enum));
        assert_eq!(parse("enumeration").unwrap().ty, Some(FieldType::Enum));
        assert_eq!(parse("Bool").unwrap().ty, Some(FieldType::Bool));
        assert_eq!(parse("boolean").unwrap().ty, Some(FieldType::Bool));
    }

    #[test]
    fn quoted_kind() {
        let attr = parse(r#"ty = "enum", rename = "state""#).unwrap();
        assert_eq!(attr.ty, Some(FieldType::Enum));
        assert_eq!(attr.rename.as_deref(), Some("state"));
    }

    #[test]
    fn skip() {
        let attr = parse("skip").unwrap();
        assert!(attr.skip);
        assert_eq!(attr.ty, None);
    }

    #[test]
    fn dotted_rename() {
        let attr = parse(r#"String, rename = "address.city""#).unwrap();
        assert_eq!(attr.rename.as_deref(), Some("address.city"));
    }

    #[test]
    fn rejects_bad_input() {
        let err = parse("Decimal").unwrap_err().to_string();
        assert!(err.contains("unknown field kind 'Decimal'"));

        assert!(parse("String, Number").is_err());
        assert!(parse("skip, String").is_err());
        assert!(parse(r#"rename = 3"#).is_err());
        assert!(parse(r#"rename = """#).is_err());
        assert!(parse(r#"alias = "x""#).is_err());
        assert!(parse("String(x)").is_err());
    }

    #[test]
    fn duplicate_attributes() {
        let field: syn::Field = syn::parse_quote! {
            #[field(String)]
            #[field(Number)]
            name: String
        };
        assert!(parse_field_attrs(&field.attrs).is_err());

        let plain: syn::Field = syn::parse_quote! {
            #[serde(default)]
            name: String
        };
        let attr = parse_field_attrs(&plain.attrs).unwrap();
        assert!(attr.ty.is_none() && !attr.skip);
    }
}
