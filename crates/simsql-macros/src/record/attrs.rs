//! Attribute parsing for the Record derive macro.
//!
//! Field attributes are written `#[record(...)]` on fields; the container
//! attribute `#[record(rename_all = "...")]` goes on the struct.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Expr, ExprLit, Ident, Lit, Meta, Result, Token,
};

/// Kind of value a column produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// `#[record(String)]`
    String,
    /// `#[record(Number)]`
    Number,
    /// `#[record(Timestamp)]`, read through `ToTimestamp`
    Timestamp,
    /// `#[record(Enum)]`, read through `ToDiscriminant`
    Enum,
    /// `#[record(Bool)]`
    Bool,
}

impl ColumnKind {
    /// Parse a column kind from an identifier.
    pub fn from_ident(ident: &Ident) -> Result<Self> {
        Self::from_name(&ident.to_string(), ident.span())
    }

    /// Parse a column kind from its name.
    pub fn from_name(name: &str, span: Span) -> Result<Self> {
        match name {
            "String" | "string" => Ok(ColumnKind::String),
            "Number" | "number" => Ok(ColumnKind::Number),
            "Timestamp" | "timestamp" => Ok(ColumnKind::Timestamp),
            "Enum" | "enum" | "enumeration" => Ok(ColumnKind::Enum),
            "Bool" | "bool" | "boolean" => Ok(ColumnKind::Bool),
            other => Err(Error::new(
                span,
                format!(
                    "unknown column kind: '{}'. Expected one of: String, Number, Timestamp, Enum, Bool",
                    other
                ),
            )),
        }
    }
}

/// Field-level attributes from `#[record(...)]`.
#[derive(Debug, Clone)]
pub struct FieldAttr {
    /// Explicit column kind; inferred from the field type when absent.
    pub kind: Option<ColumnKind>,
    /// Leave this field out of the record's columns.
    pub skip: bool,
    /// Column name to use instead of the field name.
    pub rename: Option<String>,
    /// Embed the columns of this field's record type.
    pub flatten: bool,
    /// Treat the field as `Option<_>` even when its type is an alias.
    pub optional: bool,
    /// The span for error reporting.
    pub span: Span,
}

impl Default for FieldAttr {
    fn default() -> Self {
        FieldAttr {
            kind: None,
            skip: false,
            rename: None,
            flatten: false,
            optional: false,
            span: Span::call_site(),
        }
    }
}

fn string_value(expr: &Expr, what: &str) -> Result<String> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s.value()),
        _ => Err(Error::new(expr.span(), format!("{} must be a string literal", what))),
    }
}

impl Parse for FieldAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) => {
                    if p.is_ident("skip") {
                        attr.skip = true;
                    } else if p.is_ident("flatten") {
                        attr.flatten = true;
                    } else if p.is_ident("optional") {
                        attr.optional = true;
                    } else if let Some(ident) = p.get_ident() {
                        attr.kind = Some(ColumnKind::from_ident(ident)?);
                        attr.span = ident.span();
                    } else {
                        return Err(Error::new(
                            p.span(),
                            "expected column kind (String, Number, Timestamp, Enum, Bool), skip, flatten or optional",
                        ));
                    }
                }

                // rename = "column" or kind = "enum"
                Meta::NameValue(nv) => {
                    if nv.path.is_ident("rename") {
                        attr.rename = Some(string_value(&nv.value, "rename")?);
                    } else if nv.path.is_ident("kind") {
                        let name = string_value(&nv.value, "kind")?;
                        attr.kind = Some(ColumnKind::from_name(&name, nv.value.span())?);
                        attr.span = nv.value.span();
                    } else {
                        return Err(Error::new(
                            nv.path.span(),
                            "unknown attribute. Expected: rename or kind",
                        ));
                    }
                }

                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown record attribute. Expected: a column kind, skip, flatten, optional, rename = \"...\", or kind = \"...\"",
                    ));
                }
            }
        }

        if attr.flatten && (attr.kind.is_some() || attr.rename.is_some() || attr.optional) {
            return Err(Error::new(
                attr.span,
                "flatten cannot be combined with a column kind, rename or optional",
            ));
        }

        Ok(attr)
    }
}

/// Extract `#[record(...)]` attributes from a field's attributes.
pub fn parse_field_attrs(attrs: &[Attribute]) -> Result<FieldAttr> {
    for attr in attrs {
        if attr.path().is_ident("record") {
            return attr.parse_args::<FieldAttr>();
        }
    }
    Ok(FieldAttr::default())
}

/// How field names become column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameRule {
    /// `created_at` → `createdAt`
    CamelCase,
    /// `created_at` → `CreatedAt`
    PascalCase,
    /// Field names as written.
    SnakeCase,
    /// `created_at` → `CREATED_AT`
    ScreamingSnakeCase,
}

impl RenameRule {
    fn from_name(name: &str, span: Span) -> Result<Self> {
        match name {
            "camelCase" => Ok(RenameRule::CamelCase),
            "PascalCase" => Ok(RenameRule::PascalCase),
            "snake_case" => Ok(RenameRule::SnakeCase),
            "SCREAMING_SNAKE_CASE" => Ok(RenameRule::ScreamingSnakeCase),
            other => Err(Error::new(
                span,
                format!(
                    "unknown rename rule: '{}'. Expected one of: camelCase, PascalCase, snake_case, SCREAMING_SNAKE_CASE",
                    other
                ),
            )),
        }
    }

    /// Applies the rule to a snake_case field name.
    pub fn apply(self, field: &str) -> String {
        match self {
            RenameRule::SnakeCase => field.to_string(),
            RenameRule::ScreamingSnakeCase => field.to_ascii_uppercase(),
            RenameRule::CamelCase | RenameRule::PascalCase => {
                let mut out = String::with_capacity(field.len());
                let mut upper = self == RenameRule::PascalCase;
                for c in field.chars() {
                    if c == '_' {
                        upper = !out.is_empty() || self == RenameRule::PascalCase;
                    } else if upper {
                        out.push(c.to_ascii_uppercase());
                        upper = false;
                    } else {
                        out.push(c);
                    }
                }
                out
            }
        }
    }
}

/// Struct-level attributes from `#[record(...)]`.
#[derive(Debug, Clone, Default)]
pub struct ContainerAttr {
    /// Rule applied to every field name without an explicit rename.
    pub rename_all: Option<RenameRule>,
}

impl Parse for ContainerAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = ContainerAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::NameValue(nv) if nv.path.is_ident("rename_all") => {
                    let name = string_value(&nv.value, "rename_all")?;
                    attr.rename_all = Some(RenameRule::from_name(&name, nv.value.span())?);
                }
                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown container attribute. Expected: rename_all = \"...\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

/// Extract `#[record(...)]` attributes from the struct's attributes.
pub fn parse_container_attrs(attrs: &[Attribute]) -> Result<ContainerAttr> {
    for attr in attrs {
        if attr.path().is_ident("record") {
            return attr.parse_args::<ContainerAttr>();
        }
    }
    Ok(ContainerAttr::default())
}
