//! Implementation of the `#[derive(Record)]` macro.
//!
//! Generates an implementation of `simsql::Record` that declares one column
//! per queryable field, plus column name constants.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{
    spanned::Spanned, Data, DeriveInput, Error, Fields, GenericArgument, PathArguments, Result,
    Type,
};

use super::attrs::{parse_container_attrs, parse_field_attrs, ColumnKind};

/// Main implementation of the Record derive macro.
pub fn record_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let container = parse_container_attrs(&input.attrs)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Record can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Record can only be derived for structs",
            ))
        }
    };

    let mut declarations: Vec<TokenStream> = Vec::new();
    let mut column_constants: Vec<TokenStream> = Vec::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let attrs = parse_field_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }

        if attrs.flatten {
            let ty = &field.ty;
            declarations.push(quote! {
                shape.flatten::<#ty>(|record| &record.#field_name);
            });
            continue;
        }

        let (optional, inner) = match option_inner(&field.ty) {
            Some(inner) => (true, inner),
            None => (attrs.optional, &field.ty),
        };

        // Fields of unknown type stay out unless annotated.
        let kind = match attrs.kind.or_else(|| infer_kind(inner)) {
            Some(kind) => kind,
            None => continue,
        };

        let ident_name = field_name.to_string();
        let ident_name = ident_name.trim_start_matches("r#");
        let column = match (attrs.rename, container.rename_all) {
            (Some(rename), _) => rename,
            (None, Some(rule)) => rule.apply(ident_name),
            (None, None) => ident_name.to_string(),
        };

        let const_name = format_ident!("{}", to_screaming_snake_case(&column));
        column_constants.push(quote! {
            /// Column name constant for type-safe queries.
            pub const #const_name: &'static str = #column;
        });

        let value = value_expr(kind);
        let getter = if optional {
            quote! {
                |record| match &record.#field_name {
                    ::core::option::Option::Some(value) => #value,
                    ::core::option::Option::None => ::simsql::Value::None,
                }
            }
        } else {
            quote! {
                |record| {
                    let value = &record.#field_name;
                    #value
                }
            }
        };

        declarations.push(quote! {
            shape.column(#column, #getter);
        });
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            #(#column_constants)*
        }

        impl #impl_generics ::simsql::Record for #struct_name #ty_generics #where_clause {
            fn describe(shape: &mut ::simsql::ShapeBuilder<Self>) {
                #(#declarations)*
            }
        }
    };

    Ok(expanded)
}

/// Expression turning `value: &Field` into a `simsql::Value`.
fn value_expr(kind: ColumnKind) -> TokenStream {
    match kind {
        ColumnKind::String => quote! {
            ::simsql::Value::String(::core::convert::AsRef::<str>::as_ref(value))
        },
        ColumnKind::Number => quote! {
            ::simsql::Value::Number(::simsql::Number::from(*value))
        },
        ColumnKind::Timestamp => quote! {
            ::simsql::Value::Timestamp(::simsql::ToTimestamp::to_timestamp(value))
        },
        ColumnKind::Enum => quote! {
            ::simsql::Value::Enum(::simsql::ToDiscriminant::discriminant(value))
        },
        ColumnKind::Bool => quote! {
            ::simsql::Value::Bool(*value)
        },
    }
}

/// Returns `X` when `ty` is written `Option<X>`.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    match &segment.arguments {
        PathArguments::AngleBracketed(args) if args.args.len() == 1 => match args.args.first() {
            Some(GenericArgument::Type(inner)) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}

/// Infers the column kind from how the field type is written.
fn infer_kind(ty: &Type) -> Option<ColumnKind> {
    match ty {
        Type::Reference(reference) => match &*reference.elem {
            Type::Path(path) if path.path.is_ident("str") => Some(ColumnKind::String),
            _ => None,
        },
        Type::Path(path) => {
            let segment = path.path.segments.last()?;
            match segment.ident.to_string().as_str() {
                "String" => Some(ColumnKind::String),
                "Box" | "Rc" | "Arc" | "Cow" if generic_is_str(&segment.arguments) => {
                    Some(ColumnKind::String)
                }
                "i8" | "i16" | "i32" | "i64" | "isize" | "u8" | "u16" | "u32" | "u64"
                | "usize" | "f32" | "f64" => Some(ColumnKind::Number),
                "bool" => Some(ColumnKind::Bool),
                "Timestamp" | "SystemTime" => Some(ColumnKind::Timestamp),
                _ => None,
            }
        }
        _ => None,
    }
}

fn generic_is_str(arguments: &PathArguments) -> bool {
    let PathArguments::AngleBracketed(args) = arguments else {
        return false;
    };
    args.args.iter().any(|arg| match arg {
        GenericArgument::Type(Type::Path(path)) => path.path.is_ident("str"),
        _ => false,
    })
}

/// Convert a string to SCREAMING_SNAKE_CASE.
fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c == '_' || c == '-' {
            result.push('_');
            prev_was_lower = false;
        } else {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = true;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(src: &str) -> Result<String> {
        let input: DeriveInput = syn::parse_str(src)?;
        record_derive_impl(input).map(|tokens| tokens.to_string())
    }

    fn ty(src: &str) -> Type {
        syn::parse_str(src).unwrap()
    }

    #[test]
    fn test_screaming_snake_case() {
        assert_eq!(to_screaming_snake_case("name"), "NAME");
        assert_eq!(to_screaming_snake_case("created_at"), "CREATED_AT");
        assert_eq!(to_screaming_snake_case("strValue"), "STR_VALUE");
        assert_eq!(to_screaming_snake_case("my-field"), "MY_FIELD");
    }

    #[test]
    fn test_infer_kind() {
        assert_eq!(infer_kind(&ty("String")), Some(ColumnKind::String));
        assert_eq!(infer_kind(&ty("&'static str")), Some(ColumnKind::String));
        assert_eq!(infer_kind(&ty("Box<str>")), Some(ColumnKind::String));
        assert_eq!(infer_kind(&ty("std::sync::Arc<str>")), Some(ColumnKind::String));
        assert_eq!(infer_kind(&ty("u64")), Some(ColumnKind::Number));
        assert_eq!(infer_kind(&ty("f32")), Some(ColumnKind::Number));
        assert_eq!(infer_kind(&ty("bool")), Some(ColumnKind::Bool));
        assert_eq!(infer_kind(&ty("simsql::Timestamp")), Some(ColumnKind::Timestamp));
        assert_eq!(infer_kind(&ty("Vec<u8>")), None);
        assert_eq!(infer_kind(&ty("Box<u8>")), None);
    }

    #[test]
    fn test_option_inner() {
        assert!(option_inner(&ty("Option<i32>")).is_some());
        assert!(option_inner(&ty("std::option::Option<String>")).is_some());
        assert!(option_inner(&ty("Vec<i32>")).is_none());
    }

    #[test]
    fn test_expand_columns_and_constants() {
        let out = expand(
            r#"
            #[record(rename_all = "camelCase")]
            struct Dto {
                str_value: String,
                int_value: Option<i32>,
                #[record(rename = "total")]
                long_value: i64,
                #[record(skip)]
                hidden: String,
                other: Vec<u8>,
            }
            "#,
        )
        .unwrap();
        assert!(out.contains("\"strValue\""));
        assert!(out.contains("\"intValue\""));
        assert!(out.contains("\"total\""));
        assert!(out.contains("STR_VALUE"));
        assert!(out.contains("INT_VALUE"));
        assert!(out.contains("TOTAL"));
        assert!(!out.contains("hidden"));
        assert!(!out.contains("\"other\""));
        assert!(out.contains("Option :: None"));
    }

    #[test]
    fn test_expand_flatten() {
        let out = expand(
            r#"
            struct Derived {
                #[record(flatten)]
                base: Base,
                own: bool,
            }
            "#,
        )
        .unwrap();
        assert!(out.contains("flatten :: < Base >"));
        assert!(out.contains("\"own\""));
    }

    #[test]
    fn test_rejects_non_structs() {
        let err = expand("enum E { A }").unwrap_err();
        assert!(err.to_string().contains("only be derived for structs"));

        let err = expand("struct T(u32);").unwrap_err();
        assert!(err.to_string().contains("named fields"));
    }
}
