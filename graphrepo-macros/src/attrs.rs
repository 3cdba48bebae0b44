//! Parsing of `#[graph(...)]` attributes.

use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::{Attribute, Data, DeriveInput, Expr, ExprLit, Fields, Ident, Lit, LitStr, Meta, Token};

/// Role a field plays in the graph mapping.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    Id,
    Start,
    End,
}

/// A tagged field and the key serde writes it under.
#[derive(Clone)]
pub struct GraphField {
    pub ident: Ident,
    pub key: String,
}

/// Fields tagged with a graph role.
#[derive(Default)]
pub struct GraphFields {
    pub id: Option<GraphField>,
    pub start: Option<GraphField>,
    pub end: Option<GraphField>,
}

/// Reads the label from `#[graph(<key> = "...")]` on the struct.
///
/// Falls back to the struct name when no label is given.
pub fn parse_label(input: &DeriveInput, key: &str) -> syn::Result<String> {
    let mut label: Option<String> = None;

    for attr in &input.attrs {
        if !attr.path().is_ident("graph") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident(key) {
                let value: LitStr = meta.value()?.parse()?;
                label = Some(value.value());
                Ok(())
            } else {
                Err(meta.error(format!("unsupported graph attribute, expected `{}`", key)))
            }
        })?;
    }

    Ok(label.unwrap_or_else(|| input.ident.to_string()))
}

/// Collects the fields tagged `#[graph(id)]`, `#[graph(start)]` and `#[graph(end)]`.
pub fn parse_fields(input: &DeriveInput, derive_name: &str) -> syn::Result<GraphFields> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    format!("{} can only be derived for structs with named fields", derive_name),
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                format!("{} can only be derived for structs", derive_name),
            ));
        }
    };

    let rename_all = serde_rename(&input.attrs, "rename_all")?;
    let mut result = GraphFields::default();

    for field in fields {
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        for attr in &field.attrs {
            if !attr.path().is_ident("graph") {
                continue;
            }
            let mut role: Option<FieldRole> = None;
            attr.parse_nested_meta(|meta| {
                role = Some(if meta.path.is_ident("id") {
                    FieldRole::Id
                } else if meta.path.is_ident("start") {
                    FieldRole::Start
                } else if meta.path.is_ident("end") {
                    FieldRole::End
                } else {
                    return Err(meta.error("expected `id`, `start` or `end`"));
                });
                Ok(())
            })?;

            let slot = match role {
                Some(FieldRole::Id) => &mut result.id,
                Some(FieldRole::Start) => &mut result.start,
                Some(FieldRole::End) => &mut result.end,
                None => continue,
            };
            if slot.is_some() {
                return Err(syn::Error::new_spanned(
                    attr,
                    "graph field role declared more than once",
                ));
            }
            let key = match serde_rename(&field.attrs, "rename")? {
                Some(key) => key.value(),
                None => field_key(&ident, rename_all.as_ref())?,
            };
            *slot = Some(GraphField {
                ident: ident.clone(),
                key,
            });
        }
    }

    Ok(result)
}

/// Returns the tagged field or a spanned error naming the missing attribute.
pub fn require(
    input: &DeriveInput,
    field: Option<GraphField>,
    attribute: &str,
    derive_name: &str,
) -> syn::Result<GraphField> {
    field.ok_or_else(|| {
        syn::Error::new_spanned(
            &input.ident,
            format!("{} requires a field tagged `#[graph({})]`", derive_name, attribute),
        )
    })
}

/// Reads `#[serde(<key> = "...")]`, also in its
/// `<key>(serialize = "...", deserialize = "...")` form.
fn serde_rename(attrs: &[Attribute], key: &str) -> syn::Result<Option<LitStr>> {
    let mut found = None;
    for attr in attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }
        let metas = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
        for meta in metas.iter().filter(|meta| meta.path().is_ident(key)) {
            found = Some(rename_value(meta)?);
        }
    }
    Ok(found)
}

fn rename_value(meta: &Meta) -> syn::Result<LitStr> {
    match meta {
        Meta::NameValue(pair) => lit_str(&pair.value),
        Meta::List(list) => {
            let mut serialize = None;
            let mut deserialize = None;
            let pairs = list.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
            for pair in &pairs {
                let Meta::NameValue(pair) = pair else {
                    return Err(syn::Error::new_spanned(pair, "expected `serialize` or `deserialize`"));
                };
                let value = lit_str(&pair.value)?;
                if pair.path.is_ident("serialize") {
                    serialize = Some(value);
                } else if pair.path.is_ident("deserialize") {
                    deserialize = Some(value);
                } else {
                    return Err(syn::Error::new_spanned(pair, "expected `serialize` or `deserialize`"));
                }
            }
            match (serialize, deserialize) {
                (Some(serialize), Some(deserialize)) if serialize.value() == deserialize.value() => {
                    Ok(serialize)
                }
                _ => Err(syn::Error::new_spanned(
                    meta,
                    "graph fields must serialize and deserialize under the same name",
                )),
            }
        }
        Meta::Path(path) => Err(syn::Error::new_spanned(path, "expected a name")),
    }
}

fn lit_str(expr: &Expr) -> syn::Result<LitStr> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(value),
            ..
        }) => Ok(value.clone()),
        other => Err(syn::Error::new_spanned(other, "expected a string literal")),
    }
}

/// The serialized key of a field under the struct's `rename_all` rule.
fn field_key(ident: &Ident, rename_all: Option<&LitStr>) -> syn::Result<String> {
    let field = ident.unraw().to_string();
    let Some(rule) = rename_all else {
        return Ok(field);
    };
    let pascal = || -> String {
        field
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect()
    };
    let key = match rule.value().as_str() {
        "lowercase" | "snake_case" => field.clone(),
        "UPPERCASE" | "SCREAMING_SNAKE_CASE" => field.to_ascii_uppercase(),
        "PascalCase" => pascal(),
        "camelCase" => {
            let pascal = pascal();
            let mut chars = pascal.chars();
            match chars.next() {
                Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        }
        "kebab-case" => field.replace('_', "-"),
        "SCREAMING-KEBAB-CASE" => field.to_ascii_uppercase().replace('_', "-"),
        other => {
            return Err(syn::Error::new_spanned(
                rule,
                format!("unsupported serde rename_all rule `{}`", other),
            ))
        }
    };
    Ok(key)
}
