use fxhash::FxHashSet;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::parse::Parser;
use syn::{Attribute, ItemFn, ItemStruct, Lit, LitStr, Meta};

/// Which serde directions a model participates in.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Both,
    Request,
    Response,
}

impl Direction {
    const fn serialize(self) -> bool {
        matches!(self, Self::Both | Self::Response)
    }

    const fn deserialize(self) -> bool {
        matches!(self, Self::Both | Self::Request)
    }
}

struct ApiModelArgs {
    direction: Direction,
    params: bool,
    rename_all: Option<LitStr>,
    deny_unknown_fields: Option<bool>,
}

/// Expands the `#[api_model]` attribute macro.
///
/// Adds the serde derives for the requested direction, `ToSchema` (and `IntoParams`
/// for query models) behind the `server` feature, and the camelCase/strict serde policy.
pub fn expand_api_model(args: TokenStream, input: ItemStruct) -> TokenStream {
    let args = match parse_api_model_args(args) {
        Ok(args) => args,
        Err(err) => return err,
    };
    let derives = derived_trait_names(&input.attrs);
    let serde_meta = match serde_meta_info(&input.attrs) {
        Ok(info) => info,
        Err(err) => return err,
    };

    let derive_attr = derive_attr(&derives, args.direction);
    let schema_attr = schema_attr(&derives, args.params);

    let rename_attr = match rename_attr(args.rename_all, &serde_meta) {
        Ok(attr) => attr,
        Err(err) => return err,
    };
    // Unknown-field checks only make sense for payloads we read.
    let deny_default = args.direction.deserialize();
    let deny_attr =
        match deny_unknown_attr(args.deny_unknown_fields.unwrap_or(deny_default), &serde_meta, &input) {
            Ok(attr) => attr,
            Err(err) => return err,
        };

    quote! {
        #derive_attr
        #schema_attr
        #rename_attr
        #deny_attr
        #input
    }
}

/// Expands the `#[api_handler]` attribute macro.
///
/// Registers the handler with `utoipa::path` behind the `server` feature and keeps the
/// signature untouched for axum.
pub fn expand_api_handler(args: TokenStream, input: ItemFn) -> TokenStream {
    if input.sig.asyncness.is_none() {
        return syn::Error::new_spanned(&input.sig.fn_token, "api_handler requires an async fn")
            .to_compile_error();
    }

    let ItemFn { attrs, vis, sig, block } = input;

    quote! {
        #(#attrs)*
        #[allow(clippy::unused_async)]
        #[cfg_attr(feature = "server", ::utoipa::path(#args))]
        #vis #sig #block
    }
}

fn parse_api_model_args(args: TokenStream) -> Result<ApiModelArgs, TokenStream> {
    let parser = syn::punctuated::Punctuated::<Meta, syn::Token![,]>::parse_terminated;
    let metas = parser.parse2(args).map_err(|err| err.to_compile_error())?;

    let mut parsed =
        ApiModelArgs { direction: Direction::Both, params: false, rename_all: None, deny_unknown_fields: None };

    for meta in metas {
        match meta {
            Meta::Path(path) if path.is_ident("request") || path.is_ident("response") => {
                if parsed.direction != Direction::Both {
                    return Err(syn::Error::new_spanned(path, "Direction is already set")
                        .to_compile_error());
                }
                parsed.direction =
                    if path.is_ident("request") { Direction::Request } else { Direction::Response };
            }
            Meta::Path(path) if path.is_ident("params") => parsed.params = true,
            Meta::NameValue(name_value) if name_value.path.is_ident("rename_all") => {
                let value = parse_string_literal(&name_value, "rename_all")?;
                parsed.rename_all = Some(set_once(parsed.rename_all, &name_value, value)?);
            }
            Meta::NameValue(name_value) if name_value.path.is_ident("deny_unknown_fields") => {
                let value = parse_bool_literal(&name_value, "deny_unknown_fields")?;
                parsed.deny_unknown_fields =
                    Some(set_once(parsed.deny_unknown_fields, &name_value, value)?);
            }
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "Unsupported argument; expected request, response, params, rename_all or deny_unknown_fields",
                )
                .to_compile_error());
            }
        }
    }

    if parsed.params && parsed.direction == Direction::Response {
        return Err(syn::Error::new(Span::call_site(), "params models must be deserializable")
            .to_compile_error());
    }

    Ok(parsed)
}

fn parse_bool_literal(name_value: &syn::MetaNameValue, label: &str) -> Result<bool, TokenStream> {
    if let syn::Expr::Lit(syn::ExprLit { lit: Lit::Bool(lit), .. }) = &name_value.value {
        return Ok(lit.value);
    }
    Err(syn::Error::new_spanned(&name_value.value, format!("{label} must be a boolean literal"))
        .to_compile_error())
}

fn parse_string_literal(
    name_value: &syn::MetaNameValue,
    label: &str,
) -> Result<LitStr, TokenStream> {
    if let syn::Expr::Lit(syn::ExprLit { lit: Lit::Str(lit), .. }) = &name_value.value {
        return Ok(lit.clone());
    }
    Err(syn::Error::new_spanned(&name_value.value, format!("{label} must be a string literal"))
        .to_compile_error())
}

fn set_once<T>(current: Option<T>, token: &syn::MetaNameValue, value: T) -> Result<T, TokenStream> {
    if current.is_some() {
        return Err(syn::Error::new_spanned(token, "Duplicate argument").to_compile_error());
    }
    Ok(value)
}

struct SerdeMetaInfo {
    rename_all: Option<LitStr>,
    deny_unknown_fields: bool,
}

fn derive_attr(derives: &FxHashSet<String>, direction: Direction) -> TokenStream {
    let mut tokens = Vec::new();
    if !derives.contains("Debug") {
        tokens.push(quote! { Debug });
    }
    if direction.serialize() && !derives.contains("Serialize") {
        tokens.push(quote! { ::serde::Serialize });
    }
    if direction.deserialize() && !derives.contains("Deserialize") {
        tokens.push(quote! { ::serde::Deserialize });
    }

    if tokens.is_empty() { quote! {} } else { quote! { #[derive(#(#tokens),*)] } }
}

fn schema_attr(derives: &FxHashSet<String>, params: bool) -> TokenStream {
    if params {
        if derives.contains("IntoParams") {
            return quote! {};
        }
        return quote! {
            #[cfg_attr(feature = "server", derive(::utoipa::IntoParams))]
            #[cfg_attr(feature = "server", into_params(parameter_in = Query))]
        };
    }
    if derives.contains("ToSchema") {
        quote! {}
    } else {
        quote! { #[cfg_attr(feature = "server", derive(::utoipa::ToSchema))] }
    }
}

fn rename_attr(
    rename_all: Option<LitStr>,
    serde_meta: &SerdeMetaInfo,
) -> Result<TokenStream, TokenStream> {
    let rename_all_value = rename_all.unwrap_or_else(|| LitStr::new("camelCase", Span::call_site()));

    match &serde_meta.rename_all {
        Some(existing) if existing.value() != rename_all_value.value() => Err(
            syn::Error::new_spanned(
                existing,
                "Conflicting serde rename_all; remove it or set api_model(rename_all = \"...\") to match",
            )
            .to_compile_error(),
        ),
        Some(_) => Ok(quote! {}),
        None => Ok(quote! { #[serde(rename_all = #rename_all_value)] }),
    }
}

fn deny_unknown_attr(
    deny_unknown: bool,
    serde_meta: &SerdeMetaInfo,
    input: &ItemStruct,
) -> Result<TokenStream, TokenStream> {
    if serde_meta.deny_unknown_fields {
        if !deny_unknown {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "deny_unknown_fields is already set via serde; remove it before disabling",
            )
            .to_compile_error());
        }
        return Ok(quote! {});
    }

    if deny_unknown { Ok(quote! { #[serde(deny_unknown_fields)] }) } else { Ok(quote! {}) }
}

fn serde_meta_info(attrs: &[Attribute]) -> Result<SerdeMetaInfo, TokenStream> {
    let mut info = SerdeMetaInfo { rename_all: None, deny_unknown_fields: false };

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                info.rename_all = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("deny_unknown_fields") {
                info.deny_unknown_fields = true;
            } else if meta.input.peek(syn::Token![=]) {
                // Skip values of serde options we don't inspect (e.g. `bound = "..."`).
                let _: syn::Expr = meta.value()?.parse()?;
            }
            Ok(())
        })
        .map_err(|err| err.to_compile_error())?;
    }

    Ok(info)
}

fn derived_trait_names(attrs: &[Attribute]) -> FxHashSet<String> {
    let mut traits = FxHashSet::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("derive")) {
        let _ = attr.parse_nested_meta(|meta| {
            if let Some(segment) = meta.path.segments.last() {
                traits.insert(segment.ident.to_string());
            }
            Ok(())
        });
    }

    traits
}
