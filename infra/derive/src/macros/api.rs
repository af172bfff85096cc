use fxhash::FxHashSet;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::parse::Parser;
use syn::{Attribute, ItemFn, ItemStruct, LitBool, LitStr};

const DEFAULT_CASE: &str = "snake_case";

/// Options of `#[api_model(..)]`, merged with whatever `#[serde(..)]` the struct already carries.
#[derive(Default)]
struct ModelOptions {
    rename_all: Option<LitStr>,
    deny_unknown_fields: Option<LitBool>,
}

impl ModelOptions {
    fn parse(&mut self, meta: &ParseNestedMeta<'_>) -> syn::Result<()> {
        if meta.path.is_ident("rename_all") {
            return assign(&mut self.rename_all, meta.value()?.parse()?, meta);
        }
        if meta.path.is_ident("deny_unknown_fields") {
            return assign(&mut self.deny_unknown_fields, meta.value()?.parse()?, meta);
        }
        Err(meta.error("expected `rename_all` or `deny_unknown_fields`"))
    }
}

fn assign<T>(slot: &mut Option<T>, value: T, meta: &ParseNestedMeta<'_>) -> syn::Result<()> {
    if slot.replace(value).is_some() {
        return Err(meta.error("Duplicate argument"));
    }
    Ok(())
}

/// What the struct already says through `#[serde(..)]`.
#[derive(Default)]
struct SerdeState {
    rename_all: Option<LitStr>,
    deny_unknown_fields: bool,
}

impl SerdeState {
    fn read(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut state = Self::default();
        for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename_all") {
                    state.rename_all = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("deny_unknown_fields") {
                    state.deny_unknown_fields = true;
                } else if meta.input.peek(syn::Token![=]) {
                    // Other serde keys are left to serde; skip their values.
                    let _: syn::Expr = meta.value()?.parse()?;
                }
                Ok(())
            })?;
        }
        Ok(state)
    }
}

/// `#[api_model]`: serde + schema derives, `snake_case` names and strict fields by default.
pub fn expand_api_model(args: TokenStream, input: ItemStruct) -> TokenStream {
    match api_model(args, &input) {
        Ok(attrs) => quote! {
            #attrs
            #input
        },
        Err(err) => err.to_compile_error(),
    }
}

fn api_model(args: TokenStream, input: &ItemStruct) -> syn::Result<TokenStream> {
    let mut options = ModelOptions::default();
    syn::meta::parser(|meta| options.parse(&meta)).parse2(args)?;
    let serde = SerdeState::read(&input.attrs)?;
    let derived = derived_traits(&input.attrs);

    let missing: Vec<TokenStream> = [
        ("Debug", quote! { Debug }),
        ("Serialize", quote! { ::serde::Serialize }),
        ("Deserialize", quote! { ::serde::Deserialize }),
        ("ToSchema", quote! { ::utoipa::ToSchema }),
    ]
    .into_iter()
    .filter(|(name, _)| !derived.contains(*name))
    .map(|(_, path)| path)
    .collect();
    let derives = if missing.is_empty() { quote! {} } else { quote! { #[derive(#(#missing),*)] } };

    let case = options.rename_all.unwrap_or_else(|| LitStr::new(DEFAULT_CASE, Span::call_site()));
    let rename = match &serde.rename_all {
        None => quote! { #[serde(rename_all = #case)] },
        Some(existing) if existing.value() == case.value() => quote! {},
        Some(existing) => {
            return Err(syn::Error::new_spanned(
                existing,
                "Conflicting serde rename_all; drop it or pass the same value to api_model",
            ));
        },
    };

    let strict = options.deny_unknown_fields.as_ref().is_none_or(LitBool::value);
    let deny = match (strict, serde.deny_unknown_fields) {
        (true, false) => quote! { #[serde(deny_unknown_fields)] },
        (true, true) => quote! {},
        (false, false) => quote! {},
        (false, true) => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "deny_unknown_fields is already set via serde; remove it before disabling",
            ));
        },
    };

    Ok(quote! {
        #derives
        #rename
        #deny
    })
}

/// `#[api_handler(..)]`: forwards the arguments to `utoipa::path`.
pub fn expand_api_handler(args: TokenStream, input: ItemFn) -> TokenStream {
    quote! {
        #[::utoipa::path(#args)]
        #[allow(clippy::unused_async)]
        #input
    }
}

fn derived_traits(attrs: &[Attribute]) -> FxHashSet<String> {
    let mut traits = FxHashSet::default();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("derive")) {
        let _ = attr.parse_nested_meta(|meta| {
            if let Some(last) = meta.path.segments.last() {
                traits.insert(last.ident.to_string());
            }
            Ok(())
        });
    }
    traits
}
