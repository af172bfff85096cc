use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Error, ItemStruct, LitStr};

/// Expands `#[trai_slice]` / `#[trai_slice(name = "...")]`.
///
/// The fields move into `<Name>Inner`; `<Name>` becomes a cheap `Arc` handle
/// registered under `NAME` (snake case of the struct name unless overridden).
pub fn expand_slice(args: TokenStream, input: ItemStruct) -> TokenStream {
    let name = match slice_name(args, &input) {
        Ok(name) => name,
        Err(err) => return err.to_compile_error(),
    };

    let wrapper_ident = &input.ident;
    let vis = &input.vis;
    let fields = &input.fields;
    let attrs = &input.attrs;
    let inner_ident = format_ident!("{wrapper_ident}Inner");
    let inner_doc = format!("Fields of the `{name}` slice, shared behind [`{wrapper_ident}`].");

    quote! {
        #[doc = #inner_doc]
        #[derive(Debug, Clone)]
        #vis struct #inner_ident #fields

        #(#attrs)*
        #[derive(Debug, Clone)]
        #vis struct #wrapper_ident {
            inner: ::std::sync::Arc<#inner_ident>,
        }

        impl #wrapper_ident {
            /// Registry name of this slice.
            pub const NAME: &'static str = #name;

            #[must_use]
            pub fn new(inner: #inner_ident) -> Self {
                Self { inner: ::std::sync::Arc::new(inner) }
            }
        }

        impl ::std::convert::From<#inner_ident> for #wrapper_ident {
            fn from(inner: #inner_ident) -> Self {
                Self::new(inner)
            }
        }

        impl ::std::ops::Deref for #wrapper_ident {
            type Target = #inner_ident;

            fn deref(&self) -> &Self::Target {
                &self.inner
            }
        }

        impl ::trai_kernel::domain::registry::FeatureSlice for #wrapper_ident {
            fn name(&self) -> &'static str {
                Self::NAME
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }
    }
}

fn slice_name(args: TokenStream, input: &ItemStruct) -> syn::Result<String> {
    if args.is_empty() {
        return Ok(snake_case(&input.ident.to_string()));
    }

    let mut name = None;
    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("name") {
            let lit: LitStr = meta.value()?.parse()?;
            if lit.value().trim().is_empty() {
                return Err(Error::new_spanned(lit, "slice name must not be empty"));
            }
            name = Some(lit.value());
            Ok(())
        } else {
            Err(meta.error("unsupported trai_slice argument, expected `name = \"...\"`"))
        }
    });
    syn::parse::Parser::parse2(parser, args)?;
    Ok(name.unwrap_or_else(|| snake_case(&input.ident.to_string())))
}

fn snake_case(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 4);
    for (i, ch) in ident.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
