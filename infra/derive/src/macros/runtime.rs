use proc_macro2::TokenStream;
use quote::quote;
use syn::{Error, Expr, Ident, ItemFn, ReturnType, Type};

/// Expands `#[trai_runtime::main(profile, worker_threads = .., stack_size = .., thread_name = ..)]`.
///
/// Every argument is optional. Overrides are applied on top of the profile
/// through the `RuntimeConfig::with_*` builders, so they are clamped the same way.
#[must_use]
pub fn expand_main(args: TokenStream, input: ItemFn) -> TokenStream {
    if let Err(err) = check_signature(&input) {
        return err.to_compile_error();
    }
    let config = match RuntimeArgs::parse(args) {
        Ok(parsed) => parsed.config_tokens(),
        Err(err) => return err.to_compile_error(),
    };

    let ItemFn { attrs, vis, sig, block } = &input;
    let name = &sig.ident;
    let output = &sig.output;

    quote! {
        #(#attrs)*
        #vis fn #name() #output {
            let config = #config;
            ::trai_runtime::build_runtime_with_config(&config)?.block_on(async #block)
        }
    }
}

fn check_signature(input: &ItemFn) -> syn::Result<()> {
    if input.sig.asyncness.is_none() {
        return Err(Error::new_spanned(&input.sig.fn_token, "#[trai_runtime::main] needs an async fn"));
    }
    if !input.sig.inputs.is_empty() {
        return Err(Error::new_spanned(&input.sig.inputs, "#[trai_runtime::main] fn takes no arguments"));
    }
    if !returns_result(&input.sig.output) {
        return Err(Error::new_spanned(
            &input.sig.output,
            "#[trai_runtime::main] fn must return a Result so runtime start-up errors can propagate",
        ));
    }
    Ok(())
}

#[derive(Default)]
struct RuntimeArgs {
    profile: Option<Ident>,
    worker_threads: Option<Expr>,
    stack_size: Option<Expr>,
    thread_name: Option<Expr>,
}

impl RuntimeArgs {
    fn parse(args: TokenStream) -> syn::Result<Self> {
        let mut parsed = Self::default();
        let parser = syn::meta::parser(|meta| {
            let slot = if meta.path.is_ident("worker_threads") {
                &mut parsed.worker_threads
            } else if meta.path.is_ident("stack_size") {
                &mut parsed.stack_size
            } else if meta.path.is_ident("thread_name") {
                &mut parsed.thread_name
            } else {
                let Some(ident) = meta.path.get_ident() else {
                    return Err(meta.error("expected a runtime profile or an override"));
                };
                if parsed.profile.is_some() {
                    return Err(meta.error("only one runtime profile may be given"));
                }
                if !matches!(ident.to_string().as_str(), "server" | "probe" | "default") {
                    return Err(meta.error("unknown runtime profile, use server, probe or default"));
                }
                parsed.profile = Some(ident.clone());
                return Ok(());
            };
            if slot.is_some() {
                return Err(meta.error("runtime override given twice"));
            }
            *slot = Some(meta.value()?.parse()?);
            Ok(())
        });
        syn::parse::Parser::parse2(parser, args)?;
        Ok(parsed)
    }

    fn config_tokens(&self) -> TokenStream {
        let mut config = match self.profile.as_ref().map(ToString::to_string).as_deref() {
            Some("server") => quote! { ::trai_runtime::RuntimeConfig::server() },
            Some("probe") => quote! { ::trai_runtime::RuntimeConfig::probe() },
            _ => quote! { ::trai_runtime::RuntimeConfig::default() },
        };
        if let Some(threads) = &self.worker_threads {
            config = quote! { #config.with_worker_threads(#threads) };
        }
        if let Some(size) = &self.stack_size {
            config = quote! { #config.with_stack_size(#size) };
        }
        if let Some(name) = &self.thread_name {
            config = quote! { #config.with_thread_name(#name) };
        }
        config
    }
}

fn returns_result(output: &ReturnType) -> bool {
    let ReturnType::Type(_, ty) = output else {
        return false;
    };
    let Type::Path(path) = &**ty else {
        return false;
    };
    path.path.segments.last().is_some_and(|seg| seg.ident == "Result")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: TokenStream) -> String {
        RuntimeArgs::parse(args).map(|parsed| parsed.config_tokens().to_string()).unwrap_or_default()
    }

    #[test]
    fn profile_picks_the_preset() {
        assert!(config(TokenStream::new()).contains("RuntimeConfig :: default ()"));
        assert!(config(quote!(server)).contains("RuntimeConfig :: server ()"));
        assert!(config(quote!(probe)).contains("RuntimeConfig :: probe ()"));
    }

    #[test]
    fn overrides_chain_onto_the_profile() {
        let tokens = config(quote!(server, worker_threads = 2, thread_name = "trai-api"));
        assert!(tokens.contains("server ()"));
        assert!(tokens.contains("with_worker_threads (2)"));
        assert!(tokens.contains("with_thread_name (\"trai-api\")"));
        assert!(!tokens.contains("with_stack_size"));
    }

    #[test]
    fn bad_arguments_are_rejected() {
        assert!(RuntimeArgs::parse(quote!(turbo)).is_err());
        assert!(RuntimeArgs::parse(quote!(server, probe)).is_err());
        assert!(RuntimeArgs::parse(quote!(worker_threads = 1, worker_threads = 2)).is_err());
    }

    #[test]
    fn signature_must_be_async_and_fallible() {
        let sync: ItemFn = syn::parse_quote! { fn main() -> anyhow::Result<()> { Ok(()) } };
        assert!(check_signature(&sync).is_err());
        let infallible: ItemFn = syn::parse_quote! { async fn main() {} };
        assert!(check_signature(&infallible).is_err());
        let with_args: ItemFn = syn::parse_quote! { async fn main(x: u8) -> Result<(), E> { Ok(()) } };
        assert!(check_signature(&with_args).is_err());
        let good: ItemFn = syn::parse_quote! { async fn main() -> anyhow::Result<()> { Ok(()) } };
        assert!(check_signature(&good).is_ok());
    }
}
