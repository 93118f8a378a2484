//! Procedural macros for the Pledge runtime.
//!
//! - `#[pledge::main]` runs an `async fn main` on a fresh runtime,
//! - `#[pledge::test]` does the same for a test function,
//! - `join!` awaits several fallible futures concurrently.

mod utils;

use proc_macro::{TokenStream, TokenTree};

/// Awaits several `Result` futures concurrently, failing fast.
///
/// Expands to an expression of type `Result<(A, B, ..), E>`: the values in
/// argument order once every future returned `Ok`, or the first `Err` in
/// completion order. Futures still running when an error arrives are
/// dropped. Every future must share the same error type.
///
/// ```rust,ignore
/// let (user, posts) = pledge::join!(fetch_user(1), fetch_posts(1))?;
/// ```
#[proc_macro]
pub fn join(input: TokenStream) -> TokenStream {
    let args = utils::split_args(input);
    let count = args.len();

    if count == 0 {
        return utils::compile_error("join! requires at least one future");
    }

    if count == 1 {
        let expr = utils::tokens_to_string(&args[0]);
        return format!("::core::result::Result::map(({expr}).await, |__v| (__v,))")
            .parse()
            .unwrap_or_else(|err| utils::compile_error(&format!("join! macro error: {err}")));
    }

    let mut output = String::new();
    output.push_str("{\n");
    output.push_str("use ::std::future::Future as _;\n");

    for (i, expr_tokens) in args.iter().enumerate() {
        let idx = i + 1;
        let expr = utils::tokens_to_string(expr_tokens);
        output.push_str(&format!(
            "let mut __f{idx} = (::std::boxed::Box::pin({expr}), ::core::option::Option::None);\n"
        ));
    }

    output.push_str("::std::future::poll_fn(move |cx| {\n");
    output.push_str("    use ::std::task::Poll;\n");

    for i in 1..=count {
        output.push_str(&format!(
            "    if __f{i}.1.is_none() {{\n\
                    if let Poll::Ready(res) = __f{i}.0.as_mut().poll(cx) {{\n\
                        match res {{\n\
                            ::core::result::Result::Ok(val) => __f{i}.1 = ::core::option::Option::Some(val),\n\
                            ::core::result::Result::Err(err) => return Poll::Ready(::core::result::Result::Err(err)),\n\
                        }}\n\
                    }}\n\
                }}\n"
        ));
    }

    let all_done = (1..=count)
        .map(|i| format!("__f{i}.1.is_some()"))
        .collect::<Vec<_>>()
        .join(" && ");

    output.push_str(&format!("    if {all_done} {{\n"));
    output.push_str("        Poll::Ready(::core::result::Result::Ok((\n");

    for i in 1..=count {
        output.push_str(&format!("            __f{i}.1.take().unwrap(),\n"));
    }

    output.push_str("        )))\n");
    output.push_str("    } else {\n");
    output.push_str("        Poll::Pending\n");
    output.push_str("    }\n");
    output.push_str("}).await\n");
    output.push_str("}\n");

    output
        .parse::<TokenStream>()
        .unwrap_or_else(|err| utils::compile_error(&format!("join! macro error: {err}")))
}

/// Runs an `async fn main` on a Pledge runtime.
///
/// Accepts an optional `name = "..."` argument naming the runtime's tracing
/// span.
///
/// ```rust,ignore
/// #[pledge::main(name = "demo")]
/// async fn main() {
///     pledge::sleep(std::time::Duration::from_millis(10)).await;
/// }
/// ```
#[proc_macro_attribute]
pub fn main(attr: TokenStream, item: TokenStream) -> TokenStream {
    let name = match utils::parse_name(attr) {
        Ok(name) => name,
        Err(message) => return utils::compile_error(&message),
    };

    let mut builder = String::from("::pledge::RuntimeBuilder::new()");
    if let Some(name) = name {
        builder.push_str(&format!(".name({name})"));
    }
    builder.push_str(".build()");

    let mut tokens: Vec<TokenTree> = item.into_iter().collect();
    utils::strip_async(&mut tokens);

    let rewritten = utils::rewrite_body(&mut tokens, |block| {
        format!(
            "{{
                let runtime = {builder};
                runtime.block_on(async move {{ {block} }})
            }}"
        )
    });

    if !rewritten {
        return utils::compile_error("#[pledge::main] expects a function with a body");
    }

    tokens.into_iter().collect()
}

/// Runs an `async` test function on a fresh Pledge runtime.
///
/// The function may return `()` or a `Result`, as regular tests do.
#[proc_macro_attribute]
pub fn test(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut tokens: Vec<TokenTree> = item.into_iter().collect();
    utils::strip_async(&mut tokens);

    let rewritten = utils::rewrite_body(&mut tokens, |block| {
        format!(
            "{{
                let runtime = ::pledge::RuntimeBuilder::new().build();
                runtime.block_on(async move {{ {block} }})
            }}"
        )
    });

    if !rewritten {
        return utils::compile_error("#[pledge::test] expects a function with a body");
    }

    let test_attr: TokenStream = "#[::core::prelude::v1::test]".parse().unwrap_or_default();
    let mut result: Vec<TokenTree> = test_attr.into_iter().collect();
    result.extend(tokens);

    result.into_iter().collect()
}
