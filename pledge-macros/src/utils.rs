use proc_macro::{Delimiter, Group, TokenStream, TokenTree};

/// Splits a `TokenStream` into comma-separated arguments.
///
/// Each argument is returned as a `Vec<TokenTree>`. Only top-level commas
/// separate arguments; commas inside delimited groups belong to the group.
/// Commas inside turbofish generics (`f::<A, B>()`) are not recognized, wrap
/// such expressions in parentheses.
pub(crate) fn split_args(input: TokenStream) -> Vec<Vec<TokenTree>> {
    let mut args = Vec::new();
    let mut current = Vec::new();

    for token in input {
        match &token {
            TokenTree::Punct(p) if p.as_char() == ',' => {
                if !current.is_empty() {
                    args.push(current);
                    current = Vec::new();
                }
            }
            _ => current.push(token),
        }
    }

    if !current.is_empty() {
        args.push(current);
    }

    args
}

/// Converts a slice of tokens into a Rust source string.
///
/// Consecutive identifiers are separated by a space so that `async move`
/// does not merge into `asyncmove`.
pub(crate) fn tokens_to_string(tokens: &[TokenTree]) -> String {
    let mut out = String::new();
    let mut prev_was_ident = false;

    for t in tokens {
        let is_ident = matches!(t, TokenTree::Ident(_));
        if prev_was_ident && is_ident {
            out.push(' ');
        }

        out.push_str(&t.to_string());
        prev_was_ident = is_ident;
    }

    out
}

/// Reads the optional `name = "..."` argument of `#[pledge::main]`.
///
/// Returns the string literal as written (quotes included).
pub(crate) fn parse_name(attr: TokenStream) -> Result<Option<String>, String> {
    let tokens: Vec<TokenTree> = attr.into_iter().collect();

    match tokens.as_slice() {
        [] => Ok(None),
        [TokenTree::Ident(key), TokenTree::Punct(eq), TokenTree::Literal(value)]
            if key.to_string() == "name" && eq.as_char() == '=' =>
        {
            let value = value.to_string();
            if value.starts_with('"') {
                Ok(Some(value))
            } else {
                Err(format!("expected a string literal for `name`, found {value}"))
            }
        }
        _ => Err(String::from("unsupported attribute, expected `name = \"...\"`")),
    }
}

/// Removes the `async` keyword of a function signature.
pub(crate) fn strip_async(tokens: &mut Vec<TokenTree>) {
    if let Some(pos) = tokens
        .iter()
        .position(|t| matches!(t, TokenTree::Ident(id) if id.to_string() == "async"))
    {
        tokens.remove(pos);
    }
}

/// Replaces the function body with `body(old_body)`.
///
/// Returns `false` if the item has no brace-delimited body.
pub(crate) fn rewrite_body(tokens: &mut [TokenTree], body: impl FnOnce(&str) -> String) -> bool {
    let Some(pos) = tokens
        .iter()
        .rposition(|t| matches!(t, TokenTree::Group(g) if g.delimiter() == Delimiter::Brace))
    else {
        return false;
    };

    let block = match &tokens[pos] {
        TokenTree::Group(g) => g.stream().to_string(),
        _ => return false,
    };

    let stream = match body(&block).parse::<TokenStream>() {
        Ok(stream) => stream,
        Err(_) => return false,
    };

    tokens[pos] = TokenTree::Group(Group::new(Delimiter::Brace, stream));
    true
}

/// Builds a `compile_error!` invocation carrying `message`.
pub(crate) fn compile_error(message: &str) -> TokenStream {
    format!("::core::compile_error!({message:?});")
        .parse()
        .unwrap_or_default()
}
