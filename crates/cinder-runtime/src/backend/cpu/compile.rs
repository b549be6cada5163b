//! Entry point extraction from kernel source text
//!
//! The CPU device does not run a C front-end. It recognises
//! `__kernel void name(params)` declarations, records each entry's name and
//! declared arity, and leaves the body to the native implementation bound at
//! build time. Anything it cannot make sense of becomes a build diagnostic.

/// One `__kernel` declaration found in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EntryDecl {
    pub name: String,
    pub param_count: usize,
}

/// Scan kernel source for entry point declarations
///
/// Returns the declarations in source order, or a build diagnostic.
pub(crate) fn parse_entry_points(source: &str) -> Result<Vec<EntryDecl>, String> {
    if source.trim().is_empty() {
        return Err("empty kernel source".to_string());
    }

    for line in source.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("#error") {
            return Err(trimmed.to_string());
        }
    }

    let opens = source.matches('{').count();
    let closes = source.matches('}').count();
    if opens != closes {
        return Err(format!(
            "unbalanced braces in kernel source: {opens} `{{` vs {closes} `}}`"
        ));
    }

    let mut decls: Vec<EntryDecl> = Vec::new();
    let mut cursor = 0usize;
    while let Some(found) = source[cursor..].find("__kernel") {
        let mut rest = source[cursor + found + "__kernel".len()..].trim_start();
        rest = rest
            .strip_prefix("void")
            .ok_or_else(|| "expected `void` return type after `__kernel`".to_string())?
            .trim_start();

        let name_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
            .unwrap_or(rest.len());
        let name = &rest[..name_len];
        if name.is_empty() {
            return Err("missing kernel name after `__kernel void`".to_string());
        }

        let after_name = rest[name_len..].trim_start();
        let params = after_name
            .strip_prefix('(')
            .ok_or_else(|| format!("missing parameter list for kernel `{name}`"))?;
        let close = params
            .find(')')
            .ok_or_else(|| format!("unterminated parameter list for kernel `{name}`"))?;
        let param_list = params[..close].trim();
        let param_count = if param_list.is_empty() {
            0
        } else {
            param_list.split(',').count()
        };

        if decls.iter().any(|d| d.name == name) {
            return Err(format!("duplicate kernel name `{name}`"));
        }
        decls.push(EntryDecl {
            name: name.to_string(),
            param_count,
        });

        let consumed = source.len() - params.len() + close + 1;
        cursor = consumed;
    }

    if decls.is_empty() {
        return Err("no `__kernel` entry points found in source".to_string());
    }
    Ok(decls)
}
