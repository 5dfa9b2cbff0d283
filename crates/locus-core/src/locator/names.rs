//! Candidate resource names for a locate request.

use crate::request::LocateRequest;

/// One file name to try, with the qualifiers it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub style: Option<String>,
    pub variation: Option<String>,
    pub locale: Option<String>,
}

/// Names to try for `request`, most specific first.
///
/// Order: style/variation combination, then locale level, then extension.
pub fn candidate_names(request: &LocateRequest) -> Vec<Candidate> {
    let (base, extensions) = split_extensions(request.path(), request.extension());
    let style = request.style();
    let variation = request.variation();

    let mut qualifiers: Vec<(Option<&str>, Option<&str>)> = Vec::new();
    if style.is_some() && variation.is_some() {
        qualifiers.push((style, variation));
    }
    if style.is_some() {
        qualifiers.push((style, None));
    }
    if variation.is_some() {
        qualifiers.push((None, variation));
    }
    qualifiers.push((None, None));

    let locales = locale_chain(request.locale());

    if request.is_strict() {
        qualifiers.truncate(1);
    }
    let locales = if request.is_strict() {
        &locales[..1]
    } else {
        &locales[..]
    };

    let mut out = Vec::new();
    for (style, variation) in &qualifiers {
        for locale in locales {
            let mut stem = base.to_string();
            if let Some(variation) = variation {
                stem.push('_');
                stem.push_str(variation);
            }
            if let Some(style) = style {
                stem.push('_');
                stem.push_str(style);
            }
            if let Some(locale) = locale {
                stem.push('_');
                stem.push_str(locale);
            }

            for ext in &extensions {
                let name = match ext {
                    Some(ext) => format!("{}.{}", stem, ext),
                    None => stem.clone(),
                };
                out.push(Candidate {
                    name,
                    style: style.map(String::from),
                    variation: variation.map(String::from),
                    locale: locale.clone(),
                });
            }
        }
    }
    out
}

/// Locale fallback chain: `de_CH_x` → `de_CH_x`, `de_CH`, `de`, none.
fn locale_chain(locale: Option<&str>) -> Vec<Option<String>> {
    let mut chain = Vec::new();
    if let Some(locale) = locale.filter(|l| !l.is_empty()) {
        let parts: Vec<&str> = locale.split('_').filter(|p| !p.is_empty()).collect();
        for len in (1..=parts.len()).rev() {
            chain.push(Some(parts[..len].join("_")));
        }
    }
    chain.push(None);
    chain
}

/// Split the base name from its extension list.
///
/// An explicit `extension` may list several comma-separated alternatives.
/// Without one, a trailing `.ext` on the last path segment is used.
fn split_extensions<'a>(
    path: &'a str,
    extension: Option<&'a str>,
) -> (&'a str, Vec<Option<&'a str>>) {
    if let Some(extension) = extension {
        let exts: Vec<Option<&str>> = extension
            .split(',')
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(|e| Some(e.trim_start_matches('.')))
            .collect();
        if !exts.is_empty() {
            return (path, exts);
        }
    }

    let file_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    match path[file_start..].rfind('.') {
        Some(dot) if dot > 0 => {
            let dot = file_start + dot;
            (&path[..dot], vec![Some(&path[dot + 1..])])
        }
        _ => (path, vec![None]),
    }
}
