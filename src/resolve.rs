// Copyright 2022 Cognite AS
//! URL resolution: segment template → substituted path → full URL.
//!
//! Templates use `%@` for the next path variable, `%N$@` for the N-th (1-based)
//! path variable and `%%` for a literal percent sign. Every supplied variable
//! must be consumed and every placeholder must be satisfied.
//!
//! Variables are percent-encoded on insertion so they cannot start a query or
//! fragment. `/` is left alone: a variable containing it adds path levels.
use std::collections::HashSet;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use url::Url;

use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::model::{PathVars, Route};

const PATH_VAR: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Substitute `vars` into `template`.
pub fn substitute(template: &str, vars: &PathVars) -> Result<String, Error> {
    let vars = vars.as_slice();
    let mut out = String::with_capacity(template.len());
    let mut next = 0usize;
    let mut used = HashSet::new();
    let mut placeholders = 0usize;
    let mut bad_index = false;

    let mut rest = template;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];
        if let Some(after) = tail.strip_prefix('%') {
            out.push('%');
            rest = after;
        } else if let Some(after) = tail.strip_prefix('@') {
            placeholders += 1;
            match vars.get(next) {
                Some(var) => out.extend(utf8_percent_encode(var, PATH_VAR)),
                None => bad_index = true,
            }
            used.insert(next);
            next += 1;
            rest = after;
        } else if let Some((index, after)) = positional(tail) {
            placeholders = placeholders.max(index);
            match index.checked_sub(1).and_then(|i| vars.get(i)) {
                Some(var) => out.extend(utf8_percent_encode(var, PATH_VAR)),
                None => bad_index = true,
            }
            used.insert(index.saturating_sub(1));
            rest = after;
        } else {
            out.push('%');
            rest = tail;
        }
    }
    out.push_str(rest);

    if bad_index || used.len() != vars.len() || placeholders != vars.len() {
        return Err(Error::MalformedTemplate {
            template: template.into(),
            placeholders,
            supplied: vars.len(),
        });
    }
    Ok(out)
}

/// Parse `N$@` at the start of `s`, returning N and the remainder.
fn positional(s: &str) -> Option<(usize, &str)> {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let after = s[digits..].strip_prefix("$@")?;
    let index = s[..digits].parse().ok()?;
    Some((index, after))
}

/// Build the full URL for `type_name` under `endpoint`. `action`, when
/// present, becomes the final path component.
pub fn resolve(
    endpoint: &dyn Endpoint,
    type_name: &str,
    route: &Route,
    action: Option<i32>,
) -> Result<Url, Error> {
    let template = endpoint.segment_for(type_name, route.controller.as_deref());
    let mut segment = substitute(&template, &route.path_vars)?;
    if let Some(action) = action {
        let (path, query) = match segment.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (segment.clone(), None),
        };
        segment = format!("{}/{}", path.trim_end_matches('/'), action);
        if let Some(query) = query {
            segment.push('?');
            segment.push_str(&query);
        }
    }

    let joined = format!(
        "{}/{}",
        endpoint.api_url().as_str().trim_end_matches('/'),
        segment.trim_start_matches('/')
    );
    let mut url = Url::parse(&joined).map_err(|source| Error::InvalidUrl {
        url: joined.clone(),
        source,
    })?;

    if !route.query.is_empty() {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| route.query.get(key).is_none())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (key, value) in &kept {
            pairs.append_pair(key, value);
        }
        for (key, value) in route.query.iter() {
            pairs.append_pair(key, value);
        }
        drop(pairs);
    }
    Ok(url)
}
