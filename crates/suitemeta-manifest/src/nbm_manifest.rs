//! NBM module manifest reader
//!
//! A module manifest is a JAR-style `manifest.mf`: `Key: Value` headers,
//! continuation lines starting with a single space, and a blank line ending
//! the main section. Display strings are not in the manifest itself but in
//! the `.properties` localizing bundle it references.

use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::ManifestError;

pub const MODULE_HEADER: &str = "OpenIDE-Module";
pub const LOCALIZING_BUNDLE_HEADER: &str = "OpenIDE-Module-Localizing-Bundle";
pub const SHOW_IN_CLIENT_HEADER: &str = "OpenIDE-Module-Show-In-Client";
pub const ICON_HEADER: &str = "OpenIDE-Module-Icon";

pub const NAME_KEY: &str = "OpenIDE-Module-Name";
pub const SHORT_DESCRIPTION_KEY: &str = "OpenIDE-Module-Short-Description";
pub const LONG_DESCRIPTION_KEY: &str = "OpenIDE-Module-Long-Description";
pub const CATEGORY_KEY: &str = "OpenIDE-Module-Display-Category";

/// Directories searched, relative to the module base directory, for the
/// localizing bundle
const BUNDLE_ROOTS: &[&str] = &["src/main/resources", ""];

/// What the manifest (and its localizing bundle) says about a module
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestDescriptor {
    pub code_name: Option<String>,
    pub localizing_bundle: Option<String>,
    pub icon: Option<String>,
    pub show_in_client: Option<bool>,
    pub display_name: Option<String>,
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    pub category: Option<String>,
}

impl ManifestDescriptor {
    /// Modules are shown in the client unless the manifest explicitly says otherwise
    pub fn is_visible_in_client(&self) -> bool {
        self.show_in_client.unwrap_or(true)
    }
}

/// Read `<base_dir>/<manifest_file>` and the localizing bundle it declares
pub fn read_manifest(base_dir: &Path, manifest_file: &str) -> Result<ManifestDescriptor, ManifestError> {
    let path = base_dir.join(manifest_file);
    if !path.is_file() {
        return Err(ManifestError::NotFound(path));
    }
    debug!("Reading module manifest: {:?}", path);

    let content = fs::read_to_string(&path)?;
    let headers = parse_main_attributes(&content, &path)?;

    let show_in_client = headers
        .get(SHOW_IN_CLIENT_HEADER)
        .map(|value| parse_bool(value, SHOW_IN_CLIENT_HEADER, &path))
        .transpose()?;

    let mut descriptor = ManifestDescriptor {
        code_name: headers.get(MODULE_HEADER).cloned(),
        localizing_bundle: headers.get(LOCALIZING_BUNDLE_HEADER).cloned(),
        icon: headers.get(ICON_HEADER).cloned(),
        show_in_client,
        ..Default::default()
    };

    if let Some(bundle) = descriptor.localizing_bundle.clone() {
        let bundle_path = resolve_bundle(base_dir, &bundle).ok_or_else(|| {
            ManifestError::BundleNotFound {
                manifest: path.clone(),
                bundle: bundle.clone(),
            }
        })?;
        debug!("Reading localizing bundle: {:?}", bundle_path);

        let properties = parse_properties(&fs::read_to_string(&bundle_path)?);
        descriptor.display_name = properties.get(NAME_KEY).cloned();
        descriptor.short_description = properties.get(SHORT_DESCRIPTION_KEY).cloned();
        descriptor.long_description = properties.get(LONG_DESCRIPTION_KEY).cloned();
        descriptor.category = properties.get(CATEGORY_KEY).cloned();
    }

    Ok(descriptor)
}

fn resolve_bundle(base_dir: &Path, bundle: &str) -> Option<PathBuf> {
    BUNDLE_ROOTS
        .iter()
        .map(|root| base_dir.join(root).join(bundle))
        .find(|candidate| candidate.is_file())
}

fn parse_bool(value: &str, key: &str, path: &Path) -> Result<bool, ManifestError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ManifestError::InvalidValue {
            path: path.to_path_buf(),
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Parse the main section of a manifest into an ordered header map
pub fn parse_main_attributes(
    content: &str,
    path: &Path,
) -> Result<IndexMap<String, String>, ManifestError> {
    let mut headers: IndexMap<String, String> = IndexMap::new();
    let mut last_key: Option<String> = None;

    for (idx, raw_line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);

        if line.is_empty() {
            // End of the main section
            break;
        }

        if let Some(continuation) = line.strip_prefix(' ') {
            let Some(value) = last_key.as_ref().and_then(|k| headers.get_mut(k)) else {
                return Err(ManifestError::Syntax {
                    path: path.to_path_buf(),
                    line: line_no,
                    reason: "continuation line without a preceding header".to_string(),
                });
            };
            value.push_str(continuation);
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            return Err(ManifestError::Syntax {
                path: path.to_path_buf(),
                line: line_no,
                reason: format!("expected 'Name: value', found '{}'", line),
            });
        };

        let key = key.trim();
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ManifestError::Syntax {
                path: path.to_path_buf(),
                line: line_no,
                reason: format!("invalid header name '{}'", key),
            });
        }

        headers.insert(key.to_string(), value.trim().to_string());
        last_key = Some(key.to_string());
    }

    Ok(headers)
}

/// Parse a Java `.properties` file
///
/// Handles comments, `=`/`:`/whitespace separators, line joins ending in an
/// odd number of backslashes, and escapes (`\uXXXX`, `\t`, `\n`, `\r`, `\f`,
/// any other `\c` is `c`) in both keys and values.
pub fn parse_properties(content: &str) -> IndexMap<String, String> {
    let mut properties = IndexMap::new();
    let mut pending = String::new();
    let mut continuing = false;

    for raw_line in content.lines() {
        let line = raw_line.trim_start_matches(is_blank);
        if !continuing && (line.is_empty() || line.starts_with('#') || line.starts_with('!')) {
            continue;
        }

        let trailing = line.chars().rev().take_while(|&c| c == '\\').count();
        if trailing % 2 == 1 {
            pending.push_str(&line[..line.len() - 1]);
            continuing = true;
            continue;
        }
        pending.push_str(line);
        continuing = false;

        let entry = std::mem::take(&mut pending);
        let (key, value) = split_entry(&entry);
        properties.insert(unescape(key), unescape(value));
    }

    if continuing {
        let (key, value) = split_entry(&pending);
        properties.insert(unescape(key), unescape(value));
    }

    properties
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{000C}')
}

/// Split a logical line at the first unescaped separator
fn split_entry(entry: &str) -> (&str, &str) {
    let mut escaped = false;
    for (idx, c) in entry.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => return (&entry[..idx], entry[idx + 1..].trim_start_matches(is_blank)),
            c if is_blank(c) => {
                let rest = entry[idx..].trim_start_matches(is_blank);
                let rest = rest.strip_prefix(['=', ':']).unwrap_or(rest);
                return (&entry[..idx], rest.trim_start_matches(is_blank));
            }
            _ => {}
        }
    }
    (entry, "")
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    // `\uXXXX` escapes are UTF-16 code units; surrogate pairs span two escapes
    let mut units: Vec<u16> = Vec::new();
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&'u') {
            let hex: String = chars.clone().skip(1).take(4).collect();
            if hex.len() == 4 && hex.chars().all(|h| h.is_ascii_hexdigit()) {
                if let Ok(unit) = u16::from_str_radix(&hex, 16) {
                    units.push(unit);
                    chars.nth(4);
                    continue;
                }
            }
        }

        flush_utf16(&mut units, &mut out);
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{000C}'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    flush_utf16(&mut units, &mut out);

    out
}

fn flush_utf16(units: &mut Vec<u16>, out: &mut String) {
    if units.is_empty() {
        return;
    }
    out.extend(
        char::decode_utf16(units.drain(..)).map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER)),
    );
}
