//! Part file naming: output templates, wildcard expansion and the
//! numeric-aware ordering used to join parts back together.

use crate::error::{AontError, Result};
use std::cmp::Ordering;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Placeholder tokens accepted in an output template
const PLACEHOLDERS: [&str; 2] = ["*", "{}"];

/// Output filename template such as `backup.part*` or `chunk-{}.bin`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartTemplate {
    raw: String,
    /// Byte range of the first placeholder
    first: Option<(usize, usize)>,
    count: usize,
}

impl PartTemplate {
    pub fn parse(raw: &str) -> Self {
        let mut first = None;
        let mut count = 0;
        let mut i = 0;
        while i < raw.len() {
            let rest = &raw[i..];
            match PLACEHOLDERS.iter().find(|p| rest.starts_with(**p)) {
                Some(token) => {
                    if first.is_none() {
                        first = Some((i, i + token.len()));
                    }
                    count += 1;
                    i += token.len();
                }
                None => {
                    i += rest.chars().next().map_or(1, char::len_utf8);
                }
            }
        }
        Self {
            raw: raw.to_string(),
            first,
            count,
        }
    }

    /// Number of placeholders found in the template
    pub fn placeholders(&self) -> usize {
        self.count
    }

    pub fn has_placeholder(&self) -> bool {
        self.first.is_some()
    }

    /// Path of the 1-based part `number`. Without a placeholder the template
    /// is used verbatim.
    pub fn path_for(&self, number: usize) -> PathBuf {
        match self.first {
            Some((start, end)) => {
                PathBuf::from(format!("{}{}{}", &self.raw[..start], number, &self.raw[end..]))
            }
            None => PathBuf::from(&self.raw),
        }
    }
}

impl fmt::Display for PartTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Compare two names treating each run of ASCII digits as a number.
///
/// Runs with the same value but different lengths are ordered by their
/// leading zeros: the one with more zeros before the first differing
/// character comes first, so `"001" < "1"` and `"a007" < "a07"`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let s1: Vec<char> = a.chars().collect();
    let s2: Vec<char> = b.chars().collect();
    let min_len = s1.len().min(s2.len());
    let mut i = 0;

    while i < min_len {
        if s1[i].is_ascii_digit() && s2[i].is_ascii_digit() {
            let mut first_nonzero = i;
            while first_nonzero < s1.len()
                && first_nonzero < s2.len()
                && s1[first_nonzero] == '0'
                && s2[first_nonzero] == '0'
            {
                first_nonzero += 1;
            }
            let end1 = digit_run_end(&s1, i);
            let end2 = digit_run_end(&s2, i);

            let by_value = cmp_digit_runs(&s1[i..end1], &s2[i..end2]);
            if by_value != Ordering::Equal {
                return by_value;
            }
            if end1 != end2 {
                if first_nonzero >= s1.len() {
                    return Ordering::Less;
                }
                if first_nonzero >= s2.len() {
                    return Ordering::Greater;
                }
                return s1[first_nonzero].cmp(&s2[first_nonzero]);
            }
            i = end1;
            continue;
        }

        match s1[i].cmp(&s2[i]) {
            Ordering::Equal => i += 1,
            other => return other,
        }
    }

    s1.len().cmp(&s2.len())
}

fn digit_run_end(s: &[char], start: usize) -> usize {
    let mut end = start;
    while end < s.len() && s[end].is_ascii_digit() {
        end += 1;
    }
    end
}

/// Compare two digit runs by numeric value, without limiting their length
fn cmp_digit_runs(a: &[char], b: &[char]) -> Ordering {
    let strip = |run: &[char]| -> usize { run.iter().take_while(|c| **c == '0').count() };
    let a = &a[strip(a)..];
    let b = &b[strip(b)..];
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Sort paths in natural order (see [`natural_cmp`])
pub fn sort_natural(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| natural_cmp(&a.to_string_lossy(), &b.to_string_lossy()));
}

pub fn has_wildcard(s: &str) -> bool {
    s.contains(&['*', '?'][..])
}

/// Expand one argument into an ordered list of files.
///
/// Only the file name may hold `*` or `?`; a pattern without wildcards is
/// returned as-is without touching the filesystem.
pub fn expand_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let path = Path::new(pattern);
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name,
        None => return Ok(vec![path.to_path_buf()]),
    };
    let dir = path.parent().unwrap_or_else(|| Path::new(""));

    if has_wildcard(&dir.to_string_lossy()) {
        return Err(AontError::Config(format!(
            "{} has wildcard in directory name",
            pattern
        )));
    }
    if !has_wildcard(name) {
        return Ok(vec![path.to_path_buf()]);
    }

    let search_dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    let wanted: Vec<char> = name.chars().collect();
    let mut matches = Vec::new();
    for entry in fs::read_dir(search_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(candidate) = file_name.to_str() else {
            continue;
        };
        let candidate: Vec<char> = candidate.chars().collect();
        if wildcard_match(&wanted, &candidate) {
            matches.push(dir.join(file_name));
        }
    }

    if matches.is_empty() {
        return Err(AontError::Config(format!("no files match {}", pattern)));
    }
    sort_natural(&mut matches);
    Ok(matches)
}

/// Expand every argument in order, keeping each argument's matches together
pub fn expand_all<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        files.extend(expand_pattern(pattern.as_ref())?);
    }
    Ok(files)
}

/// `*` matches any run of characters, `?` exactly one
fn wildcard_match(pattern: &[char], name: &[char]) -> bool {
    let (mut p, mut n) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while n < name.len() {
        if p < pattern.len() && pattern[p] == '*' {
            backtrack = Some((p, n));
            p += 1;
        } else if p < pattern.len() && (pattern[p] == '?' || pattern[p] == name[n]) {
            p += 1;
            n += 1;
        } else if let Some((star, matched)) = backtrack {
            p = star + 1;
            n = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|c| *c == '*')
}
