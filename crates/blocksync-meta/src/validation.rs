//! Structural checks on a job file
//!
//! Field-level checks (patterns compile, templates and policies name schema
//! fields) happen when the loader builds each job; this module covers what
//! can be decided from the file alone.

use std::collections::HashSet;

use crate::config::{DiscoverConfig, ExtractConfig, JobConfig, JobFile};

/// Characters allowed in a job name, so names can be passed to `--job`.
fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

/// Collect every structural problem in `file`.
///
/// Returns an empty list when the file is usable.
pub fn problems(file: &JobFile) -> Vec<String> {
    let mut problems = Vec::new();

    if file.jobs.is_empty() {
        problems.push("no [[job]] entries".to_string());
    }

    let mut seen = HashSet::new();
    for (index, job) in file.jobs.iter().enumerate() {
        if !valid_name(&job.name) {
            problems.push(format!(
                "job #{}: name {:?} must be non-empty and use only letters, digits, '-', '_' or '.'",
                index + 1,
                job.name
            ));
        } else if !seen.insert(job.name.as_str()) {
            problems.push(format!("duplicate job name {:?}", job.name));
        }
        problems.extend(
            job_problems(job)
                .into_iter()
                .map(|p| format!("job {:?}: {}", job.name, p)),
        );
    }

    problems
}

fn job_problems(job: &JobConfig) -> Vec<String> {
    let mut problems = Vec::new();

    if job.document.trim().is_empty() {
        problems.push("document must not be empty".to_string());
    }

    if let Some(lookup) = &job.lookup {
        if job.display.is_none() {
            problems.push("a lookup table requires a display field".to_string());
        }
        if lookup.key_field.is_some() != lookup.value_field.is_some() {
            problems.push("lookup key_field and value_field must be set together".to_string());
        }
    }

    match &job.discover {
        DiscoverConfig::Directory { root, .. } if root.trim().is_empty() => {
            problems.push("discover root must not be empty".to_string());
        }
        DiscoverConfig::SourceScan { root, extract, .. } => {
            if root.trim().is_empty() {
                problems.push("discover root must not be empty".to_string());
            }
            if let ExtractConfig::FieldRules { rules } = extract {
                if !rules.contains_key(&job.key) {
                    problems.push(format!("field rules define no rule for key field {:?}", job.key));
                }
                for field in rules.keys().filter(|f| !job.fields.contains(f)) {
                    problems.push(format!("field rule {:?} names no schema field", field));
                }
            }
        }
        _ => {}
    }

    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("app-languages", true)]
    #[case("sites_v2.md", true)]
    #[case("", false)]
    #[case("two words", false)]
    #[case("a/b", false)]
    fn test_valid_name(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(valid_name(name), expected);
    }
}
