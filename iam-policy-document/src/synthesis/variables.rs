//! Template variable substitution.
//!
//! Configuration languages that claim `${...}` for their own interpolation need another
//! spelling for IAM policy variables, so declarations write `&{aws:username}` and the
//! generated policy carries `${aws:username}`.

/// Marker written in declarations
const TEMPLATE_PREFIX: &str = "&{";
/// IAM policy variable marker
const IAM_PREFIX: &str = "${";

/// Rewrite every `&{` in `value` to `${`
#[must_use]
pub fn replace_vars(value: &str) -> String {
    value.replace(TEMPLATE_PREFIX, IAM_PREFIX)
}

/// Apply [`replace_vars`] to each element, keeping length and order
pub fn replace_vars_in_list<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|value| replace_vars(value.as_ref()))
        .collect()
}
