use super::CasbinRule;
use casbin::Model;

/// Render a row as a policy line: `ptype, v0, v1, ...`.
///
/// Empty columns are skipped, so the line is only faithful for left-packed rows.
pub fn line_from_row(row: &CasbinRule) -> String {
    let mut line = row.ptype.clone();
    for value in row.fields() {
        if !value.is_empty() {
            line.push_str(", ");
            line.push_str(value);
        }
    }
    line
}

/// Split a policy line into its ptype and rule fields.
///
/// Returns `None` for blank lines and `#` comments.
pub fn parse_policy_line(line: &str) -> Option<(String, Vec<String>)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let mut tokens = line.split(',').map(|token| token.trim().to_string());
    let ptype = tokens.next().filter(|ptype| !ptype.is_empty())?;
    Some((ptype, tokens.collect()))
}

/// Append one policy line to `model`.
///
/// The section is the first character of the ptype. Returns `false` when the line
/// is blank, or when the model does not define its section and ptype.
pub fn load_policy_line(line: &str, model: &mut dyn Model) -> bool {
    let Some((ptype, rule)) = parse_policy_line(line) else {
        return false;
    };
    let Some(sec) = ptype.chars().next().map(|c| c.to_string()) else {
        return false;
    };
    model.add_policy(&sec, &ptype, rule)
}

/// Append one stored row to `model`, field values taken as stored.
///
/// Returns `false` when the model does not define the row's section and ptype.
pub fn load_policy_row(row: &CasbinRule, model: &mut dyn Model) -> bool {
    let Some(sec) = row.section() else {
        return false;
    };
    model.add_policy(&sec, &row.ptype, row.values())
}
