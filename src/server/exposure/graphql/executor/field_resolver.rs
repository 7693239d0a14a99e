//! Selection-set projection
//!
//! Operations return fully rendered JSON; the resolver keeps only what the
//! client selected, honouring aliases, fragments and nesting.

use graphql_parser::query::{Field, FragmentDefinition, Selection};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

/// Named fragments of the current document
pub type Fragments<'a, 'd> = HashMap<&'a str, &'a FragmentDefinition<'d, String>>;

/// Flatten a selection set into its fields, expanding fragments
///
/// A fragment already being expanded on the current path is skipped, so a
/// cyclic document cannot recurse forever.
pub fn collect_fields<'a, 'd>(
    selections: &'a [Selection<'d, String>],
    fragments: &Fragments<'a, 'd>,
    out: &mut Vec<&'a Field<'d, String>>,
) {
    let mut expanding = HashSet::new();
    collect_fields_into(selections, fragments, &mut expanding, out);
}

fn collect_fields_into<'a, 'd>(
    selections: &'a [Selection<'d, String>],
    fragments: &Fragments<'a, 'd>,
    expanding: &mut HashSet<&'a str>,
    out: &mut Vec<&'a Field<'d, String>>,
) {
    for selection in selections {
        match selection {
            Selection::Field(field) => out.push(field),
            Selection::InlineFragment(inline) => {
                collect_fields_into(&inline.selection_set.items, fragments, expanding, out);
            }
            Selection::FragmentSpread(spread) => {
                let name = spread.fragment_name.as_str();
                if let Some(&fragment) = fragments.get(name) {
                    if !expanding.insert(fragment.name.as_str()) {
                        continue;
                    }
                    collect_fields_into(&fragment.selection_set.items, fragments, expanding, out);
                    expanding.remove(fragment.name.as_str());
                }
            }
        }
    }
}

/// Name of a fragment that spreads itself, directly or through others
pub fn find_fragment_cycle<'a>(fragments: &Fragments<'a, '_>) -> Option<&'a str> {
    let mut done = HashSet::new();
    for &fragment in fragments.values() {
        let mut path = Vec::new();
        if let Some(name) = visit_fragment(fragment, fragments, &mut path, &mut done) {
            return Some(name);
        }
    }
    None
}

fn visit_fragment<'a, 'd>(
    fragment: &'a FragmentDefinition<'d, String>,
    fragments: &Fragments<'a, 'd>,
    path: &mut Vec<&'a str>,
    done: &mut HashSet<&'a str>,
) -> Option<&'a str> {
    let name = fragment.name.as_str();
    if path.contains(&name) {
        return Some(name);
    }
    if done.contains(name) {
        return None;
    }

    path.push(name);
    let mut spreads = Vec::new();
    spreads_in(&fragment.selection_set.items, &mut spreads);
    for spread in spreads {
        if let Some(&next) = fragments.get(spread) {
            if let Some(cycle) = visit_fragment(next, fragments, path, done) {
                return Some(cycle);
            }
        }
    }
    path.pop();
    done.insert(name);
    None
}

/// Every fragment spread in a selection set, at any depth
fn spreads_in<'a>(selections: &'a [Selection<'_, String>], out: &mut Vec<&'a str>) {
    for selection in selections {
        match selection {
            Selection::Field(field) => spreads_in(&field.selection_set.items, out),
            Selection::InlineFragment(inline) => spreads_in(&inline.selection_set.items, out),
            Selection::FragmentSpread(spread) => out.push(spread.fragment_name.as_str()),
        }
    }
}

/// Keep only the selected fields of `value`
///
/// Lists are projected element-wise; scalars and empty selections pass
/// through unchanged. Unknown fields resolve to `null`.
pub fn project<'a, 'd>(
    value: &Value,
    selections: &'a [Selection<'d, String>],
    fragments: &Fragments<'a, 'd>,
) -> Value {
    if selections.is_empty() {
        return value.clone();
    }

    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| project(item, selections, fragments))
                .collect(),
        ),
        Value::Object(obj) => {
            let mut fields = Vec::new();
            collect_fields(selections, fragments, &mut fields);

            let mut result = Map::new();
            for field in fields {
                let key = field.alias.as_ref().unwrap_or(&field.name);
                let projected = match obj.get(field.name.as_str()) {
                    Some(inner) => project(inner, &field.selection_set.items, fragments),
                    None => Value::Null,
                };
                result.insert(key.clone(), projected);
            }
            Value::Object(result)
        }
        other => other.clone(),
    }
}
