//! Parse formula files (JSON and TOML), resolve formula paths and read
//! multi-service selection files.
//!
//! Every formula that leaves this module has passed
//! [`validation::validate`](crate::validation::validate).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::LoadError;
use crate::types::{Formula, ServiceSelection, ValueMap};
use crate::validation::validate;

/// Parse and validate a formula from a JSON string.
pub fn parse_json(content: &str) -> Result<Formula, LoadError> {
    let formula: Formula =
        serde_json::from_str(content).map_err(|e| LoadError::Parse(e.to_string()))?;
    validate(&formula)?;
    Ok(formula)
}

/// Parse and validate a formula from a TOML string.
pub fn parse_toml(content: &str) -> Result<Formula, LoadError> {
    let formula: Formula = toml::from_str(content).map_err(|e| LoadError::Parse(e.to_string()))?;
    validate(&formula)?;
    Ok(formula)
}

/// Load a formula from a file path (auto-detect TOML vs JSON by extension).
pub fn load_formula(path: &Path) -> Result<Formula, LoadError> {
    let content = std::fs::read_to_string(path)?;
    let mut formula = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => parse_toml(&content)?,
        Some("json") => parse_json(&content)?,
        _ => match parse_json(&content) {
            Ok(f) => f,
            // Structural errors are real; only fall back when JSON didn't parse.
            Err(LoadError::Parse(_)) => parse_toml(&content)?,
            Err(e) => return Err(e),
        },
    };
    formula.source = path.display().to_string();
    tracing::debug!(path = %path.display(), formula = %formula.id, "loaded formula");
    Ok(formula)
}

/// Search for a formula by name.
///
/// Search order:
/// 1. Exact path (absolute, or relative to `cwd`)
/// 2. `cwd` with standard extensions
/// 3. `.pricecalc/formulas/` under `cwd`
/// 4. Each of `search_dirs` (from configuration)
/// 5. `~/.pricecalc/formulas/`
pub fn find_formula(name: &str, cwd: &Path, search_dirs: &[PathBuf]) -> Result<PathBuf, LoadError> {
    let exact = Path::new(name);
    if exact.is_absolute() && exact.is_file() {
        return Ok(exact.to_path_buf());
    }
    let relative = cwd.join(name);
    if relative.is_file() {
        return Ok(relative);
    }

    let mut dirs = vec![cwd.to_path_buf(), cwd.join(".pricecalc").join("formulas")];
    dirs.extend(search_dirs.iter().map(|d| {
        if d.is_absolute() { d.clone() } else { cwd.join(d) }
    }));
    if let Some(home) = home_dir() {
        dirs.push(home.join(".pricecalc").join("formulas"));
    }

    for dir in dirs.iter().filter(|d| d.is_dir()) {
        for suffix in SUFFIXES {
            let candidate = dir.join(format!("{}{}", name, suffix));
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
    }

    Err(LoadError::NotFound {
        name: name.to_string(),
        searched: dirs
            .iter()
            .map(|d| d.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

/// Standard suffixes tried when resolving a formula name.
const SUFFIXES: [&str; 4] = [".formula.json", ".formula.toml", ".json", ".toml"];

/// A selection entry names a formula file or embeds the definition.
#[derive(Deserialize)]
#[serde(untagged)]
enum FormulaRef {
    Name(String),
    Inline(Box<Formula>),
}

#[derive(Deserialize)]
struct SelectionEntry {
    formula: FormulaRef,
    #[serde(default)]
    values: ValueMap,
}

/// Parse a JSON array of selections.
///
/// Formula names are resolved with [`find_formula`] relative to `base_dir`;
/// inline formulas are validated like loaded ones.
pub fn parse_selections(
    content: &str,
    base_dir: &Path,
    search_dirs: &[PathBuf],
) -> Result<Vec<ServiceSelection>, LoadError> {
    let entries: Vec<SelectionEntry> =
        serde_json::from_str(content).map_err(|e| LoadError::Parse(e.to_string()))?;

    entries
        .into_iter()
        .map(|entry| {
            let formula = match entry.formula {
                FormulaRef::Name(name) => {
                    load_formula(&find_formula(&name, base_dir, search_dirs)?)?
                }
                FormulaRef::Inline(formula) => {
                    validate(&formula)?;
                    *formula
                }
            };
            Ok(ServiceSelection::new(formula, entry.values))
        })
        .collect()
}

/// Read a selections file; names resolve relative to the file's directory.
pub fn load_selections(path: &Path, search_dirs: &[PathBuf]) -> Result<Vec<ServiceSelection>, LoadError> {
    let content = std::fs::read_to_string(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    parse_selections(&content, base, search_dirs)
}

/// Get the user's home directory.
fn home_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use pretty_assertions::assert_eq;
    use pricecalc_core::{Value, VariableType};

    const DECK_JSON: &str = r#"{
        "id": "deck",
        "name": "Deck build",
        "formula": "sqft * material + (railing ? 400 : 0)",
        "variables": [
            {"id": "sqft", "name": "Area", "type": "number", "unit": "sq ft", "defaultValue": 100},
            {"id": "material", "name": "Material", "type": "select", "defaultValue": "pine",
             "options": [
                {"label": "Pine", "value": "pine", "numericValue": 15},
                {"label": "Cedar", "value": "cedar", "numericValue": 25}
             ]},
            {"id": "railing", "name": "Railing", "type": "dropdown",
             "options": [
                {"label": "Yes", "value": "yes", "numericValue": 1},
                {"label": "No", "value": "no", "numericValue": 0}
             ],
             "conditionalLogic": {
                "enabled": true,
                "dependsOnVariable": "sqft",
                "condition": "greater_than",
                "expectedValue": 50,
                "defaultValue": "no"
             }}
        ]
    }"#;

    #[test]
    fn parse_json_full() {
        let f = parse_json(DECK_JSON).unwrap();
        assert_eq!(f.id, "deck");
        assert_eq!(f.variables.len(), 3);
        assert_eq!(f.variables[1].var_type, VariableType::Select);
        let logic = f.variables[2].conditional_logic.as_ref().unwrap();
        assert_eq!(logic.conditions.len(), 1);
        assert_eq!(logic.conditions[0].depends_on_variable, "sqft");
        assert_eq!(logic.default_value, Some(Value::from("no")));
    }

    #[test]
    fn deeply_nested_formula_is_a_load_error() {
        for depth in [600, 200_000] {
            let json = format!(
                r#"{{"id": "deep", "formula": "{}1{}"}}"#,
                "(".repeat(depth),
                ")".repeat(depth)
            );
            assert!(matches!(parse_json(&json), Err(LoadError::Validation(_))));
        }
    }

    #[test]
    fn parse_toml_with_conditions() {
        let toml_str = r#"
id = "cleaning"
formula = "rooms * 30 + (deep ? 50 : 0)"

[[variables]]
id = "rooms"
name = "Rooms"
type = "stepper"
min = 1
max = 10

[[variables]]
id = "deep"
name = "Deep clean"
type = "dropdown"
options = [
    { label = "Yes", value = "yes", numericValue = 1 },
    { label = "No", value = "no", numericValue = 0 },
]

[variables.conditionalLogic]
enabled = true
operator = "OR"

[[variables.conditionalLogic.conditions]]
id = "c1"
dependsOnVariable = "rooms"
condition = "greater_than"
expectedValue = 2
"#;
        let f = parse_toml(toml_str).unwrap();
        assert_eq!(f.variables[0].min, Some(1.0));
        assert_eq!(f.variables[0].var_type, VariableType::Stepper);
        let logic = f.variables[1].conditional_logic.as_ref().unwrap();
        assert_eq!(logic.conditions[0].expected_value, Some(Value::Number(2.0)));
    }

    #[test]
    fn parse_rejects_invalid_structure() {
        let json = r#"{
            "id": "bad",
            "formula": "a + b",
            "variables": [
                {"id": "a", "type": "number",
                 "conditionalLogic": {"enabled": true, "dependsOnVariable": "b", "condition": "is_empty"}},
                {"id": "b", "type": "number"}
            ]
        }"#;
        match parse_json(json) {
            Err(LoadError::Validation(ValidationError::ForwardReference { variable, depends_on })) => {
                assert_eq!(variable, "a");
                assert_eq!(depends_on, "b");
            }
            other => panic!("expected forward reference, got {:?}", other),
        }
    }

    #[test]
    fn parse_rejects_malformed_json() {
        assert!(matches!(parse_json("{not json"), Err(LoadError::Parse(_))));
        assert!(matches!(parse_json(r#"{"id": "x"}"#), Err(LoadError::Parse(_))));
    }

    #[test]
    fn load_and_find_formula() {
        let dir = tempfile::tempdir().unwrap();
        let formulas = dir.path().join(".pricecalc").join("formulas");
        std::fs::create_dir_all(&formulas).unwrap();
        std::fs::write(formulas.join("deck.formula.json"), DECK_JSON).unwrap();

        let path = find_formula("deck", dir.path(), &[]).unwrap();
        assert_eq!(path, formulas.join("deck.formula.json"));

        let f = load_formula(&path).unwrap();
        assert_eq!(f.source, path.display().to_string());

        let missing = find_formula("nope", dir.path(), &[]);
        assert!(matches!(missing, Err(LoadError::NotFound { .. })));
    }

    #[test]
    fn find_formula_in_configured_dir() {
        let dir = tempfile::tempdir().unwrap();
        let extra = dir.path().join("catalog");
        std::fs::create_dir_all(&extra).unwrap();
        std::fs::write(extra.join("deck.json"), DECK_JSON).unwrap();

        let path = find_formula("deck", dir.path(), &[PathBuf::from("catalog")]).unwrap();
        assert_eq!(path, extra.join("deck.json"));
    }

    #[test]
    fn load_without_extension_falls_back_to_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flat");
        std::fs::write(&path, "id = \"flat\"\nformula = \"100\"\n").unwrap();
        let f = load_formula(&path).unwrap();
        assert_eq!(f.id, "flat");
    }

    #[test]
    fn selections_by_name_and_inline() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("deck.json"), DECK_JSON).unwrap();
        let content = r#"[
            {"formula": "deck", "values": {"sqft": 20}},
            {"formula": {"id": "fee", "formula": "visit", "variables": [
                {"id": "visit", "type": "number", "defaultValue": 75}
            ]}}
        ]"#;
        std::fs::write(dir.path().join("quote.json"), content).unwrap();

        let selections = load_selections(&dir.path().join("quote.json"), &[]).unwrap();
        assert_eq!(selections.len(), 2);
        assert_eq!(selections[0].formula.id, "deck");
        assert_eq!(selections[0].values["sqft"], Value::Number(20.0));
        assert_eq!(selections[1].formula.id, "fee");
        assert!(selections[1].values.is_empty());
    }

    #[test]
    fn inline_selection_is_validated() {
        let content = r#"[{"formula": {"id": "x", "formula": "ghost"}}]"#;
        let err = parse_selections(content, Path::new("."), &[]).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Validation(ValidationError::UnknownToken(_))
        ));
    }
}
