//! Structural checks run when a formula is loaded or saved.
//!
//! Evaluation relies on these rules: every expression identifier is a
//! declared variable, and conditions form an acyclic graph that only points
//! at earlier variables. Checking them once here keeps evaluation free of
//! structural failures.

use std::collections::HashMap;

use crate::error::{FormulaError, ValidationError};
use crate::expr::Expression;
use crate::expr::lexer::{is_ident_cont, is_ident_start, tokenize};
use crate::expr::parser::MAX_TOKENS;
use crate::types::Formula;

/// Longest formula accepted, in tokens. Substitution can turn one identifier
/// into four tokens (`( - 5 )`), so this leaves room under the parser's cap.
pub const MAX_FORMULA_TOKENS: usize = MAX_TOKENS / 4;

/// Validate a formula definition.
pub fn validate(formula: &Formula) -> Result<(), ValidationError> {
    let positions = declared_positions(formula)?;

    for variable in &formula.variables {
        if let (Some(min), Some(max)) = (variable.min, variable.max) {
            if min > max {
                return Err(ValidationError::InvalidRange {
                    variable: variable.id.clone(),
                    min,
                    max,
                });
            }
        }
    }

    if tokenize(&formula.formula)?.len() > MAX_FORMULA_TOKENS {
        return Err(FormulaError::TooLong(MAX_FORMULA_TOKENS).into());
    }
    let expression = Expression::parse(&formula.formula)?;
    if let Some(unknown) = expression
        .identifiers()
        .into_iter()
        .find(|id| !positions.contains_key(id))
    {
        return Err(ValidationError::UnknownToken(unknown.to_string()));
    }

    for variable in &formula.variables {
        let Some(logic) = variable.active_logic() else {
            continue;
        };
        for condition in &logic.conditions {
            if !condition.condition.is_builtin() {
                return Err(ValidationError::UnsupportedCondition {
                    variable: variable.id.clone(),
                    condition: condition.condition.to_string(),
                });
            }
            if !positions.contains_key(condition.depends_on_variable.as_str()) {
                return Err(ValidationError::UnknownDependency {
                    variable: variable.id.clone(),
                    depends_on: condition.depends_on_variable.clone(),
                });
            }
        }
    }

    dependency_order(formula)?;

    for (index, variable) in formula.variables.iter().enumerate() {
        let Some(logic) = variable.active_logic() else {
            continue;
        };
        for condition in &logic.conditions {
            let dep = condition.depends_on_variable.as_str();
            if positions[dep] >= index {
                return Err(ValidationError::ForwardReference {
                    variable: variable.id.clone(),
                    depends_on: dep.to_string(),
                });
            }
        }
    }

    tracing::debug!(formula = %formula.id, variables = formula.variables.len(), "formula validated");
    Ok(())
}

/// `true` for `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier(id: &str) -> bool {
    let mut chars = id.chars();
    chars.next().is_some_and(is_ident_start) && chars.all(is_ident_cont)
}

/// Map each id to its declaration index, rejecting bad or duplicate ids.
fn declared_positions(formula: &Formula) -> Result<HashMap<&str, usize>, ValidationError> {
    let mut positions = HashMap::with_capacity(formula.variables.len());
    for (index, variable) in formula.variables.iter().enumerate() {
        if !is_identifier(&variable.id) {
            return Err(ValidationError::InvalidVariableId(variable.id.clone()));
        }
        if positions.insert(variable.id.as_str(), index).is_some() {
            return Err(ValidationError::DuplicateVariableId(variable.id.clone()));
        }
    }
    Ok(positions)
}

/// Topologically sort variables by their enabled conditions.
///
/// Returns variable indices such that every variable comes after the
/// variables its conditions read. Conditions on undeclared ids are ignored
/// here; [`validate`] reports them first.
pub fn dependency_order(formula: &Formula) -> Result<Vec<usize>, ValidationError> {
    let n = formula.variables.len();
    let index: HashMap<&str, usize> = formula
        .variables
        .iter()
        .enumerate()
        .map(|(i, v)| (v.id.as_str(), i))
        .collect();

    // deps[i]: variables i reads. dependents[j]: variables reading j.
    let mut deps: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (i, variable) in formula.variables.iter().enumerate() {
        let Some(logic) = variable.active_logic() else {
            continue;
        };
        for condition in &logic.conditions {
            if let Some(&j) = index.get(condition.depends_on_variable.as_str()) {
                deps[i].push(j);
                dependents[j].push(i);
            }
        }
    }

    // Kahn's algorithm, seeded in declaration order for a stable result.
    let mut pending: Vec<usize> = deps.iter().map(Vec::len).collect();
    let mut ready: Vec<usize> = (0..n).rev().filter(|&i| pending[i] == 0).collect();
    let mut order = Vec::with_capacity(n);
    while let Some(i) = ready.pop() {
        order.push(i);
        for &k in dependents[i].iter().rev() {
            pending[k] -= 1;
            if pending[k] == 0 {
                ready.push(k);
            }
        }
    }

    if order.len() == n {
        return Ok(order);
    }

    // Every unsorted node still waits on another unsorted node, so following
    // those edges from any of them must revisit a node.
    let start = (0..n)
        .find(|&i| pending[i] > 0)
        .unwrap_or_default();
    let mut path = vec![start];
    let mut current = start;
    loop {
        let Some(&next) = deps[current].iter().find(|&&d| pending[d] > 0) else {
            break;
        };
        if let Some(pos) = path.iter().position(|&p| p == next) {
            let mut cycle: Vec<String> = path[pos..]
                .iter()
                .map(|&i| formula.variables[i].id.clone())
                .collect();
            cycle.push(formula.variables[next].id.clone());
            return Err(ValidationError::DependencyCycle(cycle));
        }
        path.push(next);
        current = next;
    }
    Err(ValidationError::DependencyCycle(
        path.iter().map(|&i| formula.variables[i].id.clone()).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Condition, ConditionalLogic, Variable};
    use pretty_assertions::assert_eq;
    use pricecalc_core::{ConditionKind, LogicOperator, Value, VariableType};

    fn var(id: &str) -> Variable {
        Variable::new(id, VariableType::Number)
    }

    fn depends(mut variable: Variable, on: &[&str]) -> Variable {
        variable.conditional_logic = Some(ConditionalLogic {
            enabled: true,
            operator: LogicOperator::And,
            conditions: on
                .iter()
                .map(|d| Condition {
                    id: String::new(),
                    depends_on_variable: d.to_string(),
                    condition: ConditionKind::GreaterThan,
                    expected_value: Some(Value::Number(0.0)),
                    expected_values: vec![],
                })
                .collect(),
            default_value: None,
        });
        variable
    }

    fn formula(expr: &str, variables: Vec<Variable>) -> Formula {
        Formula {
            id: "f".into(),
            name: String::new(),
            description: String::new(),
            formula: expr.into(),
            variables,
            source: String::new(),
        }
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("sqft"));
        assert!(is_identifier("_base2"));
        assert!(is_identifier("squareFootage"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("2x"));
        assert!(!is_identifier("var-1"));
        assert!(!is_identifier("a.b"));
        assert!(!is_identifier("price$"));
    }

    #[test]
    fn valid_formula_passes() {
        let f = formula("a + b * 2", vec![var("a"), depends(var("b"), &["a"])]);
        assert_eq!(validate(&f), Ok(()));
    }

    #[test]
    fn rejects_bad_and_duplicate_ids() {
        let f = formula("1", vec![var("a-b")]);
        assert_eq!(validate(&f), Err(ValidationError::InvalidVariableId("a-b".into())));

        let f = formula("a", vec![var("a"), var("a")]);
        assert_eq!(validate(&f), Err(ValidationError::DuplicateVariableId("a".into())));
    }

    #[test]
    fn rejects_unknown_expression_token() {
        let f = formula("a + mystery", vec![var("a")]);
        assert_eq!(validate(&f), Err(ValidationError::UnknownToken("mystery".into())));
    }

    #[test]
    fn rejects_malformed_expression() {
        let f = formula("a +", vec![var("a")]);
        assert_eq!(
            validate(&f),
            Err(ValidationError::Expression(FormulaError::UnexpectedEnd))
        );
        let f = formula("eval('1')", vec![var("a")]);
        assert!(matches!(
            validate(&f),
            Err(ValidationError::Expression(FormulaError::UnexpectedCharacter { .. }))
        ));
    }

    #[test]
    fn rejects_deeply_nested_expression() {
        let deep = format!("{}a{}", "(".repeat(100), ")".repeat(100));
        assert!(matches!(
            validate(&formula(&deep, vec![var("a")])),
            Err(ValidationError::Expression(FormulaError::TooDeep(_)))
        ));
        let negated = format!("{}a", "-".repeat(500));
        assert!(matches!(
            validate(&formula(&negated, vec![var("a")])),
            Err(ValidationError::Expression(FormulaError::TooDeep(_)))
        ));
    }

    #[test]
    fn rejects_oversized_expression() {
        let long = vec!["a"; MAX_FORMULA_TOKENS].join(" + ");
        assert_eq!(
            validate(&formula(&long, vec![var("a")])),
            Err(ValidationError::Expression(FormulaError::TooLong(MAX_FORMULA_TOKENS)))
        );
        let fits = vec!["a"; MAX_FORMULA_TOKENS / 2].join(" + ");
        assert_eq!(validate(&formula(&fits, vec![var("a")])), Ok(()));
    }

    #[test]
    fn rejects_inverted_range() {
        let mut s = Variable::new("s", VariableType::Slider);
        s.min = Some(5.0);
        s.max = Some(1.0);
        let f = formula("s", vec![s]);
        assert!(matches!(validate(&f), Err(ValidationError::InvalidRange { .. })));
    }

    #[test]
    fn rejects_unknown_dependency() {
        let f = formula("a", vec![depends(var("a"), &["ghost"])]);
        assert_eq!(
            validate(&f),
            Err(ValidationError::UnknownDependency {
                variable: "a".into(),
                depends_on: "ghost".into(),
            })
        );
    }

    #[test]
    fn rejects_forward_reference() {
        let f = formula("a + b", vec![depends(var("a"), &["b"]), var("b")]);
        assert_eq!(
            validate(&f),
            Err(ValidationError::ForwardReference {
                variable: "a".into(),
                depends_on: "b".into(),
            })
        );
    }

    #[test]
    fn rejects_cycles() {
        let f = formula(
            "a + b + c",
            vec![
                depends(var("a"), &["c"]),
                depends(var("b"), &["a"]),
                depends(var("c"), &["b"]),
            ],
        );
        match validate(&f) {
            Err(ValidationError::DependencyCycle(cycle)) => {
                assert_eq!(cycle.first(), cycle.last());
                assert_eq!(cycle.len(), 4);
            }
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn rejects_self_dependency() {
        let f = formula("a", vec![depends(var("a"), &["a"])]);
        assert_eq!(
            validate(&f),
            Err(ValidationError::DependencyCycle(vec!["a".into(), "a".into()]))
        );
    }

    #[test]
    fn disabled_logic_is_not_checked() {
        let mut a = depends(var("a"), &["later"]);
        if let Some(logic) = a.conditional_logic.as_mut() {
            logic.enabled = false;
        }
        let f = formula("a", vec![a, var("later")]);
        assert_eq!(validate(&f), Ok(()));
    }

    #[test]
    fn rejects_unknown_condition_kind() {
        let mut b = depends(var("b"), &["a"]);
        if let Some(logic) = b.conditional_logic.as_mut() {
            logic.conditions[0].condition = ConditionKind::Other("between".into());
        }
        let f = formula("a + b", vec![var("a"), b]);
        assert!(matches!(
            validate(&f),
            Err(ValidationError::UnsupportedCondition { .. })
        ));
    }

    #[test]
    fn dependency_order_is_topological() {
        let f = formula(
            "1",
            vec![
                var("a"),
                depends(var("b"), &["a"]),
                var("c"),
                depends(var("d"), &["b", "c"]),
            ],
        );
        let order = dependency_order(&f).unwrap();
        assert_eq!(order.len(), 4);
        let pos = |i: usize| order.iter().position(|&x| x == i).unwrap();
        assert!(pos(0) < pos(1));
        assert!(pos(1) < pos(3));
        assert!(pos(2) < pos(3));
    }
}
